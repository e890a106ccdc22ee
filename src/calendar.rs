//! Calendar-day bookkeeping: "today" in a pinned offset, day index since the
//! epoch, and the per-day seed.

use time::{macros::format_description, Date, OffsetDateTime, UtcOffset};

/// First puzzle day; day index 0.
pub const DEFAULT_EPOCH: Date = time::macros::date!(2026 - 01 - 01);

/// Whole calendar days from `epoch` to `date` (negative before the epoch).
pub fn day_index(date: Date, epoch: Date) -> i64 {
  (date - epoch).whole_days()
}

/// Seed used for everything derived from a given day.
pub fn seed_for(date: Date, epoch: Date) -> i64 {
  day_index(date, epoch)
}

/// Today's date in `offset`, independent of the host timezone.
pub fn today(offset: UtcOffset) -> Date {
  OffsetDateTime::now_utc().to_offset(offset).date()
}

/// Offset from whole hours, clamped to the valid range.
pub fn offset_from_hours(hours: i8) -> UtcOffset {
  UtcOffset::from_hms(hours.clamp(-23, 23), 0, 0).unwrap_or(UtcOffset::UTC)
}

/// `YYYY-MM-DD`
pub fn parse_date(s: &str) -> Option<Date> {
  Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// `YYYY-MM-DD`
pub fn format_date(date: Date) -> String {
  format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Display form used by the page header, e.g. `2026年1月1日`.
pub fn display_date(date: Date) -> String {
  format!("{}年{}月{}日", date.year(), u8::from(date.month()), date.day())
}
