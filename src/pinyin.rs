//! Hanzi → Hanyu Pinyin (tone diacritics, space-separated), used to fill
//! idiom rows that ship without a reading.
//!
//! Example:
//!   输入: "一心一意"
//!   输出: "yī xīn yī yì"
use pinyin::ToPinyin;

/// Per-character conversion (no word segmentation), so polyphonic
/// characters take their default reading. Non-Chinese characters are
/// copied as-is.
pub fn to_pinyin_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);

    // Space only between consecutive Hanzi syllables.
    let mut last_was_hanzi = false;

    for ch in text.chars() {
        if let Some(py) = ch.to_pinyin() {
            if last_was_hanzi {
                out.push(' ');
            }
            out.push_str(py.with_tone());
            last_was_hanzi = true;
        } else {
            out.push(ch);
            last_was_hanzi = false;
        }
    }

    out
}
