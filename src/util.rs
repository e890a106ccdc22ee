//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if the char is a Han character: the CJK unified ideograph ranges
/// (including extensions and compatibility ideographs) plus the ideographic
/// zero `〇`.
pub fn is_cjk(ch: char) -> bool {
  matches!(
    ch,
    '\u{4E00}'..='\u{9FFF}'
      | '\u{3007}'
      | '\u{3400}'..='\u{4DBF}'
      | '\u{20000}'..='\u{2A6DF}'
      | '\u{2A700}'..='\u{2B73F}'
      | '\u{2B740}'..='\u{2B81F}'
      | '\u{2B820}'..='\u{2CEAF}'
      | '\u{F900}'..='\u{FAFF}'
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_fills_every_occurrence() {
    assert_eq!(fill_template("{a}-{b}-{a}", &[("a", "1"), ("b", "2")]), "1-2-1");
    assert_eq!(fill_template("第 {pos} 个字", &[]), "第 {pos} 个字");
  }

  #[test]
  fn cjk_ranges() {
    assert!(is_cjk('成'));
    assert!(is_cjk('㐀'));
    assert!(is_cjk('〇'));
    assert!(!is_cjk('。'));
    assert!(!is_cjk('a'));
    assert!(!is_cjk('，'));
  }
}
