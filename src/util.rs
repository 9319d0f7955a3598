//! Small text helpers used across modules.

/// Words of a sentence as the find-error / strike-out pickers see them:
/// split on runs of whitespace, no punctuation handling.
pub fn words(sentence: &str) -> Vec<&str> {
  sentence.split_whitespace().collect()
}

/// Number of selectable words in `sentence`.
pub fn word_count(sentence: &str) -> usize {
  sentence.split_whitespace().count()
}

/// Trim and case-fold for loose text comparison.
pub fn fold(s: &str) -> String {
  s.trim().to_lowercase()
}

/// Log-safe truncation for large strings (char boundary aware).
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn words_collapse_repeated_whitespace() {
    assert_eq!(words("  the  cat\tsat \n"), ["the", "cat", "sat"]);
    assert_eq!(word_count(""), 0);
  }

  #[test]
  fn fold_trims_and_lowercases() {
    assert_eq!(fold("  Paris "), "paris");
  }

  #[test]
  fn trunc_respects_char_boundaries() {
    let s = "ééééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
    assert!(t.ends_with("(10 bytes total)"));
  }
}
