//! Storage encodings for boolean flags.
//!
//! Two conventions coexist in the mirrored schema and are chosen per column:
//!
//! - [`IntFlag`]: an integer where `0` means **true** and anything else means
//!   false. This is inverted relative to the usual convention; stored data
//!   depends on it, so it is preserved.
//! - [`YesNo`]: the strings `"Y"` and `"N"`.

/// The integer flag convention (`0` is true).
pub struct IntFlag;

impl IntFlag {
  pub fn decode(stored: i64) -> bool { stored == 0 }

  /// Inverse of [`IntFlag::decode`]: `true` is stored as `0`, `false` as `1`.
  pub fn encode(flag: bool) -> i64 {
    if flag { 0 } else { 1 }
  }
}

/// The `"Y"` / `"N"` string convention.
pub struct YesNo;

impl YesNo {
  pub const YES: &'static str = "Y";
  pub const NO: &'static str = "N";

  /// Strict decode: only `"Y"` and `"N"` are accepted.
  pub fn decode(stored: &str) -> Option<bool> {
    match stored {
      Self::YES => Some(true),
      Self::NO => Some(false),
      _ => None,
    }
  }

  /// Anything other than `"Y"` reads as false.
  pub fn decode_lenient(stored: &str) -> bool { stored == Self::YES }

  pub fn encode(flag: bool) -> &'static str {
    if flag { Self::YES } else { Self::NO }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yes_no_round_trips() {
    for flag in [true, false] {
      assert_eq!(YesNo::decode(YesNo::encode(flag)), Some(flag));
    }
  }

  #[test]
  fn yes_no_rejects_other_strings() {
    assert_eq!(YesNo::decode("y"), None);
    assert_eq!(YesNo::decode(""), None);
    assert_eq!(YesNo::decode("true"), None);
    assert!(!YesNo::decode_lenient("yes"));
    assert!(YesNo::decode_lenient("Y"));
  }

  #[test]
  fn int_flag_zero_is_true() {
    assert!(IntFlag::decode(0));
    for n in [1, -1, 2, 42, i64::MAX, i64::MIN] {
      assert!(!IntFlag::decode(n), "{n} should decode to false");
    }
  }

  #[test]
  fn int_flag_encode_matches_decode_convention() {
    assert_eq!(IntFlag::encode(true), 0);
    assert_eq!(IntFlag::encode(false), 1);
    assert!(IntFlag::decode(IntFlag::encode(true)));
    assert!(!IntFlag::decode(IntFlag::encode(false)));
  }
}
