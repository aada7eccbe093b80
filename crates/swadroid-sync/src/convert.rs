//! Property record → [`Notification`].

use swadroid_core::{codec::YesNo, record::Notification};

use crate::{
  remote::{PropertyRecord, PropertyValue},
  Result, SyncError,
};

// ─── Service field names ─────────────────────────────────────────────────────

const CODE: &str = "notificationCode";
const EVENT_TYPE: &str = "eventType";
const EVENT_TIME: &str = "eventTime";
const SURNAME1: &str = "userSurname1";
const SURNAME2: &str = "userSurname2";
const FIRST_NAME: &str = "userFirstname";
const PHOTO: &str = "userPhoto";
const LOCATION: &str = "location";
const SUMMARY: &str = "summary";
const STATUS: &str = "status";
const CONTENT: &str = "content";
const READ: &str = "notifRead";

struct Fields<'a> {
  index:  usize,
  record: &'a PropertyRecord,
}

impl Fields<'_> {
  fn malformed(&self, field: &'static str, reason: impl Into<String>) -> SyncError {
    SyncError::Malformed { index: self.index, field, reason: reason.into() }
  }

  fn integer(&self, field: &'static str) -> Result<i64> {
    let value = self.record.get(field).ok_or_else(|| self.malformed(field, "missing"))?;
    value
      .as_integer()
      .ok_or_else(|| self.malformed(field, format!("not an integer: {value:?}")))
  }

  /// Text fields may be absent; the service omits empty ones.
  fn text(&self, field: &'static str) -> String {
    self.record.get(field).cloned().map(PropertyValue::into_text).unwrap_or_default()
  }

  fn flag(&self, field: &'static str) -> Result<bool> {
    match self.record.get(field) {
      None => Ok(false),
      Some(PropertyValue::Integer(i)) => Ok(*i != 0),
      Some(PropertyValue::Text(s)) => match s.trim().parse::<i64>() {
        Ok(i) => Ok(i != 0),
        Err(_) => {
          YesNo::decode(s.trim()).ok_or_else(|| self.malformed(field, format!("not a flag: {s:?}")))
        }
      },
    }
  }
}

/// Convert the `index`-th record of a response. The code, event time and
/// status are required; text fields default to empty and `notifRead` to
/// unread. The local seen flag always starts cleared.
pub fn notification_from_properties(index: usize, record: &PropertyRecord) -> Result<Notification> {
  let f = Fields { index, record };

  Ok(Notification {
    id:              f.integer(CODE)?,
    event_type:      f.text(EVENT_TYPE),
    event_time:      f.integer(EVENT_TIME)?,
    user_surname1:   f.text(SURNAME1),
    user_surname2:   f.text(SURNAME2),
    user_first_name: f.text(FIRST_NAME),
    user_photo:      f.text(PHOTO),
    location:        f.text(LOCATION),
    summary:         f.text(SUMMARY),
    status:          f.integer(STATUS)?,
    content:         f.text(CONTENT),
    seen_local:      false,
    seen_remote:     f.flag(READ)?,
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn record(value: serde_json::Value) -> PropertyRecord {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn converts_a_full_record() {
    let r = record(json!({
      "notificationCode": "301",
      "eventType": "message",
      "eventTime": "1325376000",
      "userSurname1": "Martín",
      "userSurname2": "López",
      "userFirstname": "Ana",
      "userPhoto": "http://swad.ugr.es/photo/a.jpg",
      "location": "Redes",
      "summary": "Re: práctica 2",
      "status": 4,
      "content": "",
      "notifRead": 1,
    }));

    let n = notification_from_properties(0, &r).unwrap();
    assert_eq!(n.id, 301);
    assert_eq!(n.event_time, 1_325_376_000);
    assert_eq!(n.status, 4);
    assert_eq!(n.sender_name(), "Ana Martín López");
    assert!(n.seen_remote);
    assert!(!n.seen_local);
  }

  #[test]
  fn optional_fields_default() {
    let r = record(json!({ "notificationCode": 1, "eventTime": 10, "status": 0 }));
    let n = notification_from_properties(0, &r).unwrap();
    assert_eq!(n.summary, "");
    assert!(!n.seen_remote);
  }

  #[test]
  fn missing_code_is_malformed() {
    let r = record(json!({ "eventTime": 10, "status": 0 }));
    let err = notification_from_properties(3, &r).unwrap_err();
    assert!(matches!(err, SyncError::Malformed { index: 3, field: "notificationCode", .. }));
  }

  #[test]
  fn non_numeric_time_is_malformed() {
    let r = record(json!({ "notificationCode": 1, "eventTime": "yesterday", "status": 0 }));
    assert!(matches!(
      notification_from_properties(0, &r),
      Err(SyncError::Malformed { field: "eventTime", .. })
    ));
  }

  #[test]
  fn read_flag_accepts_yes_no() {
    let r = record(json!({
      "notificationCode": 1, "eventTime": 10, "status": 0, "notifRead": "Y",
    }));
    assert!(notification_from_properties(0, &r).unwrap().seen_remote);
  }
}
