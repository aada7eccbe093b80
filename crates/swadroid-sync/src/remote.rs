//! The remote side of a sync: the service's notification call and the
//! loosely-typed records it returns.

use std::{collections::BTreeMap, future::Future};

use serde::{Deserialize, Serialize};

/// A scalar field as the service sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
  Integer(i64),
  Text(String),
}

impl PropertyValue {
  /// The value as an integer; numeric text is parsed.
  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(i) => Some(*i),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }

  pub fn into_text(self) -> String {
    match self {
      Self::Integer(i) => i.to_string(),
      Self::Text(s) => s,
    }
  }
}

impl From<i64> for PropertyValue {
  fn from(i: i64) -> Self { Self::Integer(i) }
}

impl From<&str> for PropertyValue {
  fn from(s: &str) -> Self { Self::Text(s.to_owned()) }
}

impl From<String> for PropertyValue {
  fn from(s: String) -> Self { Self::Text(s) }
}

/// One record of a service response: field name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyRecord(BTreeMap<String, PropertyValue>);

impl PropertyRecord {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
    self.0.insert(name.into(), value.into());
    self
  }

  pub fn get(&self, name: &str) -> Option<&PropertyValue> { self.0.get(name) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl FromIterator<(String, PropertyValue)> for PropertyRecord {
  fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// The service call that lists a user's notifications.
///
/// Timeouts and retries belong to the implementation; any error it returns
/// fails the sync without touching the store.
pub trait NotificationSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Notifications with an event time at or after `since` (unix seconds).
  fn fetch_notifications<'a>(
    &'a self,
    ws_key: &'a str,
    since: i64,
  ) -> impl Future<Output = Result<Vec<PropertyRecord>, Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn deserialises_numbers_and_strings() {
    let record: PropertyRecord = serde_json::from_value(json!({
      "notificationCode": 12,
      "eventTime": "1325376000",
      "summary": "Nuevo aviso",
    }))
    .unwrap();

    assert_eq!(record.get("notificationCode"), Some(&PropertyValue::Integer(12)));
    assert_eq!(record.get("eventTime").and_then(PropertyValue::as_integer), Some(1_325_376_000));
    assert_eq!(record.get("summary"), Some(&PropertyValue::Text("Nuevo aviso".into())));
    assert_eq!(record.len(), 3);
  }

  #[test]
  fn non_numeric_text_is_not_an_integer() {
    assert_eq!(PropertyValue::from("12a").as_integer(), None);
    assert_eq!(PropertyValue::from(" 7 ").as_integer(), Some(7));
  }
}
