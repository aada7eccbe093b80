//! Domain records: one typed struct per mirrored table.
//!
//! Records are independent copies: nothing here refers back to storage.
//! Field order matches the column order of the table's
//! [`TableLayout`](crate::layout::TableLayout).

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::table::{RelationKind, Table};

// ─── Courses and enrolment ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id:   i64,
  pub name: String,
}

/// A course notice (bulletin board entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
  pub id:          i64,
  /// Unix seconds.
  pub timestamp:   i64,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:         i64,
  pub dni:        String,
  pub first_name: String,
  pub surname1:   String,
  pub surname2:   String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAnswer {
  pub id:      i64,
  pub answer:  String,
  pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestQuestion {
  pub id:          i64,
  pub question:    String,
  /// Service answer-type tag, e.g. `"uniqueChoice"`.
  pub answer_type: String,
  pub num_hits:    i64,
  pub shuffle:     bool,
  pub score:       f64,
}

// ─── Messages ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
  pub id:        i64,
  pub subject:   String,
  pub content:   String,
  pub expanded:  bool,
  pub user_code: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceived {
  pub id:        i64,
  pub subject:   String,
  pub content:   String,
  pub user_code: i64,
  pub notified:  bool,
  pub open:      bool,
  pub replied:   bool,
  pub expanded:  bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSent {
  pub id:          i64,
  pub subject:     String,
  pub content:     String,
  pub expanded:    bool,
  pub course_code: i64,
  pub user_code:   i64,
  /// Unix seconds.
  pub created_at:  i64,
}

// ─── Marks ───────────────────────────────────────────────────────────────────

/// Location of a marks file inside a course's document tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
  pub id:          i64,
  pub course_code: i64,
  pub group_code:  i64,
  pub path:        String,
  /// Number of header rows in the marks table.
  pub header:      i64,
  /// Number of footer rows in the marks table.
  pub footer:      i64,
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub id:              i64,
  pub event_type:      String,
  /// Unix seconds; the table's ordering column.
  pub event_time:      i64,
  pub user_surname1:   String,
  pub user_surname2:   String,
  pub user_first_name: String,
  pub user_photo:      String,
  pub location:        String,
  pub summary:         String,
  pub status:          i64,
  pub content:         String,
  /// Read on this device. Local state; kept across re-syncs.
  pub seen_local:      bool,
  /// Read according to the server.
  pub seen_remote:     bool,
}

impl Notification {
  /// The event time as a UTC timestamp, if it is in range.
  pub fn event_at(&self) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(self.event_time, 0).single()
  }

  /// `"First Surname1 Surname2"`, skipping empty parts.
  pub fn sender_name(&self) -> String {
    [&self.user_first_name, &self.user_surname1, &self.user_surname2]
      .into_iter()
      .map(|s| s.trim())
      .filter(|s| !s.is_empty())
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// ─── Relations ───────────────────────────────────────────────────────────────

/// An edge in a many-to-many join table. Every service identifier is an
/// integer, so both ends are `i64`; column names come from `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
  pub kind:   RelationKind,
  pub first:  i64,
  pub second: i64,
}

impl Relation {
  pub fn new(kind: RelationKind, first: i64, second: i64) -> Self {
    Self { kind, first, second }
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// Any row of any mirrored table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", content = "row", rename_all = "snake_case")]
pub enum Record {
  Course(Course),
  Notice(Notice),
  Student(Student),
  TestAnswer(TestAnswer),
  TestQuestion(TestQuestion),
  MessageContent(MessageContent),
  MessageReceived(MessageReceived),
  MessageSent(MessageSent),
  Mark(Mark),
  Notification(Notification),
  Relation(Relation),
}

impl Record {
  pub fn table(&self) -> Table {
    match self {
      Self::Course(_) => Table::Courses,
      Self::Notice(_) => Table::Notices,
      Self::Student(_) => Table::Students,
      Self::TestAnswer(_) => Table::TestAnswers,
      Self::TestQuestion(_) => Table::TestQuestions,
      Self::MessageContent(_) => Table::MessageContent,
      Self::MessageReceived(_) => Table::MessagesReceived,
      Self::MessageSent(_) => Table::MessagesSent,
      Self::Mark(_) => Table::Marks,
      Self::Notification(_) => Table::Notifications,
      Self::Relation(r) => r.kind.table(),
    }
  }

  /// The record's id; relations are identified by their pair instead.
  pub fn id(&self) -> Option<i64> {
    match self {
      Self::Course(r) => Some(r.id),
      Self::Notice(r) => Some(r.id),
      Self::Student(r) => Some(r.id),
      Self::TestAnswer(r) => Some(r.id),
      Self::TestQuestion(r) => Some(r.id),
      Self::MessageContent(r) => Some(r.id),
      Self::MessageReceived(r) => Some(r.id),
      Self::MessageSent(r) => Some(r.id),
      Self::Mark(r) => Some(r.id),
      Self::Notification(r) => Some(r.id),
      Self::Relation(_) => None,
    }
  }
}

macro_rules! impl_from_record {
  ($($ty:ident),* $(,)?) => {
    $(
      impl From<$ty> for Record {
        fn from(r: $ty) -> Self { Self::$ty(r) }
      }
    )*
  };
}

impl_from_record!(
  Course,
  Notice,
  Student,
  TestAnswer,
  TestQuestion,
  MessageContent,
  MessageReceived,
  MessageSent,
  Mark,
  Notification,
  Relation,
);

#[cfg(test)]
mod tests {
  use super::*;

  fn notification() -> Notification {
    Notification {
      id:              7,
      event_type:      "message".into(),
      event_time:      1_330_000_000,
      user_surname1:   "Boyero".into(),
      user_surname2:   "".into(),
      user_first_name: "Juan".into(),
      user_photo:      "".into(),
      location:        "Redes".into(),
      summary:         "Hola".into(),
      status:          0,
      content:         "".into(),
      seen_local:      false,
      seen_remote:     false,
    }
  }

  #[test]
  fn sender_name_skips_empty_parts() {
    assert_eq!(notification().sender_name(), "Juan Boyero");
  }

  #[test]
  fn event_at_converts_unix_seconds() {
    let at = notification().event_at().unwrap();
    assert_eq!(at.timestamp(), 1_330_000_000);
  }

  #[test]
  fn relation_records_have_no_id_but_know_their_table() {
    let rec = Record::from(Relation::new(RelationKind::StudentsCourses, 1, 2));
    assert_eq!(rec.id(), None);
    assert_eq!(rec.table(), Table::StudentsCourses);
  }

  #[test]
  fn serialises_with_table_tag() {
    let rec = Record::from(Course { id: 3, name: "Redes".into() });
    let json = serde_json::to_value(&rec).unwrap();
    assert_eq!(json["table"], "course");
    assert_eq!(json["row"]["name"], "Redes");
  }
}
