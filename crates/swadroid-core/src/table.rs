//! The closed set of tables mirrored on the device.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

/// Every table in the local mirror. The `strum` serialisation is the storage
/// name used in SQL.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  #[strum(serialize = "courses")]
  Courses,
  #[strum(serialize = "notices")]
  Notices,
  #[strum(serialize = "students")]
  Students,
  #[strum(serialize = "tst_answers")]
  TestAnswers,
  #[strum(serialize = "tst_questions")]
  TestQuestions,
  #[strum(serialize = "msg_content")]
  MessageContent,
  #[strum(serialize = "msg_rcv")]
  MessagesReceived,
  #[strum(serialize = "msg_snt")]
  MessagesSent,
  #[strum(serialize = "marks")]
  Marks,
  #[strum(serialize = "notifications")]
  Notifications,
  #[strum(serialize = "notices_courses")]
  NoticesCourses,
  #[strum(serialize = "students_courses")]
  StudentsCourses,
  #[strum(serialize = "tst_questions_courses")]
  TestQuestionsCourses,
}

impl Table {
  /// The storage name of the table.
  pub fn name(self) -> &'static str { self.into() }

  /// Resolve a storage name. Unknown names are an explicit error rather than
  /// an empty result.
  pub fn from_name(name: &str) -> Result<Self> {
    name.parse().map_err(|_| Error::UnknownTable(name.to_owned()))
  }

  /// The join-table kind, if this is a relation table.
  pub fn relation_kind(self) -> Option<RelationKind> {
    match self {
      Self::NoticesCourses => Some(RelationKind::NoticesCourses),
      Self::StudentsCourses => Some(RelationKind::StudentsCourses),
      Self::TestQuestionsCourses => Some(RelationKind::TestQuestionsCourses),
      _ => None,
    }
  }

  pub fn is_relation(self) -> bool { self.relation_kind().is_some() }
}

/// The many-to-many join tables. Column names are a property of the kind,
/// never of the identifier types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
  NoticesCourses,
  StudentsCourses,
  TestQuestionsCourses,
}

impl RelationKind {
  pub fn table(self) -> Table {
    match self {
      Self::NoticesCourses => Table::NoticesCourses,
      Self::StudentsCourses => Table::StudentsCourses,
      Self::TestQuestionsCourses => Table::TestQuestionsCourses,
    }
  }

  /// `(first, second)` column names.
  pub fn columns(self) -> (&'static str, &'static str) {
    match self {
      Self::NoticesCourses => ("idcourse", "idnotice"),
      Self::StudentsCourses => ("idcourse", "idstudent"),
      Self::TestQuestionsCourses => ("crscod", "qstcod"),
    }
  }
}
