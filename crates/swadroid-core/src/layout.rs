//! Static column layouts for every table.
//!
//! A layout is resolved by an exhaustive match on [`Table`]; rows are mapped
//! by column name through it, so a reordering of columns in storage cannot
//! silently shift fields.

use crate::table::{RelationKind, Table};

/// How a column is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
  Integer,
  Real,
  Text,
  /// Boolean stored with the [`IntFlag`](crate::codec::IntFlag) convention.
  IntFlag,
  /// Boolean stored with the [`YesNo`](crate::codec::YesNo) convention.
  YesNoFlag,
}

impl ColumnType {
  /// The SQL affinity used in DDL.
  pub fn sql_type(self) -> &'static str {
    match self {
      Self::Integer | Self::IntFlag => "INTEGER",
      Self::Real => "REAL",
      Self::Text | Self::YesNoFlag => "TEXT",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub name: &'static str,
  pub ty:   ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column { Column { name, ty } }

#[derive(Debug)]
pub struct TableLayout {
  pub table:    Table,
  /// All columns, in record field order.
  pub columns:  &'static [Column],
  /// Primary-key columns.
  pub key:      &'static [&'static str],
  /// Column used for watermarks and retention, if the table has one.
  pub ordering: Option<&'static str>,
  /// Columns that hold device-local state and survive an upsert.
  pub local:    &'static [&'static str],
}

impl TableLayout {
  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }

  pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.columns.iter().map(|c| c.name)
  }
}

use ColumnType::{IntFlag, Integer, Real, Text, YesNoFlag};

const ID_KEY: &[&str] = &["id"];

static COURSES: TableLayout = TableLayout {
  table:    Table::Courses,
  columns:  &[col("id", Integer), col("name", Text)],
  key:      ID_KEY,
  ordering: None,
  local:    &[],
};

static NOTICES: TableLayout = TableLayout {
  table:    Table::Notices,
  columns:  &[col("id", Integer), col("timestamp", Integer), col("description", Text)],
  key:      ID_KEY,
  ordering: Some("timestamp"),
  local:    &[],
};

static STUDENTS: TableLayout = TableLayout {
  table:    Table::Students,
  columns:  &[
    col("id", Integer),
    col("dni", Text),
    col("first_name", Text),
    col("surname1", Text),
    col("surname2", Text),
  ],
  key:      ID_KEY,
  ordering: None,
  local:    &[],
};

static TEST_ANSWERS: TableLayout = TableLayout {
  table:    Table::TestAnswers,
  columns:  &[col("id", Integer), col("answer", Text), col("correct", IntFlag)],
  key:      ID_KEY,
  ordering: None,
  local:    &[],
};

static TEST_QUESTIONS: TableLayout = TableLayout {
  table:    Table::TestQuestions,
  columns:  &[
    col("id", Integer),
    col("question", Text),
    col("anstype", Text),
    col("numhits", Integer),
    col("shuffle", YesNoFlag),
    col("score", Real),
  ],
  key:      ID_KEY,
  ordering: None,
  local:    &[],
};

static MESSAGE_CONTENT: TableLayout = TableLayout {
  table:    Table::MessageContent,
  columns:  &[
    col("id", Integer),
    col("subject", Text),
    col("content", Text),
    col("expanded", YesNoFlag),
    col("usrcod", Integer),
  ],
  key:      ID_KEY,
  ordering: None,
  local:    &["expanded"],
};

static MESSAGES_RECEIVED: TableLayout = TableLayout {
  table:    Table::MessagesReceived,
  columns:  &[
    col("id", Integer),
    col("subject", Text),
    col("content", Text),
    col("usrcod", Integer),
    col("notified", YesNoFlag),
    col("open", YesNoFlag),
    col("replied", YesNoFlag),
    col("expanded", YesNoFlag),
  ],
  key:      ID_KEY,
  ordering: None,
  local:    &["expanded"],
};

static MESSAGES_SENT: TableLayout = TableLayout {
  table:    Table::MessagesSent,
  columns:  &[
    col("id", Integer),
    col("subject", Text),
    col("content", Text),
    col("expanded", YesNoFlag),
    col("crscod", Integer),
    col("usrcod", Integer),
    col("creattime", Integer),
  ],
  key:      ID_KEY,
  ordering: Some("creattime"),
  local:    &["expanded"],
};

static MARKS: TableLayout = TableLayout {
  table:    Table::Marks,
  columns:  &[
    col("id", Integer),
    col("crscod", Integer),
    col("grpcod", Integer),
    col("path", Text),
    col("header", Integer),
    col("footer", Integer),
  ],
  key:      ID_KEY,
  ordering: None,
  local:    &[],
};

static NOTIFICATIONS: TableLayout = TableLayout {
  table:    Table::Notifications,
  columns:  &[
    col("id", Integer),
    col("event_type", Text),
    col("event_time", Integer),
    col("user_surname1", Text),
    col("user_surname2", Text),
    col("user_first_name", Text),
    col("user_photo", Text),
    col("location", Text),
    col("summary", Text),
    col("status", Integer),
    col("content", Text),
    col("seen_local", YesNoFlag),
    col("seen_remote", YesNoFlag),
  ],
  key:      ID_KEY,
  ordering: Some("event_time"),
  local:    &["seen_local"],
};

static NOTICES_COURSES: TableLayout = TableLayout {
  table:    Table::NoticesCourses,
  columns:  &[col("idcourse", Integer), col("idnotice", Integer)],
  key:      &["idcourse", "idnotice"],
  ordering: None,
  local:    &[],
};

static STUDENTS_COURSES: TableLayout = TableLayout {
  table:    Table::StudentsCourses,
  columns:  &[col("idcourse", Integer), col("idstudent", Integer)],
  key:      &["idcourse", "idstudent"],
  ordering: None,
  local:    &[],
};

static TEST_QUESTIONS_COURSES: TableLayout = TableLayout {
  table:    Table::TestQuestionsCourses,
  columns:  &[col("crscod", Integer), col("qstcod", Integer)],
  key:      &["crscod", "qstcod"],
  ordering: None,
  local:    &[],
};

impl Table {
  pub fn layout(self) -> &'static TableLayout {
    match self {
      Self::Courses => &COURSES,
      Self::Notices => &NOTICES,
      Self::Students => &STUDENTS,
      Self::TestAnswers => &TEST_ANSWERS,
      Self::TestQuestions => &TEST_QUESTIONS,
      Self::MessageContent => &MESSAGE_CONTENT,
      Self::MessagesReceived => &MESSAGES_RECEIVED,
      Self::MessagesSent => &MESSAGES_SENT,
      Self::Marks => &MARKS,
      Self::Notifications => &NOTIFICATIONS,
      Self::NoticesCourses => &NOTICES_COURSES,
      Self::StudentsCourses => &STUDENTS_COURSES,
      Self::TestQuestionsCourses => &TEST_QUESTIONS_COURSES,
    }
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn every_layout_belongs_to_its_table() {
    for table in Table::iter() {
      assert_eq!(table.layout().table, table);
    }
  }

  #[test]
  fn key_and_local_columns_exist() {
    for table in Table::iter() {
      let layout = table.layout();
      for name in layout.key.iter().chain(layout.local).chain(&layout.ordering) {
        assert!(layout.column(name).is_some(), "{table}.{name} missing");
      }
    }
  }

  #[test]
  fn ordering_columns() {
    let ordered: Vec<_> = Table::iter()
      .filter_map(|table| table.layout().ordering.map(|column| (table, column)))
      .collect();
    assert_eq!(ordered, [
      (Table::Notices, "timestamp"),
      (Table::MessagesSent, "creattime"),
      (Table::Notifications, "event_time"),
    ]);
  }

  #[test]
  fn relation_layouts_use_kind_columns() {
    for kind in [
      RelationKind::NoticesCourses,
      RelationKind::StudentsCourses,
      RelationKind::TestQuestionsCourses,
    ] {
      let (first, second) = kind.columns();
      let names: Vec<_> = kind.table().layout().column_names().collect();
      assert_eq!(names, [first, second]);
    }
  }
}
