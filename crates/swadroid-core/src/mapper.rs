//! Row mapper. Turns a named-column row into a typed [`Record`], and a
//! record back into column values.

use std::collections::BTreeMap;

use crate::{
  codec::{IntFlag, YesNo},
  layout::{ColumnType, TableLayout},
  record::{
    Course, Mark, MessageContent, MessageReceived, MessageSent, Notice,
    Notification, Record, Relation, Student, TestAnswer, TestQuestion,
  },
  table::Table,
  value::Value,
  Error, Result,
};

/// A row whose values can be looked up by column name.
pub trait ColumnSource {
  fn value(&self, table: Table, column: &'static str) -> Result<Value>;
}

impl ColumnSource for BTreeMap<String, Value> {
  fn value(&self, table: Table, column: &'static str) -> Result<Value> {
    self
      .get(column)
      .cloned()
      .ok_or(Error::MissingColumn { table, column })
  }
}

// ─── Typed column access ─────────────────────────────────────────────────────

struct Columns<'a, S: ?Sized> {
  layout: &'static TableLayout,
  row:    &'a S,
}

impl<S: ColumnSource + ?Sized> Columns<'_, S> {
  fn get(&self, column: &'static str) -> Result<Value> {
    self.row.value(self.layout.table, column)
  }

  fn mismatch(&self, column: &'static str, expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch {
      table: self.layout.table,
      column,
      expected,
      found: found.type_name(),
    }
  }

  fn int(&self, column: &'static str) -> Result<i64> {
    match self.get(column)? {
      Value::Integer(v) => Ok(v),
      other => Err(self.mismatch(column, "integer", &other)),
    }
  }

  fn real(&self, column: &'static str) -> Result<f64> {
    match self.get(column)? {
      Value::Real(v) => Ok(v),
      Value::Integer(v) => Ok(v as f64),
      other => Err(self.mismatch(column, "real", &other)),
    }
  }

  /// Text column; SQL NULL reads as the empty string.
  fn text(&self, column: &'static str) -> Result<String> {
    match self.get(column)? {
      Value::Text(v) => Ok(v),
      Value::Null => Ok(String::new()),
      other => Err(self.mismatch(column, "text", &other)),
    }
  }

  /// Boolean column, decoded with the convention declared in the layout.
  fn flag(&self, column: &'static str) -> Result<bool> {
    let ty = self
      .layout
      .column(column)
      .map(|c| c.ty)
      .ok_or(Error::MissingColumn { table: self.layout.table, column })?;

    match (ty, self.get(column)?) {
      (ColumnType::IntFlag, Value::Integer(v)) => Ok(IntFlag::decode(v)),
      (ColumnType::YesNoFlag, Value::Text(s)) => {
        YesNo::decode(&s).ok_or(Error::InvalidEncoding {
          table: self.layout.table,
          column,
          value: s,
        })
      }
      (ColumnType::IntFlag, other) => Err(self.mismatch(column, "integer flag", &other)),
      (ColumnType::YesNoFlag, other) => Err(self.mismatch(column, "Y/N flag", &other)),
      (_, other) => Err(self.mismatch(column, "flag", &other)),
    }
  }
}

// ─── Row → Record ────────────────────────────────────────────────────────────

/// Build the typed record for `table` from a row addressed by column name.
pub fn map_row<S: ColumnSource + ?Sized>(table: Table, row: &S) -> Result<Record> {
  let c = Columns { layout: table.layout(), row };

  let record = match table {
    Table::Courses => Record::Course(Course { id: c.int("id")?, name: c.text("name")? }),
    Table::Notices => Record::Notice(Notice {
      id:          c.int("id")?,
      timestamp:   c.int("timestamp")?,
      description: c.text("description")?,
    }),
    Table::Students => Record::Student(Student {
      id:         c.int("id")?,
      dni:        c.text("dni")?,
      first_name: c.text("first_name")?,
      surname1:   c.text("surname1")?,
      surname2:   c.text("surname2")?,
    }),
    Table::TestAnswers => Record::TestAnswer(TestAnswer {
      id:      c.int("id")?,
      answer:  c.text("answer")?,
      correct: c.flag("correct")?,
    }),
    Table::TestQuestions => Record::TestQuestion(TestQuestion {
      id:          c.int("id")?,
      question:    c.text("question")?,
      answer_type: c.text("anstype")?,
      num_hits:    c.int("numhits")?,
      shuffle:     c.flag("shuffle")?,
      score:       c.real("score")?,
    }),
    Table::MessageContent => Record::MessageContent(MessageContent {
      id:        c.int("id")?,
      subject:   c.text("subject")?,
      content:   c.text("content")?,
      expanded:  c.flag("expanded")?,
      user_code: c.int("usrcod")?,
    }),
    Table::MessagesReceived => Record::MessageReceived(MessageReceived {
      id:        c.int("id")?,
      subject:   c.text("subject")?,
      content:   c.text("content")?,
      user_code: c.int("usrcod")?,
      notified:  c.flag("notified")?,
      open:      c.flag("open")?,
      replied:   c.flag("replied")?,
      expanded:  c.flag("expanded")?,
    }),
    Table::MessagesSent => Record::MessageSent(MessageSent {
      id:          c.int("id")?,
      subject:     c.text("subject")?,
      content:     c.text("content")?,
      expanded:    c.flag("expanded")?,
      course_code: c.int("crscod")?,
      user_code:   c.int("usrcod")?,
      created_at:  c.int("creattime")?,
    }),
    Table::Marks => Record::Mark(Mark {
      id:          c.int("id")?,
      course_code: c.int("crscod")?,
      group_code:  c.int("grpcod")?,
      path:        c.text("path")?,
      header:      c.int("header")?,
      footer:      c.int("footer")?,
    }),
    Table::Notifications => Record::Notification(Notification {
      id:              c.int("id")?,
      event_type:      c.text("event_type")?,
      event_time:      c.int("event_time")?,
      user_surname1:   c.text("user_surname1")?,
      user_surname2:   c.text("user_surname2")?,
      user_first_name: c.text("user_first_name")?,
      user_photo:      c.text("user_photo")?,
      location:        c.text("location")?,
      summary:         c.text("summary")?,
      status:          c.int("status")?,
      content:         c.text("content")?,
      seen_local:      c.flag("seen_local")?,
      seen_remote:     c.flag("seen_remote")?,
    }),
    Table::NoticesCourses | Table::StudentsCourses | Table::TestQuestionsCourses => {
      let kind = table.relation_kind().ok_or(Error::NotARelationTable(table))?;
      let (first, second) = kind.columns();
      Record::Relation(Relation::new(kind, c.int(first)?, c.int(second)?))
    }
  };

  Ok(record)
}

// ─── Record → values ─────────────────────────────────────────────────────────

fn yes_no(flag: bool) -> Value { Value::Text(YesNo::encode(flag).to_owned()) }

impl Record {
  /// Column values aligned with `self.table().layout().columns`.
  pub fn to_values(&self) -> Vec<Value> {
    match self {
      Self::Course(r) => vec![r.id.into(), r.name.as_str().into()],
      Self::Notice(r) => vec![r.id.into(), r.timestamp.into(), r.description.as_str().into()],
      Self::Student(r) => vec![
        r.id.into(),
        r.dni.as_str().into(),
        r.first_name.as_str().into(),
        r.surname1.as_str().into(),
        r.surname2.as_str().into(),
      ],
      Self::TestAnswer(r) => vec![
        r.id.into(),
        r.answer.as_str().into(),
        Value::Integer(IntFlag::encode(r.correct)),
      ],
      Self::TestQuestion(r) => vec![
        r.id.into(),
        r.question.as_str().into(),
        r.answer_type.as_str().into(),
        r.num_hits.into(),
        yes_no(r.shuffle),
        r.score.into(),
      ],
      Self::MessageContent(r) => vec![
        r.id.into(),
        r.subject.as_str().into(),
        r.content.as_str().into(),
        yes_no(r.expanded),
        r.user_code.into(),
      ],
      Self::MessageReceived(r) => vec![
        r.id.into(),
        r.subject.as_str().into(),
        r.content.as_str().into(),
        r.user_code.into(),
        yes_no(r.notified),
        yes_no(r.open),
        yes_no(r.replied),
        yes_no(r.expanded),
      ],
      Self::MessageSent(r) => vec![
        r.id.into(),
        r.subject.as_str().into(),
        r.content.as_str().into(),
        yes_no(r.expanded),
        r.course_code.into(),
        r.user_code.into(),
        r.created_at.into(),
      ],
      Self::Mark(r) => vec![
        r.id.into(),
        r.course_code.into(),
        r.group_code.into(),
        r.path.as_str().into(),
        r.header.into(),
        r.footer.into(),
      ],
      Self::Notification(r) => vec![
        r.id.into(),
        r.event_type.as_str().into(),
        r.event_time.into(),
        r.user_surname1.as_str().into(),
        r.user_surname2.as_str().into(),
        r.user_first_name.as_str().into(),
        r.user_photo.as_str().into(),
        r.location.as_str().into(),
        r.summary.as_str().into(),
        r.status.into(),
        r.content.as_str().into(),
        yes_no(r.seen_local),
        yes_no(r.seen_remote),
      ],
      Self::Relation(r) => vec![r.first.into(), r.second.into()],
    }
  }

  /// `(column, value)` pairs, e.g. for building an in-memory row.
  pub fn to_row(&self) -> BTreeMap<String, Value> {
    self
      .table()
      .layout()
      .column_names()
      .map(str::to_owned)
      .zip(self.to_values())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator;

  use super::*;
  use crate::table::RelationKind;

  fn samples() -> Vec<Record> {
    vec![
      Course { id: 1, name: "Redes de Computadores".into() }.into(),
      Notice { id: 2, timestamp: 1_330_000_000, description: "Exam moved".into() }.into(),
      Student {
        id:         3,
        dni:        "12345678Z".into(),
        first_name: "Helena".into(),
        surname1:   "Rodríguez".into(),
        surname2:   "Gijón".into(),
      }
      .into(),
      TestAnswer { id: 4, answer: "It's 42".into(), correct: true }.into(),
      TestQuestion {
        id:          5,
        question:    "What is TCP?".into(),
        answer_type: "uniqueChoice".into(),
        num_hits:    12,
        shuffle:     true,
        score:       0.75,
      }
      .into(),
      MessageContent {
        id:        6,
        subject:   "Re: practicas".into(),
        content:   "see you".into(),
        expanded:  false,
        user_code: 99,
      }
      .into(),
      MessageReceived {
        id:        7,
        subject:   "hi".into(),
        content:   "".into(),
        user_code: 98,
        notified:  true,
        open:      false,
        replied:   true,
        expanded:  false,
      }
      .into(),
      MessageSent {
        id:          8,
        subject:     "question".into(),
        content:     "body".into(),
        expanded:    true,
        course_code: 11,
        user_code:   97,
        created_at:  1_330_000_100,
      }
      .into(),
      Mark {
        id:          9,
        course_code: 11,
        group_code:  0,
        path:        "/marks/final.html".into(),
        header:      2,
        footer:      1,
      }
      .into(),
      Notification {
        id:              10,
        event_type:      "notice".into(),
        event_time:      1_330_000_200,
        user_surname1:   "Aguilera".into(),
        user_surname2:   "Malagón".into(),
        user_first_name: "Antonio".into(),
        user_photo:      "https://swad.ugr.es/photo.jpg".into(),
        location:        "Redes".into(),
        summary:         "New notice".into(),
        status:          3,
        content:         "<p>text</p>".into(),
        seen_local:      false,
        seen_remote:     true,
      }
      .into(),
      Relation::new(RelationKind::NoticesCourses, 11, 2).into(),
      Relation::new(RelationKind::StudentsCourses, 11, 3).into(),
      Relation::new(RelationKind::TestQuestionsCourses, 11, 5).into(),
    ]
  }

  #[test]
  fn samples_cover_every_table() {
    let covered: Vec<Table> = samples().iter().map(Record::table).collect();
    for table in Table::iter() {
      assert!(covered.contains(&table), "no sample for {table}");
    }
  }

  #[test]
  fn values_align_with_layout() {
    for record in samples() {
      let layout = record.table().layout();
      let values = record.to_values();
      assert_eq!(values.len(), layout.columns.len(), "{}", layout.table);
    }
  }

  #[test]
  fn mapped_rows_equal_their_source_records() {
    for record in samples() {
      let row = record.to_row();
      let mapped = map_row(record.table(), &row).unwrap();
      assert_eq!(mapped, record);
      if let Some(id) = mapped.id() {
        assert_eq!(row["id"], Value::Integer(id));
      }
    }
  }

  #[test]
  fn column_order_does_not_matter() {
    let row: BTreeMap<String, Value> = serde_json::from_value(serde_json::json!({
      "correct": 0,
      "answer": "yes",
      "id": 4,
    }))
    .unwrap();
    let mapped = map_row(Table::TestAnswers, &row).unwrap();
    assert_eq!(mapped, TestAnswer { id: 4, answer: "yes".into(), correct: true }.into());
  }

  #[test]
  fn int_flag_nonzero_reads_false() {
    let mut row = Record::from(TestAnswer { id: 1, answer: "a".into(), correct: true }).to_row();
    row.insert("correct".into(), Value::Integer(1));
    let Record::TestAnswer(answer) = map_row(Table::TestAnswers, &row).unwrap() else {
      panic!("wrong variant");
    };
    assert!(!answer.correct);
  }

  #[test]
  fn bad_yes_no_value_is_invalid_encoding() {
    let mut row = samples()[4].to_row();
    row.insert("shuffle".into(), Value::Text("maybe".into()));
    let err = map_row(Table::TestQuestions, &row).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidEncoding { column: "shuffle", ref value, .. } if value == "maybe"
    ));
  }

  #[test]
  fn missing_column_is_reported() {
    let mut row = samples()[0].to_row();
    row.remove("name");
    let err = map_row(Table::Courses, &row).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { table: Table::Courses, column: "name" }));
  }

  #[test]
  fn wrong_type_is_reported() {
    let mut row = samples()[0].to_row();
    row.insert("id".into(), Value::Text("one".into()));
    let err = map_row(Table::Courses, &row).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { expected: "integer", found: "text", .. }));
  }
}
