//! SQL schema for the SWADroid local mirror.
//!
//! The same DDL builds the seed database bundled with the application and
//! initialises unseeded stores. Column names and order must match the layouts
//! in `swadroid_core::layout`; `tests::schema_matches_layouts` checks this.

/// Bumped whenever a table's columns change.
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS courses (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notices (
    id          INTEGER PRIMARY KEY,
    timestamp   INTEGER NOT NULL,   -- unix seconds
    description TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY,
    dni         TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    surname1    TEXT NOT NULL,
    surname2    TEXT NOT NULL
);

-- `correct` uses the integer flag convention: 0 is true.
CREATE TABLE IF NOT EXISTS tst_answers (
    id          INTEGER PRIMARY KEY,
    answer      TEXT NOT NULL,
    correct     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tst_questions (
    id          INTEGER PRIMARY KEY,
    question    TEXT NOT NULL,
    anstype     TEXT NOT NULL,
    numhits     INTEGER NOT NULL,
    shuffle     TEXT NOT NULL,      -- 'Y' | 'N'
    score       REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS msg_content (
    id          INTEGER PRIMARY KEY,
    subject     TEXT NOT NULL,
    content     TEXT NOT NULL,
    expanded    TEXT NOT NULL,
    usrcod      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS msg_rcv (
    id          INTEGER PRIMARY KEY,
    subject     TEXT NOT NULL,
    content     TEXT NOT NULL,
    usrcod      INTEGER NOT NULL,
    notified    TEXT NOT NULL,
    open        TEXT NOT NULL,
    replied     TEXT NOT NULL,
    expanded    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS msg_snt (
    id          INTEGER PRIMARY KEY,
    subject     TEXT NOT NULL,
    content     TEXT NOT NULL,
    expanded    TEXT NOT NULL,
    crscod      INTEGER NOT NULL,
    usrcod      INTEGER NOT NULL,
    creattime   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS marks (
    id          INTEGER PRIMARY KEY,
    crscod      INTEGER NOT NULL,
    grpcod      INTEGER NOT NULL,
    path        TEXT NOT NULL,
    header      INTEGER NOT NULL,
    footer      INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    id              INTEGER PRIMARY KEY,   -- service notification code
    event_type      TEXT NOT NULL,
    event_time      INTEGER NOT NULL,      -- unix seconds; retention order
    user_surname1   TEXT NOT NULL,
    user_surname2   TEXT NOT NULL,
    user_first_name TEXT NOT NULL,
    user_photo      TEXT NOT NULL,
    location        TEXT NOT NULL,
    summary         TEXT NOT NULL,
    status          INTEGER NOT NULL,
    content         TEXT NOT NULL,
    seen_local      TEXT NOT NULL DEFAULT 'N',
    seen_remote     TEXT NOT NULL DEFAULT 'N'
);

CREATE TABLE IF NOT EXISTS notices_courses (
    idcourse    INTEGER NOT NULL,
    idnotice    INTEGER NOT NULL,
    PRIMARY KEY (idcourse, idnotice)
);

CREATE TABLE IF NOT EXISTS students_courses (
    idcourse    INTEGER NOT NULL,
    idstudent   INTEGER NOT NULL,
    PRIMARY KEY (idcourse, idstudent)
);

CREATE TABLE IF NOT EXISTS tst_questions_courses (
    crscod      INTEGER NOT NULL,
    qstcod      INTEGER NOT NULL,
    PRIMARY KEY (crscod, qstcod)
);

CREATE INDEX IF NOT EXISTS notifications_time_idx ON notifications(event_time);
CREATE INDEX IF NOT EXISTS notices_time_idx       ON notices(timestamp);
CREATE INDEX IF NOT EXISTS msg_snt_time_idx       ON msg_snt(creattime);

PRAGMA user_version = 1;
";
