//! The downloads tree model.

use chrono::{DateTime, TimeZone as _, Utc};
use serde::{Deserialize, Serialize};

/// Which of a course's file areas a tree describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadsArea {
  Documents,
  Shared,
}

impl DownloadsArea {
  /// The service's `treeCode`.
  pub fn code(self) -> i64 {
    match self {
      Self::Documents => 1,
      Self::Shared => 2,
    }
  }

  pub fn from_code(code: i64) -> Option<Self> {
    match code {
      1 => Some(Self::Documents),
      2 => Some(Self::Shared),
      _ => None,
    }
  }
}

/// Metadata for a downloadable file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
  /// Service file code, passed back to request the download link.
  pub code:      i64,
  /// Bytes.
  pub size:      u64,
  /// Unix seconds of the last modification.
  pub time:      i64,
  pub license:   String,
  pub publisher: String,
  pub photo_url: String,
}

impl FileInfo {
  pub fn modified_at(&self) -> Option<DateTime<Utc>> { Utc.timestamp_opt(self.time, 0).single() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
  Folder(Vec<DirectoryItem>),
  File(FileInfo),
}

/// One entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryItem {
  pub name: String,
  pub kind: ItemKind,
}

impl DirectoryItem {
  pub fn folder(name: impl Into<String>, children: Vec<DirectoryItem>) -> Self {
    Self { name: name.into(), kind: ItemKind::Folder(children) }
  }

  pub fn file(name: impl Into<String>, info: FileInfo) -> Self {
    Self { name: name.into(), kind: ItemKind::File(info) }
  }

  pub fn is_folder(&self) -> bool { matches!(self.kind, ItemKind::Folder(_)) }

  /// The folder's entries; `None` for a file.
  pub fn children(&self) -> Option<&[DirectoryItem]> {
    match &self.kind {
      ItemKind::Folder(children) => Some(children),
      ItemKind::File(_) => None,
    }
  }

  pub fn file_info(&self) -> Option<&FileInfo> {
    match &self.kind {
      ItemKind::File(info) => Some(info),
      ItemKind::Folder(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn area_codes() {
    for area in [DownloadsArea::Documents, DownloadsArea::Shared] {
      assert_eq!(DownloadsArea::from_code(area.code()), Some(area));
    }
    assert_eq!(DownloadsArea::from_code(0), None);
  }

  #[test]
  fn modified_at_converts_unix_seconds() {
    let info = FileInfo { time: 1_325_376_000, ..FileInfo::default() };
    assert_eq!(info.modified_at().unwrap().to_rfc3339(), "2012-01-01T00:00:00+00:00");
  }

  #[test]
  fn accessors_follow_kind() {
    let file = DirectoryItem::file("a.pdf", FileInfo::default());
    let folder = DirectoryItem::folder("Tema 1", vec![file.clone()]);

    assert!(folder.is_folder());
    assert_eq!(folder.children(), Some(&[file.clone()][..]));
    assert!(file.children().is_none());
    assert!(file.file_info().is_some());
  }

  #[test]
  fn serialises_as_json() {
    let item = DirectoryItem::folder("Prácticas", vec![]);
    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["name"], "Prácticas");
    assert!(value["kind"]["Folder"].as_array().unwrap().is_empty());
  }
}
