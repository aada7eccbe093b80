//! Stateful folder-by-folder traversal of a downloads tree.

use crate::{
  error::{NavError, TreeError},
  tree::{DirectoryItem, FileInfo, ItemKind},
  xml::parse_tree,
};

/// Walks a tree that never changes after construction.
///
/// The position is a stack of child indices from the root, so every
/// ancestor is reachable without holding references into the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNavigator {
  root: Vec<DirectoryItem>,
  path: Vec<usize>,
}

impl DirectoryNavigator {
  /// Start at the root folder, whose entries are `root`.
  pub fn new(root: Vec<DirectoryItem>) -> Self { Self { root, path: Vec::new() } }

  pub fn from_xml(xml: &str) -> Result<Self, TreeError> { Ok(Self::new(parse_tree(xml)?)) }

  /// Entries of the current folder.
  pub fn children(&self) -> &[DirectoryItem] {
    self.path.iter().fold(&self.root[..], |entries, &index| {
      match entries.get(index).map(|item| &item.kind) {
        Some(ItemKind::Folder(children)) => children,
        // `path` only ever holds folder indices.
        _ => entries,
      }
    })
  }

  /// The file at `index` in the current folder, if it is one.
  pub fn file(&self, index: usize) -> Option<&FileInfo> {
    self.children().get(index).and_then(DirectoryItem::file_info)
  }

  pub fn is_at_root(&self) -> bool { self.path.is_empty() }

  pub fn depth(&self) -> usize { self.path.len() }

  pub fn go_to_root(&mut self) -> &[DirectoryItem] {
    self.path.clear();
    &self.root
  }

  /// Enter the folder at `index` of the current listing.
  pub fn descend(&mut self, index: usize) -> Result<&[DirectoryItem], NavError> {
    let entries = self.children();
    match entries.get(index) {
      Some(item) if item.is_folder() => {}
      _ => return Err(NavError::InvalidIndex { index, len: entries.len() }),
    }
    self.path.push(index);
    Ok(self.children())
  }

  pub fn ascend(&mut self) -> Result<&[DirectoryItem], NavError> {
    self.path.pop().ok_or(NavError::AtRoot)?;
    Ok(self.children())
  }

  /// Folder names from the root (exclusive) down to the current folder.
  pub fn current_path(&self) -> Vec<&str> {
    let mut names = Vec::with_capacity(self.path.len());
    let mut entries = &self.root[..];
    for &index in &self.path {
      let Some(item) = entries.get(index) else { break };
      names.push(item.name.as_str());
      entries = item.children().unwrap_or_default();
    }
    names
  }

  /// Breadcrumb text: `/` at the root, `/Tema 1/Ejercicios/` below it.
  pub fn path_display(&self) -> String {
    let mut out = String::from("/");
    for name in self.current_path() {
      out.push_str(name);
      out.push('/');
    }
    out
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn file(name: &str, code: i64) -> DirectoryItem {
    DirectoryItem::file(name, FileInfo { code, ..FileInfo::default() })
  }

  fn sample() -> DirectoryNavigator {
    DirectoryNavigator::new(vec![
      DirectoryItem::folder(
        "Tema 1",
        vec![
          file("apuntes.pdf", 10),
          DirectoryItem::folder("Ejercicios", vec![file("hoja1.pdf", 11)]),
        ],
      ),
      DirectoryItem::folder("Tema 2", vec![]),
      file("guia.txt", 1),
    ])
  }

  #[test]
  fn descend_then_ascend_returns_to_root_listing() {
    let mut nav = sample();
    let root = nav.go_to_root().to_vec();

    for index in [0, 1] {
      nav.descend(index).unwrap();
      assert_eq!(nav.ascend().unwrap(), &root[..]);
    }
  }

  #[test]
  fn ascend_at_root_fails() {
    let mut nav = sample();
    assert_eq!(nav.ascend(), Err(NavError::AtRoot));
    assert!(nav.is_at_root());
  }

  #[test]
  fn descend_onto_file_or_past_end_fails() {
    let mut nav = sample();
    assert_eq!(nav.descend(2), Err(NavError::InvalidIndex { index: 2, len: 3 }));
    assert_eq!(nav.descend(3), Err(NavError::InvalidIndex { index: 3, len: 3 }));
    assert!(nav.is_at_root());
  }

  #[test]
  fn path_tracks_descents() {
    let mut nav = sample();
    assert!(nav.current_path().is_empty());
    assert_eq!(nav.path_display(), "/");

    nav.descend(0).unwrap();
    let listing = nav.descend(1).unwrap();
    assert_eq!(listing, &[file("hoja1.pdf", 11)][..]);
    assert_eq!(nav.current_path(), ["Tema 1", "Ejercicios"]);
    assert_eq!(nav.path_display(), "/Tema 1/Ejercicios/");
    assert_eq!(nav.depth(), 2);

    nav.go_to_root();
    assert!(nav.current_path().is_empty());
  }

  #[test]
  fn file_lookup_in_current_folder() {
    let mut nav = sample();
    assert_eq!(nav.file(2).map(|f| f.code), Some(1));
    assert!(nav.file(0).is_none());

    nav.descend(0).unwrap();
    assert_eq!(nav.file(0).map(|f| f.code), Some(10));
  }

  #[test]
  fn empty_folder_listing() {
    let mut nav = sample();
    assert!(nav.descend(1).unwrap().is_empty());
  }

  #[test]
  fn builds_from_xml() {
    let mut nav = DirectoryNavigator::from_xml(
      r#"<tree><dir name="Prácticas"><file name="p1.zip"><code>5</code></file></dir></tree>"#,
    )
    .unwrap();

    nav.descend(0).unwrap();
    assert_eq!(nav.path_display(), "/Prácticas/");
    assert_eq!(nav.file(0).map(|f| f.code), Some(5));
  }

  #[test]
  fn bad_xml_is_reported() {
    assert!(DirectoryNavigator::from_xml("<tree><dir>").is_err());
  }
}
