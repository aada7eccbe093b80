//! Parsing the service's directory tree document.
//!
//! ```xml
//! <tree>
//!   <dir name="Tema 1">
//!     <file name="apuntes.pdf">
//!       <code>1234</code><size>20480</size><time>1325376000</time>
//!       <license>CC BY</license><publisher>Ana</publisher><photo>http://…</photo>
//!     </file>
//!   </dir>
//! </tree>
//! ```

use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::{
  error::TreeError,
  tree::{DirectoryItem, FileInfo},
};

// ─── File fields ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Field {
  Code,
  Size,
  Time,
  License,
  Publisher,
  Photo,
}

fn parse_field(local: &[u8]) -> Option<Field> {
  match local {
    b"code" => Some(Field::Code),
    b"size" => Some(Field::Size),
    b"time" => Some(Field::Time),
    b"license" => Some(Field::License),
    b"publisher" => Some(Field::Publisher),
    b"photo" => Some(Field::Photo),
    _ => None,
  }
}

struct OpenFile {
  name:  String,
  info:  FileInfo,
  field: Option<Field>,
}

impl OpenFile {
  fn set(&mut self, field: Field, text: &str) -> Result<(), TreeError> {
    let number = |what: &str| {
      TreeError::Malformed(format!("file {:?}: {what} is not a number: {text:?}", self.name))
    };
    match field {
      Field::Code => self.info.code = text.trim().parse().map_err(|_| number("code"))?,
      Field::Size => self.info.size = text.trim().parse().map_err(|_| number("size"))?,
      Field::Time => self.info.time = text.trim().parse().map_err(|_| number("time"))?,
      Field::License => self.info.license.push_str(text),
      Field::Publisher => self.info.publisher.push_str(text),
      Field::Photo => self.info.photo_url.push_str(text),
    }
    Ok(())
  }
}

struct OpenDir {
  name:     String,
  children: Vec<DirectoryItem>,
}

// ─── Parser ──────────────────────────────────────────────────────────────────

/// Parse a tree document into the root folder's entries.
///
/// Unknown elements are ignored. Missing `name` attributes, misplaced
/// elements and non-numeric `code`/`size`/`time` are
/// [`TreeError::Malformed`]; XML syntax errors are [`TreeError::Xml`].
pub fn parse_tree(xml: &str) -> Result<Vec<DirectoryItem>, TreeError> {
  let mut reader = quick_xml::Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  // `dirs[0]` is the root once `<tree>` has been seen.
  let mut dirs: Vec<OpenDir> = Vec::new();
  let mut file: Option<OpenFile> = None;
  let mut root: Option<Vec<DirectoryItem>> = None;
  let mut files = 0usize;
  let mut folders = 0usize;

  loop {
    match reader.read_event() {
      Ok(Event::Start(ref e)) => {
        let name = e.name();
        match local_name(name.as_ref()) {
          b"tree" => {
            ensure_first_tree(root.as_ref(), &dirs)?;
            dirs.push(OpenDir { name: String::new(), children: Vec::new() });
          }
          b"dir" => {
            ensure_in_dir(&dirs, file.as_ref(), "dir")?;
            dirs.push(OpenDir { name: name_attr(e)?, children: Vec::new() });
          }
          b"file" => {
            ensure_in_dir(&dirs, file.as_ref(), "file")?;
            file = Some(OpenFile { name: name_attr(e)?, info: FileInfo::default(), field: None });
          }
          local => {
            if let Some(open) = file.as_mut() {
              open.field = parse_field(local);
            }
          }
        }
      }
      Ok(Event::Empty(ref e)) => {
        let name = e.name();
        match local_name(name.as_ref()) {
          b"tree" => {
            ensure_first_tree(root.as_ref(), &dirs)?;
            root = Some(Vec::new());
          }
          b"dir" => {
            ensure_in_dir(&dirs, file.as_ref(), "dir")?;
            push_child(&mut dirs, DirectoryItem::folder(name_attr(e)?, Vec::new()))?;
            folders += 1;
          }
          b"file" => {
            ensure_in_dir(&dirs, file.as_ref(), "file")?;
            push_child(&mut dirs, DirectoryItem::file(name_attr(e)?, FileInfo::default()))?;
            files += 1;
          }
          _ => {}
        }
      }
      Ok(Event::Text(ref t)) => {
        if let Some(open) = file.as_mut() {
          if let Some(field) = open.field {
            let text = t.unescape().map_err(|e| TreeError::Xml(e.to_string()))?;
            open.set(field, &text)?;
          }
        }
      }
      Ok(Event::CData(t)) => {
        if let Some(open) = file.as_mut() {
          if let Some(field) = open.field {
            let bytes = t.into_inner();
            open.set(field, &String::from_utf8_lossy(&bytes))?;
          }
        }
      }
      Ok(Event::End(ref e)) => {
        let name = e.name();
        match local_name(name.as_ref()) {
          b"file" => {
            if let Some(open) = file.take() {
              push_child(&mut dirs, DirectoryItem::file(open.name, open.info))?;
              files += 1;
            }
          }
          b"dir" => {
            if dirs.len() < 2 {
              return Err(malformed("unbalanced </dir>"));
            }
            if let Some(done) = dirs.pop() {
              push_child(&mut dirs, DirectoryItem::folder(done.name, done.children))?;
              folders += 1;
            }
          }
          b"tree" => {
            if dirs.len() != 1 {
              return Err(malformed("</tree> closes an unfinished folder"));
            }
            root = dirs.pop().map(|d| d.children);
          }
          _ => {
            if let Some(open) = file.as_mut() {
              open.field = None;
            }
          }
        }
      }
      Ok(Event::Eof) => break,
      Err(e) => return Err(TreeError::Xml(e.to_string())),
      _ => {}
    }
  }

  let root = root.ok_or_else(|| malformed("document has no complete <tree> element"))?;
  debug!(folders, files, "parsed directory tree");
  Ok(root)
}

fn malformed(what: &str) -> TreeError { TreeError::Malformed(what.to_owned()) }

fn local_name(name: &[u8]) -> &[u8] {
  match name.iter().rposition(|&b| b == b':') {
    Some(pos) => &name[pos + 1..],
    None => name,
  }
}

fn name_attr(e: &BytesStart<'_>) -> Result<String, TreeError> {
  let attr = e
    .try_get_attribute("name")
    .map_err(|err| TreeError::Xml(err.to_string()))?
    .ok_or_else(|| malformed("entry without a name attribute"))?;
  let value = attr.unescape_value().map_err(|err| TreeError::Xml(err.to_string()))?;
  Ok(value.into_owned())
}

fn ensure_first_tree(
  root: Option<&Vec<DirectoryItem>>,
  dirs: &[OpenDir],
) -> Result<(), TreeError> {
  if !dirs.is_empty() {
    return Err(malformed("nested <tree>"));
  }
  if root.is_some() {
    return Err(malformed("more than one <tree>"));
  }
  Ok(())
}

fn ensure_in_dir(dirs: &[OpenDir], file: Option<&OpenFile>, element: &str) -> Result<(), TreeError> {
  if dirs.is_empty() {
    return Err(TreeError::Malformed(format!("<{element}> outside <tree>")));
  }
  if file.is_some() {
    return Err(TreeError::Malformed(format!("<{element}> inside <file>")));
  }
  Ok(())
}

fn push_child(dirs: &mut [OpenDir], item: DirectoryItem) -> Result<(), TreeError> {
  let parent = dirs.last_mut().ok_or_else(|| malformed("entry outside <tree>"))?;
  parent.children.push(item);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::ItemKind;

  const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tree>
  <dir name="Tema 1">
    <file name="apuntes.pdf">
      <code>1234</code>
      <size>20480</size>
      <time>1325376000</time>
      <license>CC BY-SA</license>
      <publisher>Ana Martín</publisher>
      <photo>http://swad.ugr.es/photo/ana.jpg</photo>
    </file>
    <dir name="Ejercicios"/>
  </dir>
  <file name="guía &amp; normas.txt">
    <code>99</code><size>10</size><time>0</time>
  </file>
</tree>"#;

  #[test]
  fn parses_nested_folders_and_files() {
    let root = parse_tree(SAMPLE).unwrap();
    assert_eq!(root.len(), 2);

    let tema = &root[0];
    assert_eq!(tema.name, "Tema 1");
    let children = tema.children().unwrap();
    assert_eq!(children.len(), 2);

    let info = children[0].file_info().unwrap();
    assert_eq!(info.code, 1234);
    assert_eq!(info.size, 20480);
    assert_eq!(info.time, 1_325_376_000);
    assert_eq!(info.license, "CC BY-SA");
    assert_eq!(info.publisher, "Ana Martín");
    assert_eq!(info.photo_url, "http://swad.ugr.es/photo/ana.jpg");

    assert_eq!(children[1], DirectoryItem::folder("Ejercicios", vec![]));
    assert_eq!(root[1].name, "guía & normas.txt");
    assert!(matches!(root[1].kind, ItemKind::File(ref f) if f.code == 99));
  }

  #[test]
  fn empty_tree() {
    assert!(parse_tree("<tree/>").unwrap().is_empty());
    assert!(parse_tree("<tree></tree>").unwrap().is_empty());
  }

  #[test]
  fn unknown_elements_are_ignored() {
    let root = parse_tree(r#"<tree><meta>x</meta><dir name="a"><note/></dir></tree>"#).unwrap();
    assert_eq!(root, vec![DirectoryItem::folder("a", vec![])]);
  }

  #[test]
  fn missing_name_is_malformed() {
    assert!(matches!(parse_tree("<tree><dir></dir></tree>"), Err(TreeError::Malformed(_))));
  }

  #[test]
  fn non_numeric_size_is_malformed() {
    let xml = r#"<tree><file name="a"><size>big</size></file></tree>"#;
    assert!(matches!(parse_tree(xml), Err(TreeError::Malformed(m)) if m.contains("size")));
  }

  #[test]
  fn dir_outside_tree_is_malformed() {
    assert!(matches!(parse_tree(r#"<dir name="a"/>"#), Err(TreeError::Malformed(_))));
  }

  #[test]
  fn nested_or_repeated_tree_is_malformed() {
    for xml in [
      "<tree><tree/></tree>",
      r#"<tree><dir name="a"><tree/></dir></tree>"#,
      r#"<tree><tree></tree></tree>"#,
      "<tree/><tree/>",
      "<tree></tree><tree></tree>",
      "<tree/><tree></tree>",
    ] {
      assert!(matches!(parse_tree(xml), Err(TreeError::Malformed(_))), "{xml}");
    }
  }

  #[test]
  fn truncated_document_is_an_error() {
    assert!(parse_tree(r#"<tree><dir name="a">"#).is_err());
  }

  #[test]
  fn mismatched_tags_are_xml_errors() {
    assert!(matches!(parse_tree("<tree><dir name=\"a\"></file></tree>"), Err(TreeError::Xml(_))));
  }
}
