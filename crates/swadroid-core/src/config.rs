//! Layered settings loading.
//!
//! Each crate owns a `serde` section (`[store]`, `[sync]`); this helper reads
//! one section from an optional TOML file and `SWAD_*` environment variables,
//! e.g. `SWAD_SYNC__RETENTION_LIMIT=50`.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::Result;

pub const ENV_PREFIX: &str = "SWAD";

/// Load `section` from `path` (if given and present) and the environment.
/// A section that appears nowhere yields `T::default()`.
pub fn load_section<T>(path: Option<&Path>, section: &str) -> Result<T>
where
  T: DeserializeOwned + Default,
{
  let mut builder = config::Config::builder();
  if let Some(path) = path {
    builder = builder.add_source(config::File::from(path).required(false));
  }
  let settings = builder
    .add_source(
      config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true),
    )
    .build()?;

  match settings.get::<T>(section) {
    Ok(value) => Ok(value),
    Err(config::ConfigError::NotFound(_)) => Ok(T::default()),
    Err(e) => Err(e.into()),
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use serde::Deserialize;

  use super::*;

  #[derive(Debug, Default, Deserialize, PartialEq)]
  #[serde(default)]
  struct Section {
    limit: usize,
    label: String,
  }

  #[test]
  fn missing_section_is_default() {
    let loaded: Section = load_section(None, "absent_section_for_test").unwrap();
    assert_eq!(loaded, Section::default());
  }

  #[test]
  fn reads_section_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[demo]\nlimit = 7\nlabel = \"x\"").unwrap();

    let loaded: Section = load_section(Some(&path), "demo").unwrap();
    assert_eq!(loaded, Section { limit: 7, label: "x".into() });
  }

  #[test]
  fn concurrent_file_loads_do_not_collide() {
    let handles: Vec<_> = (0..4usize)
      .map(|limit| {
        std::thread::spawn(move || {
          let dir = tempfile::tempdir().unwrap();
          let path = dir.path().join("settings.toml");
          std::fs::write(&path, format!("[demo]\nlimit = {limit}\n")).unwrap();
          let loaded: Section = load_section(Some(&path), "demo").unwrap();
          loaded.limit
        })
      })
      .collect();

    for (limit, handle) in handles.into_iter().enumerate() {
      assert_eq!(handle.join().unwrap(), limit);
    }
  }
}
