//! First-run provisioning from the bundled seed database.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{Error, Result};

fn staging_path(target: &Path) -> PathBuf {
  let mut name = target.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".seeding");
  target.with_file_name(name)
}

/// Copy `seed` byte-for-byte to `target`.
///
/// The copy goes to a staging file first and is renamed into place, so a
/// failed copy never leaves a truncated database behind.
pub async fn copy_seed(seed: &Path, target: &Path) -> Result<u64> {
  let staging = staging_path(target);
  debug!(?seed, ?target, "copying seed database");

  let copied = async {
    if let Some(parent) = target.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = tokio::fs::copy(seed, &staging).await?;
    tokio::fs::rename(&staging, target).await?;
    Ok::<_, std::io::Error>(bytes)
  }
  .await;

  match copied {
    Ok(bytes) => {
      info!(?target, bytes, "seed database installed");
      Ok(bytes)
    }
    Err(source) => {
      let _ = tokio::fs::remove_file(&staging).await;
      Err(Error::SeedCopy { seed: seed.to_path_buf(), source })
    }
  }
}
