//! Writing the resolved map for the site renderer

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::aggregate::VersionMap;

/// Write the map as pretty JSON
///
/// The content goes to a hidden temporary sibling first and is renamed into
/// place, so a renderer reading the file never sees partial content.
pub async fn write_version_map(path: &Path, versions: &VersionMap) -> std::io::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }

    let temp = temp_path(path);
    let mut content = versions.to_json_pretty();
    content.push('\n');

    tokio::fs::write(&temp, content).await?;
    tokio::fs::rename(&temp, path).await?;

    debug!("Wrote {} package versions to {:?}", versions.len(), path);
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "package-versions.json".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}
