use adoption_model::{ListingRow, ProfileRecord, LISTING_HEADER};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Sibling path used while a file is being written: `photo.jpg` ->
/// `photo.jpg.part`.
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".part");
    path.with_file_name(name)
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Write `contents` to `path` fully or not at all: the bytes go to a
/// `.part` sibling that is renamed over the destination once complete.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let tmp = part_path(path);
    let written = fs::write(&tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))
        .and_then(|()| {
            fs::rename(&tmp, path)
                .with_context(|| format!("Failed to move {} into place", path.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

/// Async counterpart of [`write_atomic`] for use inside download workers.
pub async fn write_atomic_async(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let tmp = part_path(path);
    let mut written = tokio::fs::write(&tmp, contents).await;
    if written.is_ok() {
        written = tokio::fs::rename(&tmp, path).await;
    }
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

/// Write listing rows as CSV with the fixed header, even when `rows` is
/// empty.
pub fn write_listing_csv(path: &Path, rows: &[ListingRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(LISTING_HEADER)?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to encode listing row {}", row.pet_id))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Failed to flush CSV buffer: {}", err.error()))?;

    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "Wrote listing CSV");
    Ok(())
}

/// Write profile records as a pretty-printed JSON array.
pub fn write_profiles_json(path: &Path, records: &[ProfileRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    write_atomic(path, json.as_bytes())?;
    tracing::info!(path = %path.display(), profiles = records.len(), "Wrote profiles JSON");
    Ok(())
}
