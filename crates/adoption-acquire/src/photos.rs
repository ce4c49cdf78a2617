use crate::client::Fetcher;
use crate::output::write_atomic_async;
use crate::pool::{run_bounded, DEFAULT_CONCURRENCY};
use adoption_model::ProfileRecord;
use anyhow::{Context, Result};
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MAX_NAME_LEN: usize = 100;

/// One photo to fetch and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoJob {
    pub pet_id: String,
    pub url: String,
    pub dest: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct DownloadOptions {
    /// Downloads in flight across all profiles.
    pub limit: NonZeroUsize,
    /// Leave files that already exist alone instead of fetching them again.
    pub skip_existing: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_CONCURRENCY,
            skip_existing: true,
        }
    }
}

/// Counts for one download run. `total == downloaded + skipped + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub total: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn log(&self) {
        tracing::info!(
            total = self.total,
            downloaded = self.downloaded,
            skipped = self.skipped,
            failed = self.failed,
            "Photo download summary"
        );
    }
}

#[derive(Debug)]
enum Outcome {
    Downloaded,
    Skipped,
    Failed,
}

/// Read profile records from a JSON array.
///
/// The file must exist and hold an array; elements that do not match the
/// record shape are logged and skipped.
pub fn read_profiles_json(path: &Path) -> Result<Vec<ProfileRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles JSON {}", path.display()))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of profiles", path.display()))?;

    let mut records = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let pet_id = value.get("pet_id").and_then(|v| v.as_str()).map(str::to_string);
        match serde_json::from_value::<ProfileRecord>(value) {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(
                index,
                pet_id = pet_id.as_deref().unwrap_or("?"),
                error = %err,
                "Skipping malformed profile record"
            ),
        }
    }

    tracing::info!(path = %path.display(), profiles = records.len(), "Read profile records");
    Ok(records)
}

/// Photos land next to the profiles file: `data/cats/adoption_profiles.json`
/// -> `data/cats/photos`.
pub fn default_output_dir(json_path: &Path) -> PathBuf {
    json_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("photos")
}

/// Make `raw` safe as a single path component. Keeps letters, digits, `-`,
/// `_` and `.`; anything else becomes `_`. Returns `None` if nothing usable
/// is left (empty, only dots or underscores).
pub fn sanitize_component(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let cleaned: String = cleaned.chars().take(MAX_NAME_LEN).collect();
    if cleaned.chars().all(|c| matches!(c, '.' | '_')) {
        return None;
    }
    Some(cleaned)
}

/// File name for the `index`th (1-based) photo of a profile, taken from
/// the URL's last path segment. Falls back to `photo_<index>.jpg`.
pub fn photo_file_name(url: &str, index: usize) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|s| s.last().map(str::to_string)));

    match segment.as_deref().and_then(sanitize_component) {
        Some(name) if name.contains('.') => name,
        Some(name) => format!("{name}.jpg"),
        None => format!("photo_{index}.jpg"),
    }
}

/// `a.jpg` + 2 -> `a_2.jpg`; `a` + 2 -> `a_2`.
fn with_suffix(name: &str, index: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{index}.{ext}"),
        _ => format!("{name}_{index}"),
    }
}

/// Flatten every (profile, photo URL) pair into a job under
/// `<output_dir>/<pet_id>/`.
///
/// Names are deterministic for a given input, so a re-run maps each URL
/// to the same file. Profiles whose id cannot be used as a directory name
/// are skipped with a warning.
pub fn plan_downloads(records: &[ProfileRecord], output_dir: &Path) -> Vec<PhotoJob> {
    let mut jobs = Vec::new();
    let mut taken: HashMap<String, HashSet<String>> = HashMap::new();

    for record in records {
        if record.photos.is_empty() {
            continue;
        }
        let Some(dir_name) = sanitize_component(&record.pet_id) else {
            tracing::warn!(
                pet_id = %record.pet_id,
                photos = record.photos.len(),
                "Skipping photos of profile with unusable id"
            );
            continue;
        };
        let names = taken.entry(dir_name.clone()).or_default();
        let profile_dir = output_dir.join(&dir_name);

        for (i, url) in record.photos.iter().enumerate() {
            let index = i + 1;
            let base = photo_file_name(url, index);
            let mut name = base.clone();
            let mut suffix = index;
            while names.contains(&name) {
                name = with_suffix(&base, suffix);
                suffix += 1;
            }
            names.insert(name.clone());
            jobs.push(PhotoJob {
                pet_id: record.pet_id.clone(),
                url: url.clone(),
                dest: profile_dir.join(name),
            });
        }
    }

    jobs
}

/// Download every job with at most `options.limit` transfers in flight in
/// total. Per-photo failures are logged and counted, never propagated.
pub async fn download_photos(
    fetcher: Arc<Fetcher>,
    jobs: Vec<PhotoJob>,
    options: DownloadOptions,
) -> DownloadSummary {
    let total = jobs.len();
    tracing::info!(
        photos = total,
        concurrency = options.limit.get(),
        skip_existing = options.skip_existing,
        "Downloading photos"
    );

    let outcomes = run_bounded(jobs, options.limit, |job| {
        let fetcher = fetcher.clone();
        async move { download_one(&fetcher, job, options.skip_existing).await }
    })
    .await;

    let mut summary = DownloadSummary {
        total,
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Downloaded => summary.downloaded += 1,
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Failed => summary.failed += 1,
        }
    }
    summary.failed += total - (summary.downloaded + summary.skipped + summary.failed);
    summary
}

async fn download_one(fetcher: &Fetcher, job: PhotoJob, skip_existing: bool) -> Outcome {
    if skip_existing && tokio::fs::try_exists(&job.dest).await.unwrap_or(false) {
        tracing::debug!(pet_id = %job.pet_id, path = %job.dest.display(), "Already downloaded");
        return Outcome::Skipped;
    }

    let bytes = match fetcher.fetch_bytes(&job.url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(
                pet_id = %job.pet_id,
                url = %job.url,
                timed_out = err.is_timeout(),
                error = %err,
                "Failed to fetch photo"
            );
            return Outcome::Failed;
        }
    };

    if let Err(err) = write_atomic_async(&job.dest, &bytes).await {
        tracing::error!(
            pet_id = %job.pet_id,
            url = %job.url,
            path = %job.dest.display(),
            error = %err,
            "Failed to write photo"
        );
        return Outcome::Failed;
    }

    tracing::info!(
        pet_id = %job.pet_id,
        path = %job.dest.display(),
        bytes = bytes.len(),
        "Saved photo"
    );
    Outcome::Downloaded
}
