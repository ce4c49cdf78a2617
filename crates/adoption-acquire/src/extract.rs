use crate::client::Fetcher;
use crate::pool::run_bounded;
use crate::profile::{parse_profile_page, ParsedProfile};
use adoption_model::{ListingRow, ProfileRecord};
use anyhow::{Context, Result};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

/// Counts for one extraction run. `links == success + missing_info + failed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub links: usize,
    pub success: usize,
    pub missing_info: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Extracted records, in completion order.
    pub records: Vec<ProfileRecord>,
    pub summary: ExtractSummary,
}

/// How a single listing row ended.
#[derive(Debug)]
enum Outcome {
    Extracted(ProfileRecord),
    MissingInfo,
    Failed,
}

/// Read listing rows from CSV.
///
/// The file and its header are required: a missing `pet_id` or `link`
/// column is an error. Individual malformed or incomplete rows are logged
/// and skipped.
pub fn read_listing_csv(path: &Path) -> Result<Vec<ListingRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open listing CSV {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header from {}", path.display()))?
        .clone();
    for required in ["pet_id", "link"] {
        anyhow::ensure!(
            headers.iter().any(|h| h == required),
            "{} is missing the required '{required}' column",
            path.display()
        );
    }

    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<ListingRow>().enumerate() {
        let line = index + 2;
        match result {
            Ok(row) if row.is_actionable() => rows.push(row),
            Ok(row) => {
                tracing::warn!(line, pet_id = %row.pet_id, "Skipping row with missing pet_id or link");
            }
            Err(err) => {
                tracing::warn!(line, error = %err, "Skipping malformed CSV row");
            }
        }
    }

    tracing::info!(path = %path.display(), rows = rows.len(), "Read listing rows");
    Ok(rows)
}

/// Fetch and parse one profile page per row, at most `limit` at a time.
///
/// Rows whose page cannot be fetched, or lacks the profile markup, are
/// logged with their identifier and left out of the report's records.
pub async fn extract_profiles(
    fetcher: Arc<Fetcher>,
    rows: Vec<ListingRow>,
    limit: NonZeroUsize,
) -> ExtractReport {
    let links = rows.len();
    tracing::info!(links, concurrency = limit.get(), "Extracting profiles");

    let outcomes = run_bounded(rows, limit, |row| {
        let fetcher = fetcher.clone();
        async move { extract_one(&fetcher, row).await }
    })
    .await;

    let mut report = ExtractReport::default();
    report.summary.links = links;
    for outcome in outcomes {
        match outcome {
            Outcome::Extracted(record) => {
                report.summary.success += 1;
                report.records.push(record);
            }
            Outcome::MissingInfo => report.summary.missing_info += 1,
            Outcome::Failed => report.summary.failed += 1,
        }
    }
    // A worker that panicked produced no outcome.
    report.summary.failed += links
        - (report.summary.success + report.summary.missing_info + report.summary.failed);

    report
}

async fn extract_one(fetcher: &Fetcher, row: ListingRow) -> Outcome {
    let html = match fetcher.fetch_text(&row.link).await {
        Ok(html) => html,
        Err(err) => {
            tracing::error!(
                pet_id = %row.pet_id,
                url = %row.link,
                timed_out = err.is_timeout(),
                error = %err,
                "Failed to fetch profile"
            );
            return Outcome::Failed;
        }
    };

    match parse_profile_page(&html, &row.link) {
        Some(parsed) => {
            tracing::info!(pet_id = %row.pet_id, url = %row.link, "Extracted profile");
            Outcome::Extracted(into_record(row, parsed))
        }
        None => {
            tracing::warn!(pet_id = %row.pet_id, url = %row.link, "Profile info not found");
            Outcome::MissingInfo
        }
    }
}

/// Join a listing row with its parsed page. Page data wins; the listing's
/// name fills in when the page has none.
fn into_record(row: ListingRow, parsed: ParsedProfile) -> ProfileRecord {
    ProfileRecord {
        pet_id: row.pet_id,
        link: row.link,
        category: row.category,
        name: parsed.name.or(row.name),
        age: parsed.age,
        gender: parsed.gender,
        photos: parsed.photos,
        videos: parsed.videos,
        about: parsed.about,
        history: parsed.history,
    }
}

impl ExtractSummary {
    pub fn log(&self) {
        tracing::info!(
            total = self.links,
            success = self.success,
            missing_info = self.missing_info,
            failed = self.failed,
            "Profile extraction summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::scratch_dir;
    use adoption_model::Category;
    use std::fs;

    #[test]
    fn test_read_listing_csv_skips_incomplete_rows() {
        let dir = scratch_dir("read-csv");
        let path = dir.join("data.csv");
        fs::write(
            &path,
            "pet_id,link,name,category,sex,age,photo_url\n\
             1728,https://dogcat.com.ua/pet/piksel,Піксель,cat,Хлопчик,1 місяць,\n\
             ,https://dogcat.com.ua/pet/noid,,,,,\n\
             1727,,Цімба,cat,,,\n\
             1726,https://dogcat.com.ua/pet/rex,Рекс,hamster,,,\n\
             1725,https://dogcat.com.ua/pet/bim,,dog,,,\n",
        )
        .unwrap();

        let rows = read_listing_csv(&path).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.pet_id.as_str()).collect();
        assert_eq!(ids, vec!["1728", "1725"]);
        assert_eq!(rows[0].category, Some(Category::Cat));
        assert_eq!(rows[0].photo_url, None);
        assert_eq!(rows[1].name, None);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_read_listing_csv_minimal_header() {
        let dir = scratch_dir("read-csv-min");
        let path = dir.join("data.csv");
        fs::write(&path, "pet_id,link\n1728,https://dogcat.com.ua/pet/piksel\n").unwrap();

        let rows = read_listing_csv(&path).unwrap();
        assert_eq!(rows, vec![ListingRow::new("1728", "https://dogcat.com.ua/pet/piksel")]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_read_listing_csv_requires_columns() {
        let dir = scratch_dir("read-csv-bad");
        let path = dir.join("data.csv");
        fs::write(&path, "id,url\n1,http://x\n").unwrap();
        let err = read_listing_csv(&path).unwrap_err();
        assert!(err.to_string().contains("pet_id"));
        assert!(read_listing_csv(&dir.join("absent.csv")).is_err());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_into_record_prefers_page_name() {
        let mut row = ListingRow::new("1", "http://x/pet/1");
        row.name = Some("Listing".into());
        row.category = Some(Category::Dog);

        let named = into_record(
            row.clone(),
            ParsedProfile {
                name: Some("Page".into()),
                ..Default::default()
            },
        );
        assert_eq!(named.name.as_deref(), Some("Page"));
        assert_eq!(named.category, Some(Category::Dog));

        let unnamed = into_record(row, ParsedProfile::default());
        assert_eq!(unnamed.name.as_deref(), Some("Listing"));
    }
}
