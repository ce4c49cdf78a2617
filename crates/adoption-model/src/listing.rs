use crate::Category;
use serde::{Deserialize, Serialize};

/// Column order of the listing CSV. `pet_id` and `link` are required on read.
pub const LISTING_HEADER: [&str; 7] = [
    "pet_id",
    "link",
    "name",
    "category",
    "sex",
    "age",
    "photo_url",
];

/// One animal card scraped from a listing page.
///
/// Written once by the listing scraper and read back, unchanged, by the
/// profile extractor. Optional columns are empty in CSV and `None` here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRow {
    /// Site-assigned numeric identifier (e.g., "1728").
    pub pet_id: String,
    /// Absolute URL of the animal's profile page.
    pub link: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    /// Thumbnail shown on the listing card.
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl ListingRow {
    pub fn new(pet_id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            pet_id: pet_id.into(),
            link: link.into(),
            name: None,
            category: None,
            sex: None,
            age: None,
            photo_url: None,
        }
    }

    /// A row the extractor can act on: both identifier and link present.
    pub fn is_actionable(&self) -> bool {
        !self.pet_id.trim().is_empty() && !self.link.trim().is_empty()
    }
}
