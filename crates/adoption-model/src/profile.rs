use crate::Category;
use serde::{Deserialize, Serialize};

/// Structured data for one animal, extracted from its profile page.
///
/// Every scalar attribute is best effort: a field the page does not carry is
/// `None` and serializes as `null`. List fields are always present, possibly
/// empty. Records are keyed by `pet_id`; output order carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRecord {
    pub pet_id: String,
    /// Profile page the record was extracted from.
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form age as printed on the page (e.g., "1 місяць").
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// Full-size photo URLs from the profile slider.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Video links from the profile slider. Not downloaded.
    #[serde(default)]
    pub videos: Vec<String>,
    /// Skill/trait badges from the "about" block.
    #[serde(default)]
    pub about: Vec<String>,
    /// Adoption history paragraph with line breaks removed.
    #[serde(default)]
    pub history: Option<String>,
}

impl ProfileRecord {
    pub fn new(pet_id: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            pet_id: pet_id.into(),
            link: link.into(),
            category: None,
            name: None,
            age: None,
            gender: None,
            photos: Vec::new(),
            videos: Vec::new(),
            about: Vec::new(),
            history: None,
        }
    }
}
