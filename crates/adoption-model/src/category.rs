use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown animal category: {0} (expected \"dog\" or \"cat\")")]
    UnknownCategory(String),
}

/// Animal category as listed on the adoption site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Dog,
    Cat,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Dog => "dog",
            Category::Cat => "cat",
        }
    }

    /// Infer the category from a listing URL's `animal` query parameter
    /// (`animal=1` lists dogs, `animal=2` lists cats).
    pub fn from_listing_url(url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        let (_, value) = url.query_pairs().find(|(key, _)| key == "animal")?;
        match value.trim() {
            "1" => Some(Category::Dog),
            "2" => Some(Category::Cat),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dog" | "dogs" => Ok(Category::Dog),
            "cat" | "cats" => Ok(Category::Cat),
            other => Err(ModelError::UnknownCategory(other.to_string())),
        }
    }
}
