pub mod client;
pub mod error;
pub mod extract;
pub mod listing;
pub mod normalize;
pub mod output;
pub mod photos;
pub mod pool;
pub mod profile;

pub use client::{ClientConfig, Fetcher};
pub use error::FetchError;
