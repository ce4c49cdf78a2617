pub mod category;
pub mod listing;
pub mod profile;

pub use category::*;
pub use listing::*;
pub use profile::*;
