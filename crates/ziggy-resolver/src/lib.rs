mod filter;
mod resolve;
mod types;

pub use filter::{filter_for_platform, matches_platform};
pub use resolve::{resolve, supported_versions};
pub use types::{ArtifactReference, NotFound, NotFoundReason};
