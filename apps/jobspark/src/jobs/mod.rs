pub mod browser;
pub mod feed;
pub mod filter;

pub use browser::{JobBrowser, Lookup, SortOrder};
pub use feed::{FetchGuard, JobFeed, LoadState};
pub use filter::{JobFilter, JobListing};
