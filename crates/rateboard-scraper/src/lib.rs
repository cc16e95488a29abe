//! Public-profile fetcher driving a headless browser.

pub mod chrome;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod selectors;
pub mod session;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use error::FetchError;
pub use extract::ExtractedFields;
pub use fetcher::{FetcherSettings, ProfileFetcher, ProfileSource};
pub use session::{BrowserLauncher, BrowserSession};
