//! Scrapademic — render a Google Scholar profile, reveal every publication row,
//! and normalize the rows into uniform records.

pub mod config;
pub mod normalize;
pub mod paginate;
pub mod renderer;
pub mod retrieve;
pub mod serialize;
pub mod types;

pub use config::ScrapeConfig;
pub use normalize::{normalize_row, RowFragments};
pub use paginate::{expand_all, FixedDelay, NoDelay, Settle};
pub use renderer::{RenderContext, Renderer, SessionOptions};
pub use retrieve::{profile_url, Scraper};
pub use serialize::{serialize, OutputFormat};
pub use types::*;
