//! Train journey search.
//!
//! Fetches journey search results from the booking site and flattens them
//! into journey options (stations, times, carriers, fares). The raw search
//! response comes either straight from the search API, keyed by numeric
//! location codes, or from a headless browser that fills in the site's
//! search form by place name.

pub mod browser;
pub mod client;
pub mod error;
pub mod graph;
pub mod normalize;
pub mod request;
pub mod source;

pub use error::{ErrorKind, SearchError};
pub use normalize::{FareOption, JourneyResult, normalize};
pub use source::{JourneySource, find, find_example, parse_departure};
