//! Service layer
//!
//! Business logic between the HTTP handlers and the data layer.

pub mod photos;
pub mod search;

pub use photos::{Photo, PhotoList, PhotoService, PhotoSummary};
pub use search::{GeocacheSearch, SearchRequest, parse_search_payload};
