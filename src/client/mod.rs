//! Search client
//!
//! Everything the interactive finder needs apart from the map widget
//! itself: bounding-box derivation, the HTTP transport, the results view
//! state and the controller that ties them together.

pub mod api;
pub mod bounds;
pub mod controller;
pub mod view;

pub use api::{GeocacheApi, HttpGeocacheApi, SearchPayload};
pub use bounds::{BoundingBox, LatLng};
pub use controller::{ClientConfig, SearchController, SearchForm, SearchOutcome, SearchTicket};
pub use view::{DetailView, Marker, PhotoSlot, ResultsView, TableRow};

/// Client-side transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
