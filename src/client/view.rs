//! Results view state
//!
//! Holds what the user sees after a search: one marker and one table row
//! per result, an optional detail view for the selected result, and an
//! alert line for failures. Rendering replaces everything at once.

use super::ClientError;
use super::api::SearchPayload;
use super::bounds::LatLng;
use crate::data::GeocacheRecord;
use crate::service::{PhotoList, PhotoSummary};

/// Alert shown when the server answers with anything but a result list.
pub const SERVER_FAILURE_ALERT: &str = "Something went wrong. Please check the server!!";

/// Inline text shown in place of photos when the lookup fails.
pub const PHOTO_FAILURE_TEXT: &str = "Error loading photos.";

/// Map marker for result `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub index: usize,
    pub position: LatLng,
    /// Tooltip: "{type}, Difficulty: {difficulty}"
    pub title: String,
}

/// Table row for result `index`: type, difficulty, "lat, lng".
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub index: usize,
    pub cells: [String; 3],
}

/// Contents of the photo area inside a detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoSlot {
    Loading,
    Loaded(Vec<PhotoSummary>),
    Failed(String),
}

/// Detail view for the selected result.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub index: usize,
    pub cache_type: String,
    pub difficulty: String,
    pub location: String,
    /// Where the map should pan to
    pub pan_to: LatLng,
    pub photos: PhotoSlot,
}

/// Handle for filling the photo slot of one particular detail view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoTicket {
    generation: u64,
    pub index: usize,
    pub position: LatLng,
}

/// Why a render did not produce rows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("server reported an error: {0}")]
    Server(String),
    #[error("expected a result list, got {0}")]
    NotASequence(String),
    #[error("result {0} has no usable coordinates")]
    MissingCoordinates(usize),
}

/// Everything currently displayed for the last search.
#[derive(Debug, Default)]
pub struct ResultsView {
    results: Vec<GeocacheRecord>,
    markers: Vec<Marker>,
    rows: Vec<TableRow>,
    detail: Option<DetailView>,
    alert: Option<String>,
    detail_generation: u64,
}

impl ResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[GeocacheRecord] {
        &self.results
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn detail(&self) -> Option<&DetailView> {
        self.detail.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Replace the displayed results with `payload`.
    ///
    /// The new marker and row sets are built completely before the old ones
    /// are dropped. A payload that is not a result list clears markers, rows
    /// and detail and raises the failure alert.
    pub fn render(&mut self, payload: SearchPayload) -> Result<usize, RenderError> {
        let records = match payload {
            SearchPayload::Rows(records) => records,
            SearchPayload::Error(body) => {
                let detail = match body.message {
                    Some(message) => format!("{}: {}", body.error, message),
                    None => body.error,
                };
                return Err(self.fail(RenderError::Server(detail)));
            }
            SearchPayload::Unexpected(value) => {
                return Err(self.fail(RenderError::NotASequence(value.to_string())));
            }
        };

        let mut markers = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let Some(marker) = marker_for(index, record) else {
                return Err(self.fail(RenderError::MissingCoordinates(index)));
            };
            markers.push(marker);
        }
        let rows = records.iter().enumerate().map(row_for).collect();

        self.markers = markers;
        self.rows = rows;
        self.results = records;
        self.detail = None;
        self.alert = None;

        tracing::debug!(count = self.results.len(), "Rendered search results");
        Ok(self.results.len())
    }

    /// Record a failed search: clear results and raise the alert.
    pub fn show_failure(&mut self, error: &ClientError) {
        tracing::error!(%error, "Error fetching geocache data");
        self.clear();
        self.alert = Some(SERVER_FAILURE_ALERT.to_string());
    }

    fn fail(&mut self, error: RenderError) -> RenderError {
        tracing::error!(%error, "Expected a result list");
        self.clear();
        self.alert = Some(SERVER_FAILURE_ALERT.to_string());
        error
    }

    fn clear(&mut self) {
        self.results.clear();
        self.markers.clear();
        self.rows.clear();
        self.detail = None;
    }

    /// Open the detail view for result `index`.
    ///
    /// Marker and table-row selection both land here. The photo slot starts
    /// out loading; the returned ticket fills it.
    pub fn select(&mut self, index: usize) -> Option<PhotoTicket> {
        let record = self.results.get(index)?;
        let position = position_of(record)?;

        self.detail_generation += 1;
        self.detail = Some(DetailView {
            index,
            cache_type: record.cache_type().to_string(),
            difficulty: record.display("difficulty_rating"),
            location: location_text(record),
            pan_to: position,
            photos: PhotoSlot::Loading,
        });

        Some(PhotoTicket {
            generation: self.detail_generation,
            index,
            position,
        })
    }

    /// Fill the photo slot opened with `ticket`.
    ///
    /// Returns `false` and changes nothing if another detail view has been
    /// opened (or the results replaced) since the ticket was issued.
    pub fn fill_photos(
        &mut self,
        ticket: PhotoTicket,
        photos: Result<PhotoList, ClientError>,
    ) -> bool {
        if ticket.generation != self.detail_generation {
            tracing::debug!(index = ticket.index, "Dropping stale photo result");
            return false;
        }
        let Some(detail) = self.detail.as_mut() else {
            return false;
        };

        detail.photos = match photos {
            Ok(list) => PhotoSlot::Loaded(list.photos),
            Err(error) => {
                tracing::error!(%error, index = ticket.index, "Photo lookup failed");
                PhotoSlot::Failed(PHOTO_FAILURE_TEXT.to_string())
            }
        };
        true
    }

    /// Close the detail view. Pending photo tickets become stale.
    pub fn close_detail(&mut self) {
        self.detail_generation += 1;
        self.detail = None;
    }
}

fn location_text(record: &GeocacheRecord) -> String {
    format!(
        "{}, {}",
        record.display("latitude"),
        record.display("longitude")
    )
}

fn position_of(record: &GeocacheRecord) -> Option<LatLng> {
    Some(LatLng {
        lat: record.latitude()?,
        lng: record.longitude()?,
    })
}

fn marker_for(index: usize, record: &GeocacheRecord) -> Option<Marker> {
    Some(Marker {
        index,
        position: position_of(record)?,
        title: format!(
            "{}, Difficulty: {}",
            record.cache_type(),
            record.display("difficulty_rating")
        ),
    })
}

fn row_for((index, record): (usize, &GeocacheRecord)) -> TableRow {
    TableRow {
        index,
        cells: [
            record.cache_type().to_string(),
            record.display("difficulty_rating"),
            location_text(record),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorBody;

    fn record(lat: f64, lng: f64, cache_type: &str, difficulty: f64) -> GeocacheRecord {
        serde_json::from_value(serde_json::json!({
            "latitude": lat,
            "longitude": lng,
            "cache_type_id": 1,
            "difficulty_rating": difficulty,
            "cache_type": cache_type
        }))
        .unwrap()
    }

    fn two_results() -> SearchPayload {
        SearchPayload::Rows(vec![
            record(32.2, -110.9, "Traditional", 1.5),
            record(32.3, -110.8, "Multi-Cache", 3.0),
        ])
    }

    #[test]
    fn render_builds_matching_markers_and_rows() {
        let mut view = ResultsView::new();
        assert_eq!(view.render(two_results()), Ok(2));

        assert_eq!(view.markers().len(), 2);
        assert_eq!(view.rows().len(), 2);
        assert_eq!(view.markers()[1].title, "Multi-Cache, Difficulty: 3");
        assert_eq!(
            view.rows()[0].cells,
            [
                "Traditional".to_string(),
                "1.5".to_string(),
                "32.2, -110.9".to_string()
            ]
        );
        for (marker, row) in view.markers().iter().zip(view.rows()) {
            assert_eq!(marker.index, row.index);
        }
    }

    #[test]
    fn render_is_idempotent() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();
        view.render(two_results()).unwrap();

        assert_eq!(view.markers().len(), 2);
        assert_eq!(view.rows().len(), 2);
        assert!(view.alert().is_none());
    }

    #[test]
    fn error_payload_clears_view_and_alerts() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();
        view.select(0);

        let result = view.render(SearchPayload::Error(ErrorBody {
            error: "Query failed".to_string(),
            message: Some("no such table".to_string()),
        }));

        assert_eq!(
            result,
            Err(RenderError::Server("Query failed: no such table".to_string()))
        );
        assert!(view.markers().is_empty());
        assert!(view.rows().is_empty());
        assert!(view.detail().is_none());
        assert_eq!(view.alert(), Some(SERVER_FAILURE_ALERT));
    }

    #[test]
    fn null_difficulty_renders_blank() {
        let mut view = ResultsView::new();
        let row: GeocacheRecord = serde_json::from_value(serde_json::json!({
            "latitude": 32.2,
            "longitude": -110.9,
            "cache_type_id": 1,
            "difficulty_rating": null,
            "cache_type": "Traditional"
        }))
        .unwrap();

        assert_eq!(view.render(SearchPayload::Rows(vec![row])), Ok(1));
        assert_eq!(view.markers()[0].title, "Traditional, Difficulty: ");
        assert_eq!(view.rows()[0].cells[1], "");
    }

    #[test]
    fn row_without_coordinates_fails_whole_render() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();

        let broken: GeocacheRecord =
            serde_json::from_value(serde_json::json!({"cache_type": "Traditional"})).unwrap();
        let result = view.render(SearchPayload::Rows(vec![
            record(32.2, -110.9, "Traditional", 1.0),
            broken,
        ]));

        assert_eq!(result, Err(RenderError::MissingCoordinates(1)));
        assert!(view.markers().is_empty());
        assert!(view.rows().is_empty());
        assert_eq!(view.alert(), Some(SERVER_FAILURE_ALERT));
    }

    #[test]
    fn successful_render_clears_previous_alert() {
        let mut view = ResultsView::new();
        let _ = view.render(SearchPayload::Unexpected(serde_json::json!(42)));
        assert!(view.alert().is_some());

        view.render(two_results()).unwrap();
        assert!(view.alert().is_none());
    }

    #[test]
    fn select_opens_detail_with_loading_photos() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();

        let ticket = view.select(1).unwrap();
        let detail = view.detail().unwrap();

        assert_eq!(ticket.index, 1);
        assert_eq!(detail.cache_type, "Multi-Cache");
        assert_eq!(detail.difficulty, "3");
        assert_eq!(detail.location, "32.3, -110.8");
        assert_eq!(detail.pan_to, LatLng { lat: 32.3, lng: -110.8 });
        assert_eq!(detail.photos, PhotoSlot::Loading);

        assert!(view.select(5).is_none());
    }

    #[test]
    fn photos_fill_current_detail_only() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();

        let first = view.select(0).unwrap();
        let second = view.select(1).unwrap();

        let photos = PhotoList {
            photos: vec![PhotoSummary {
                id: "1".to_string(),
                title: "cactus".to_string(),
                thumbnail_url: "https://farm1.staticflickr.com/2/1_s_t.jpg".to_string(),
            }],
        };

        assert!(!view.fill_photos(first, Ok(photos.clone())));
        assert_eq!(view.detail().unwrap().photos, PhotoSlot::Loading);

        assert!(view.fill_photos(second, Ok(photos.clone())));
        assert_eq!(view.detail().unwrap().photos, PhotoSlot::Loaded(photos.photos));
    }

    #[test]
    fn photo_failure_shows_inline_fallback() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();
        let ticket = view.select(0).unwrap();

        assert!(view.fill_photos(ticket, Err(ClientError::Decode("bad".to_string()))));
        assert_eq!(
            view.detail().unwrap().photos,
            PhotoSlot::Failed(PHOTO_FAILURE_TEXT.to_string())
        );
        assert!(view.alert().is_none());
    }

    #[test]
    fn closing_detail_invalidates_ticket() {
        let mut view = ResultsView::new();
        view.render(two_results()).unwrap();
        let ticket = view.select(0).unwrap();
        view.close_detail();

        assert!(!view.fill_photos(ticket, Ok(PhotoList { photos: Vec::new() })));
        assert!(view.detail().is_none());
    }
}
