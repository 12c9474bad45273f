//! Search controller
//!
//! Owns the view state and the API handle. Each search is stamped with a
//! generation number; a response is rendered only if no newer search has
//! started since, so a slow early response cannot overwrite a later one.

use super::ClientError;
use super::api::{GeocacheApi, SearchPayload};
use super::bounds::{BoundingBox, DEFAULT_CENTER, DEFAULT_DISTANCE, LatLng, METERS_PER_MILE, radius_meters};
use super::view::ResultsView;
use crate::service::SearchRequest;

/// Client-side settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Center used when the form leaves it blank
    pub default_center: LatLng,
    /// Distance used when the form leaves it blank
    pub default_distance: f64,
    /// Meters per user-facing distance unit
    pub meters_per_unit: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_distance: DEFAULT_DISTANCE,
            meters_per_unit: METERS_PER_MILE,
        }
    }
}

/// Raw search form input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchForm {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub distance: Option<String>,
    /// Cache type id, "" for any
    pub cache_type: String,
    /// Difficulty rating, "" for any
    pub difficulty: String,
}

/// An issued search, waiting for its response.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    generation: u64,
    pub center: LatLng,
    pub bounds: BoundingBox,
    pub request: SearchRequest,
}

/// What happened to a search response.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Rendered this many results
    Rendered(usize),
    /// The view now shows the failure alert
    Failed,
    /// A newer search superseded this one; nothing changed
    Superseded,
}

/// Single owner of the search client's state.
pub struct SearchController<A> {
    api: A,
    config: ClientConfig,
    view: ResultsView,
    generation: u64,
}

impl<A: GeocacheApi> SearchController<A> {
    pub fn new(api: A, config: ClientConfig) -> Self {
        Self {
            api,
            config,
            view: ResultsView::new(),
            generation: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn view(&self) -> &ResultsView {
        &self.view
    }

    /// Derive the bounding box for `form` and issue a new search ticket.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_search(&mut self, form: &SearchForm) -> SearchTicket {
        let center = LatLng::resolve(
            form.lat.as_deref(),
            form.lng.as_deref(),
            self.config.default_center,
        );
        let radius = radius_meters(
            form.distance.as_deref(),
            self.config.default_distance,
            self.config.meters_per_unit,
        );
        let bounds = BoundingBox::around(center, radius);

        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            lat = center.lat,
            lng = center.lng,
            radius_m = radius,
            "Starting geocache search"
        );

        SearchTicket {
            generation: self.generation,
            center,
            bounds,
            request: bounds.to_request(&form.cache_type, &form.difficulty),
        }
    }

    /// Apply the response for `ticket` to the view, unless superseded.
    pub fn finish_search(
        &mut self,
        ticket: &SearchTicket,
        response: Result<SearchPayload, ClientError>,
    ) -> SearchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "Ignoring superseded search response"
            );
            return SearchOutcome::Superseded;
        }

        match response {
            Ok(payload) => match self.view.render(payload) {
                Ok(count) => SearchOutcome::Rendered(count),
                Err(_) => SearchOutcome::Failed,
            },
            Err(error) => {
                self.view.show_failure(&error);
                SearchOutcome::Failed
            }
        }
    }

    /// Run a complete search for `form`.
    pub async fn search(&mut self, form: &SearchForm) -> SearchOutcome {
        let ticket = self.begin_search(form);
        let response = self.api.search(&ticket.request).await;
        self.finish_search(&ticket, response)
    }

    /// Open the detail view for result `index` and load its photos.
    ///
    /// Returns `false` if there is no such result.
    pub async fn select(&mut self, index: usize) -> bool {
        let Some(ticket) = self.view.select(index) else {
            return false;
        };

        let photos = self
            .api
            .photos(ticket.position.lat, ticket.position.lng)
            .await;
        self.view.fill_photos(ticket, photos);
        true
    }

    /// Close the detail view.
    pub fn close_detail(&mut self) {
        self.view.close_detail();
    }
}
