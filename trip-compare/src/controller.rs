use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use trip_compare_model::{
    City, DestinationsResponse, LatLon, Mode, RouteResponse, RouteSet, SummaryEntry,
};

use crate::bounds::{compute_bounds, Bounds};
use crate::chart::{summary_table, EmissionsChart, SummaryRow};
use crate::route::{render_route, RouteVisual};
use crate::Config;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Popup {
    pub position: LatLon,
    pub mode: Mode,
    pub info: serde_json::Value,
}

/// A request the host has to make against the backend. Its result comes back through
/// `ViewController::on_destinations_loaded` or `on_routes_loaded`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fetch {
    Destinations { origin: String },
    Routes { origin: String, destination: String },
}

impl Fetch {
    pub fn path(&self) -> String {
        match self {
            Fetch::Destinations { origin } => format!("/destinations/{}", origin),
            Fetch::Routes {
                origin,
                destination,
            } => format!("/route/{}/{}", origin, destination),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NoOrigin,
    HasOrigin,
    /// A destination is selected, but its routes haven't arrived yet
    LoadingRoutes,
    RoutesLoaded,
}

/// How the map should be framed.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MapView {
    Fit { bounds: Bounds },
    FlyTo { center: LatLon, zoom: f64 },
}

/// Everything the user has selected and what's been loaded for it. Never mutated in place; every
/// transition produces a new state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    origin: Option<String>,
    origin_markers: Vec<City>,
    destination_markers: Vec<City>,
    destination: Option<String>,
    routes_pending: bool,
    routes: RouteSet,
    summary: Vec<SummaryEntry>,
    popup: Option<Popup>,
}

pub struct Transition {
    pub state: SelectionState,
    pub fetch: Option<Fetch>,
}

impl SelectionState {
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }
    pub fn origin_markers(&self) -> &[City] {
        &self.origin_markers
    }
    pub fn destination_markers(&self) -> &[City] {
        &self.destination_markers
    }
    pub fn routes(&self) -> &RouteSet {
        &self.routes
    }
    pub fn summary(&self) -> &[SummaryEntry] {
        &self.summary
    }
    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match (&self.origin, &self.destination) {
            (None, _) => Phase::NoOrigin,
            (Some(_), None) => Phase::HasOrigin,
            (Some(_), Some(_)) if self.routes_pending => Phase::LoadingRoutes,
            (Some(_), Some(_)) => Phase::RoutesLoaded,
        }
    }

    /// Starts over from a new origin. Everything loaded for the old one is dropped.
    pub fn set_origin(&self, origin: &str) -> (SelectionState, Fetch) {
        let state = SelectionState {
            origin: Some(origin.to_string()),
            ..Default::default()
        };
        let fetch = Fetch::Destinations {
            origin: origin.to_string(),
        };
        (state, fetch)
    }

    /// Selecting the current destination again deselects it. Otherwise the old routes disappear
    /// right away, and new ones have to be fetched.
    pub fn select_destination(&self, destination: &str) -> Transition {
        if self.destination.as_deref() == Some(destination) {
            return Transition {
                state: self.without_destination(),
                fetch: None,
            };
        }

        let Some(origin) = self.origin.clone() else {
            warn!("Ignoring destination {} without an origin", destination);
            return Transition {
                state: self.clone(),
                fetch: None,
            };
        };

        Transition {
            state: SelectionState {
                destination: Some(destination.to_string()),
                routes_pending: true,
                routes: RouteSet::new(),
                summary: Vec::new(),
                popup: None,
                ..self.clone()
            },
            fetch: Some(Fetch::Routes {
                origin,
                destination: destination.to_string(),
            }),
        }
    }

    fn without_destination(&self) -> SelectionState {
        SelectionState {
            destination: None,
            routes_pending: false,
            routes: RouteSet::new(),
            summary: Vec::new(),
            popup: None,
            ..self.clone()
        }
    }

    /// Replaces any previous popup.
    pub fn click_route(
        &self,
        position: LatLon,
        mode: Mode,
        info: serde_json::Value,
    ) -> SelectionState {
        SelectionState {
            popup: Some(Popup {
                position,
                mode,
                info,
            }),
            ..self.clone()
        }
    }

    pub fn close_popup(&self) -> SelectionState {
        SelectionState {
            popup: None,
            ..self.clone()
        }
    }

    /// Returns `None` if the response was for an origin that's no longer selected.
    pub fn destinations_loaded(
        &self,
        origin: &str,
        response: DestinationsResponse,
    ) -> Option<SelectionState> {
        if self.origin.as_deref() != Some(origin) {
            return None;
        }
        Some(SelectionState {
            origin_markers: response.origin,
            destination_markers: response.destination,
            ..self.clone()
        })
    }

    /// Returns `None` if the response was for a trip that's no longer selected, or one that
    /// already got its routes. Routes and summary are replaced together.
    pub fn routes_loaded(
        &self,
        origin: &str,
        destination: &str,
        response: RouteResponse,
    ) -> Option<SelectionState> {
        if !self.routes_pending
            || self.origin.as_deref() != Some(origin)
            || self.destination.as_deref() != Some(destination)
        {
            return None;
        }
        Some(SelectionState {
            routes_pending: false,
            routes: response.routes,
            summary: response.summary,
            popup: None,
            ..self.clone()
        })
    }

    /// In draw order. Modes without a usable route are left out.
    pub fn route_visuals(&self) -> Vec<RouteVisual> {
        self.routes
            .iter()
            .filter_map(|(mode, entry)| render_route(*mode, &entry.route))
            .collect()
    }

    pub fn map_view(&self, config: &Config) -> MapView {
        let groups = self
            .routes
            .values()
            .filter(|entry| !entry.route.is_empty())
            .map(|entry| entry.route.as_slice());
        match compute_bounds(groups, &config.padding) {
            Some(bounds) => MapView::Fit { bounds },
            None => MapView::FlyTo {
                center: config.default_center,
                zoom: config.default_zoom,
            },
        }
    }
}

/// Owns the current `SelectionState` and keeps the map framing in sync with it. Every user event
/// and every fetch completion goes through here.
pub struct ViewController {
    config: Config,
    state: SelectionState,
    view: MapView,
}

impl ViewController {
    pub fn new(config: Config) -> ViewController {
        let state = SelectionState::default();
        let view = state.map_view(&config);
        ViewController {
            config,
            state,
            view,
        }
    }

    /// Selects the configured default origin.
    pub fn start(&mut self) -> Fetch {
        let origin = self.config.default_origin.clone();
        self.set_origin(&origin)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        self.view = self.state.map_view(&self.config);
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn map_view(&self) -> &MapView {
        &self.view
    }

    pub fn set_origin(&mut self, origin: &str) -> Fetch {
        info!("Origin is now {}", origin);
        let (state, fetch) = self.state.set_origin(origin);
        self.replace_state(state);
        fetch
    }

    pub fn select_destination(&mut self, destination: &str) -> Option<Fetch> {
        let transition = self.state.select_destination(destination);
        self.replace_state(transition.state);
        transition.fetch
    }

    pub fn click_route(&mut self, position: LatLon, mode: Mode, info: serde_json::Value) {
        let state = self.state.click_route(position, mode, info);
        self.replace_state(state);
    }

    pub fn close_popup(&mut self) {
        let state = self.state.close_popup();
        self.replace_state(state);
    }

    /// Resolves a click on the map against the wide strokes of every drawn route, within
    /// `tolerance` degrees. The closest route wins. True if a popup opened.
    pub fn on_map_click(&mut self, pt: LatLon, tolerance: f64) -> bool {
        let mut best: Option<(Mode, f64)> = None;
        for visual in self.state.route_visuals() {
            if let Some(dist) = visual.hit_test(pt, tolerance) {
                // Later routes are drawn on top, so they win ties
                if best.map_or(true, |(_, best_dist)| dist <= best_dist) {
                    best = Some((visual.mode, dist));
                }
            }
        }
        let Some((mode, _)) = best else {
            return false;
        };
        let info = self
            .state
            .routes
            .get(&mode)
            .map(|entry| entry.info.clone())
            .unwrap_or_default();
        self.click_route(pt, mode, info);
        true
    }

    /// True if the response was applied. Responses for an origin that's been replaced since are
    /// dropped.
    pub fn on_destinations_loaded(&mut self, origin: &str, response: DestinationsResponse) -> bool {
        match self.state.destinations_loaded(origin, response) {
            Some(state) => {
                info!(
                    "Got {} destinations from {}",
                    state.destination_markers.len(),
                    origin
                );
                self.replace_state(state);
                true
            }
            None => {
                info!("Dropping stale destinations for {}", origin);
                false
            }
        }
    }

    /// True if the response was applied. Responses for a trip that's no longer selected are
    /// dropped.
    pub fn on_routes_loaded(
        &mut self,
        origin: &str,
        destination: &str,
        response: RouteResponse,
    ) -> bool {
        match self.state.routes_loaded(origin, destination, response) {
            Some(state) => {
                info!(
                    "Got routes for {} modes from {} to {}",
                    state.route_visuals().len(),
                    origin,
                    destination
                );
                self.replace_state(state);
                true
            }
            None => {
                info!("Dropping stale routes from {} to {}", origin, destination);
                false
            }
        }
    }

    /// The state stays as it is; whatever was cleared when the request started stays cleared.
    pub fn on_fetch_failed(&self, fetch: &Fetch, err: &anyhow::Error) {
        error!("Fetching {} failed: {:#}", fetch.path(), err);
    }

    pub fn route_visuals(&self) -> Vec<RouteVisual> {
        self.state.route_visuals()
    }

    pub fn chart(&self) -> EmissionsChart {
        EmissionsChart::from_summary(&self.state.summary)
    }

    pub fn summary_table(&self) -> Vec<SummaryRow> {
        summary_table(&self.state.summary)
    }

    fn replace_state(&mut self, state: SelectionState) {
        let reframe = state.routes != self.state.routes;
        self.state = state;
        if reframe {
            self.view = self.state.map_view(&self.config);
        }
    }
}
