use std::sync::Once;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use trip_compare_model::{DestinationsResponse, LatLon, Mode, RouteResponse};

pub use crate::bounds::{compute_bounds, Bounds, Padding};
pub use crate::chart::{format_time, summary_table, EmissionsChart, SummaryRow};
pub use crate::controller::{
    Fetch, MapView, Phase, Popup, SelectionState, Transition, ViewController,
};
pub use crate::error_bars::{
    draw_error_bars, BarGeometry, Canvas, ChartSeries, DrawCall, ErrorBar, LinearAxis, ValueScale,
};
pub use crate::render::render_geojson;
pub use crate::route::{mode_color, mode_icon, render_route, Icon, RouteVisual, Stroke};

mod bounds;
mod chart;
mod controller;
mod error_bars;
mod render;
mod route;

static START: Once = Once::new();

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Selected when the page first loads
    pub default_origin: String,
    /// The map flies here when there are no routes to frame
    pub default_center: LatLon,
    pub default_zoom: f64,
    pub padding: Padding,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_origin: "Amsterdam".to_string(),
            default_center: [50.0, 8.0],
            default_zoom: 5.0,
            padding: Padding::default(),
        }
    }
}

pub fn parse_destinations(raw_json: &str) -> Result<DestinationsResponse> {
    serde_json::from_str(raw_json).context("parsing /destinations response")
}

pub fn parse_routes(raw_json: &str) -> Result<RouteResponse> {
    serde_json::from_str(raw_json).context("parsing /route response")
}

#[wasm_bindgen]
pub struct JsTripCompare {
    controller: ViewController,
}

#[wasm_bindgen]
impl JsTripCompare {
    /// `config` may be undefined to use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsTripCompare, JsValue> {
        START.call_once(|| {
            // Panics shouldn't happen, but if they do, console.log them.
            console_error_panic_hook::set_once();
            if let Err(err) = console_log::init_with_level(log::Level::Info) {
                web_sys::console::log_1(&format!("Couldn't set up logging: {}", err).into());
            }
        });

        let config = if config.is_undefined() || config.is_null() {
            Config::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self {
            controller: ViewController::new(config),
        })
    }

    /// Updates configuration and reframes the map. The caller should redraw.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, input: JsValue) {
        match serde_wasm_bindgen::from_value(input) {
            Ok(config) => {
                self.controller.set_config(config);
            }
            Err(err) => {
                log::warn!("Bad input to setConfig: {}", err);
            }
        }
    }

    /// Selects the default origin. Returns the request to make, as JSON.
    pub fn start(&mut self) -> Result<String, JsValue> {
        let fetch = self.controller.start();
        to_json(&fetch)
    }

    /// Returns the request to make, as JSON.
    #[wasm_bindgen(js_name = setOrigin)]
    pub fn set_origin(&mut self, origin: &str) -> Result<String, JsValue> {
        let fetch = self.controller.set_origin(origin);
        to_json(&fetch)
    }

    /// Returns the request to make as JSON, or nothing if this deselected the destination.
    #[wasm_bindgen(js_name = selectDestination)]
    pub fn select_destination(&mut self, destination: &str) -> Result<Option<String>, JsValue> {
        self.controller
            .select_destination(destination)
            .map(|fetch| to_json(&fetch))
            .transpose()
    }

    /// True if the response was used, and the caller should redraw.
    #[wasm_bindgen(js_name = onDestinationsLoaded)]
    pub fn on_destinations_loaded(
        &mut self,
        origin: &str,
        raw_json: &str,
    ) -> Result<bool, JsValue> {
        let response = parse_destinations(raw_json).map_err(err_to_js)?;
        Ok(self.controller.on_destinations_loaded(origin, response))
    }

    /// True if the response was used, and the caller should redraw.
    #[wasm_bindgen(js_name = onRoutesLoaded)]
    pub fn on_routes_loaded(
        &mut self,
        origin: &str,
        destination: &str,
        raw_json: &str,
    ) -> Result<bool, JsValue> {
        let response = parse_routes(raw_json).map_err(err_to_js)?;
        Ok(self
            .controller
            .on_routes_loaded(origin, destination, response))
    }

    /// `fetch` is the JSON this API returned when asking for the request.
    #[wasm_bindgen(js_name = onFetchFailed)]
    pub fn on_fetch_failed(&self, fetch: &str, message: &str) -> Result<(), JsValue> {
        let fetch: Fetch = serde_json::from_str(fetch).map_err(err_to_js)?;
        self.controller
            .on_fetch_failed(&fetch, &anyhow::anyhow!(message.to_string()));
        Ok(())
    }

    /// True if a route was clicked and the caller should redraw.
    #[wasm_bindgen(js_name = onMapClick)]
    pub fn on_map_click(&mut self, lon: f64, lat: f64, tolerance_degrees: f64) -> bool {
        self.controller.on_map_click([lat, lon], tolerance_degrees)
    }

    /// For hosts that do their own hit testing on the wide route strokes.
    #[wasm_bindgen(js_name = clickRoute)]
    pub fn click_route(&mut self, lon: f64, lat: f64, mode: &str) -> Result<(), JsValue> {
        let mode = Mode::parse(mode).ok_or_else(|| JsValue::from_str("unknown mode"))?;
        let info = self
            .controller
            .state()
            .routes()
            .get(&mode)
            .map(|entry| entry.info.clone())
            .unwrap_or_default();
        self.controller.click_route([lat, lon], mode, info);
        Ok(())
    }

    #[wasm_bindgen(js_name = closePopup)]
    pub fn close_popup(&mut self) {
        self.controller.close_popup();
    }

    #[wasm_bindgen(js_name = renderGeojson)]
    pub fn render_geojson(&self) -> Result<String, JsValue> {
        to_json(&render_geojson(self.controller.state()))
    }

    /// Either `{"type": "fit", "bounds": ...}` or `{"type": "fly_to", "center": ..., "zoom": ...}`
    #[wasm_bindgen(js_name = mapView)]
    pub fn map_view(&self) -> Result<String, JsValue> {
        to_json(self.controller.map_view())
    }

    /// The bar chart's data and the summary table
    #[wasm_bindgen(js_name = chartData)]
    pub fn chart_data(&self) -> Result<String, JsValue> {
        let mut result = serde_json::Map::new();
        result.insert(
            "chart".to_string(),
            serde_json::to_value(self.controller.chart()).map_err(err_to_js)?,
        );
        result.insert(
            "table".to_string(),
            serde_json::to_value(self.controller.summary_table()).map_err(err_to_js)?,
        );
        to_json(&result)
    }

    /// Call from the chart's after-draw hook. `bars` is a list of `{y}` for every bar of the
    /// primary dataset, and `axis` describes the value axis as `{min, max, left, right}`. Returns
    /// how many error bars were drawn.
    #[wasm_bindgen(js_name = drawErrorBars)]
    pub fn draw_error_bars(
        &self,
        mut ctx: web_sys::CanvasRenderingContext2d,
        bars: JsValue,
        axis: JsValue,
    ) -> Result<usize, JsValue> {
        let bars: Vec<BarGeometry> = serde_wasm_bindgen::from_value(bars)?;
        let axis: LinearAxis = serde_wasm_bindgen::from_value(axis)?;
        let series = vec![self.controller.chart().series()];
        Ok(draw_error_bars(&bars, &series, &axis, &mut ctx))
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string_pretty(value).map_err(err_to_js)
}

fn err_to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
