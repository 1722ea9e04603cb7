use geo::LineString;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};

use trip_compare_model::{to_coord, City, LatLon};

use crate::controller::SelectionState;
use crate::route::{Icon, RouteVisual, Stroke, STOP_RADIUS};

pub const CITY_CIRCLE_RADIUS_METERS: f64 = 5000.0;

/// Turns the whole map scene into a FeatureCollection for the host to draw. Features come in draw
/// order. The style for each one is in its properties; `type` says what it is:
///
/// - "city_circle": the area around the origin or the selected destination
/// - "city": a pin with a tooltip
/// - "hit_line": a transparent, wide stroke only used for clicking on a route
/// - "line": the visible route
/// - "stop": a small circle on a route
/// - "route_icon": the mode's icon, in the middle of the route
/// - "popup": info about a clicked route
pub fn render_geojson(state: &SelectionState) -> GeoJson {
    let mut features = Vec::new();

    for city in state.origin_markers() {
        features.push(city_circle(city));
        features.push(city_marker(city, Icon::RedPin));
    }

    for city in state.destination_markers() {
        let selected = state.destination() == Some(city.name.as_str());
        let icon = match state.destination() {
            Some(_) if !selected => Icon::BluePinSmall,
            _ => Icon::BluePin,
        };
        features.push(city_marker(city, icon));
        if selected {
            features.push(city_circle(city));
        }
    }

    for visual in state.route_visuals() {
        features.push(stroke(&visual, &visual.hit_stroke, "hit_line"));
        features.push(stroke(&visual, &visual.line, "line"));

        for pt in &visual.stops {
            let mut f = Feature::from(point(*pt));
            f.set_property("type", "stop");
            f.set_property("mode", visual.mode.as_str());
            f.set_property("color", visual.line.color);
            f.set_property("radius", STOP_RADIUS);
            features.push(f);
        }

        let mut f = Feature::from(point(visual.midpoint));
        f.set_property("type", "route_icon");
        f.set_property("mode", visual.mode.as_str());
        f.set_property("icon", visual.icon.as_str());
        f.set_property("icon_size", visual.icon.size());
        features.push(f);
    }

    if let Some(popup) = state.popup() {
        let mut f = Feature::from(point(popup.position));
        f.set_property("type", "popup");
        f.set_property("mode", popup.mode.as_str());
        f.set_property("info", popup.info.clone());
        features.push(f);
    }

    GeoJson::from(features.into_iter().collect::<FeatureCollection>())
}

fn point(pt: LatLon) -> Geometry {
    Geometry::new(Value::Point(vec![pt[1], pt[0]]))
}

fn stroke(visual: &RouteVisual, stroke: &Stroke, label: &str) -> Feature {
    let line: LineString = visual.points.iter().map(|pt| to_coord(*pt)).collect();
    let mut f = Feature::from(Geometry::new(Value::from(&line)));
    f.set_property("type", label);
    f.set_property("mode", visual.mode.as_str());
    f.set_property("color", stroke.color);
    f.set_property("weight", stroke.weight);
    f.set_property("opacity", stroke.opacity);
    f
}

fn city_marker(city: &City, icon: Icon) -> Feature {
    let mut f = Feature::from(point(city.pt()));
    f.set_property("type", "city");
    f.set_property("icon", icon.as_str());
    f.set_property("icon_size", icon.size());
    f.set_property("tooltip", city.name.clone());
    f
}

fn city_circle(city: &City) -> Feature {
    let mut f = Feature::from(point(city.pt()));
    f.set_property("type", "city_circle");
    f.set_property("radius_meters", CITY_CIRCLE_RADIUS_METERS);
    f
}
