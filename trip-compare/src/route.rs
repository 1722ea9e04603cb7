use geo::{Closest, ClosestPoint, LineString, Point};

use trip_compare_model::{to_coord, LatLon, Mode};

/// The invisible stroke is this wide (in pixels) to make thin routes easy to click.
pub const HIT_STROKE_WEIGHT: f64 = 20.0;
pub const VISIBLE_STROKE_WEIGHT: f64 = 2.0;
pub const STOP_RADIUS: f64 = 3.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Icon {
    /// The origin city
    RedPin,
    BluePin,
    /// A destination while some other destination is selected
    BluePinSmall,
    Airplane,
    Train,
    Bus,
    Car,
}

impl Icon {
    pub fn as_str(self) -> &'static str {
        match self {
            Icon::RedPin => "marker-red",
            Icon::BluePin => "marker-blue",
            Icon::BluePinSmall => "marker-blue-light",
            Icon::Airplane => "airplane",
            Icon::Train => "train",
            Icon::Bus => "bus",
            Icon::Car => "car",
        }
    }

    /// Width and height in pixels
    pub fn size(self) -> f64 {
        match self {
            Icon::RedPin | Icon::BluePin => 36.0,
            Icon::BluePinSmall => 25.0,
            Icon::Airplane | Icon::Train | Icon::Bus | Icon::Car => 50.0,
        }
    }
}

pub fn mode_color(mode: Mode) -> &'static str {
    match mode {
        Mode::Flight => "red",
        Mode::Train => "green",
        Mode::Bus => "blue",
        Mode::Car => "purple",
    }
}

pub fn mode_icon(mode: Mode) -> Icon {
    match mode {
        Mode::Flight => Icon::Airplane,
        Mode::Train => Icon::Train,
        Mode::Bus => Icon::Bus,
        Mode::Car => Icon::Car,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
}

/// Everything needed to draw one mode's route.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteVisual {
    pub mode: Mode,
    pub points: Vec<LatLon>,
    /// Where the mode's icon goes
    pub midpoint: LatLon,
    pub icon: Icon,
    pub stops: Vec<LatLon>,
    /// Transparent and wide, only there to catch clicks. Drawn under `line`, same geometry.
    pub hit_stroke: Stroke,
    pub line: Stroke,
}

/// Returns `None` if there's nothing to draw. A route needs at least both endpoints.
pub fn render_route(mode: Mode, points: &[LatLon]) -> Option<RouteVisual> {
    if points.len() < 2 {
        return None;
    }

    let color = mode_color(mode);
    let stops = if mode.stops_at_every_point() {
        points.to_vec()
    } else {
        vec![points[0], points[points.len() - 1]]
    };

    Some(RouteVisual {
        mode,
        points: points.to_vec(),
        midpoint: midpoint(points),
        icon: mode_icon(mode),
        stops,
        hit_stroke: Stroke {
            color,
            weight: HIT_STROKE_WEIGHT,
            opacity: 0.0,
        },
        line: Stroke {
            color,
            weight: VISIBLE_STROKE_WEIGHT,
            opacity: 1.0,
        },
    })
}

// A straight line gets its real middle. Longer routes use the middle vertex, so the icon stays
// on the drawn line and doesn't jump around between redraws.
fn midpoint(points: &[LatLon]) -> LatLon {
    if let [a, b] = points {
        return [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0];
    }
    points[points.len() / 2]
}

impl RouteVisual {
    /// If `pt` is within `tolerance` degrees of the route, returns the distance.
    pub fn hit_test(&self, pt: LatLon, tolerance: f64) -> Option<f64> {
        let line: LineString = self.points.iter().map(|x| to_coord(*x)).collect();
        let click = Point::from(to_coord(pt));
        let closest = match line.closest_point(&click) {
            Closest::Intersection(x) | Closest::SinglePoint(x) => x,
            Closest::Indeterminate => {
                return None;
            }
        };
        let dist = (closest.x() - click.x()).hypot(closest.y() - click.y());
        if dist <= tolerance {
            Some(dist)
        } else {
            None
        }
    }
}
