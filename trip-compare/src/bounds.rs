use geo::{BoundingRect, MultiPoint, Point, Rect};
use serde::{Deserialize, Serialize};

use trip_compare_model::{to_coord, LatLon};

/// A rectangle in degrees, used to frame the map.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    fn from_rect(rect: Rect) -> Bounds {
        Bounds {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        }
    }

    /// True if the point is inside, not on the edge.
    pub fn strictly_contains(&self, pt: LatLon) -> bool {
        let [lat, lon] = pt;
        self.south < lat && lat < self.north && self.west < lon && lon < self.east
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct Padding {
    /// Each side grows by this fraction of the span along its axis
    pub ratio: f64,
    /// Extra absolute room on the west side, where the control panel covers the map
    pub west: f64,
    /// Used instead of `ratio` along an axis with zero or negligible span, like for a single point
    pub min_margin: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Padding {
            ratio: 0.2,
            west: 0.3,
            min_margin: 0.01,
        }
    }
}

/// Frames every point in every group. Returns `None` when there are no points at all; callers
/// should fall back to a fixed world view then. Non-finite coordinates are ignored.
pub fn compute_bounds<'a, I>(groups: I, padding: &Padding) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a [LatLon]>,
{
    let points: MultiPoint = groups
        .into_iter()
        .flatten()
        .filter(|pt| pt[0].is_finite() && pt[1].is_finite())
        .map(|pt| Point::from(to_coord(*pt)))
        .collect();
    let mut bounds = Bounds::from_rect(points.bounding_rect()?);

    (bounds.south, bounds.north) = pad_axis(bounds.south, bounds.north, padding);
    (bounds.west, bounds.east) = pad_axis(bounds.west, bounds.east, padding);

    bounds.west -= padding.west;
    Some(bounds)
}

// A pad too small to move either edge (zero span, or a span of a few ULPs) would leave points on
// the border, so those axes get the fixed margin instead.
fn pad_axis(lo: f64, hi: f64, padding: &Padding) -> (f64, f64) {
    let pad = (hi - lo) * padding.ratio;
    if lo - pad < lo && hi + pad > hi {
        (lo - pad, hi + pad)
    } else {
        (lo - padding.min_margin, hi + padding.min_margin)
    }
}
