use std::collections::BTreeMap;

use geo::Coord;
use serde::{Deserialize, Serialize};

/// A position the way the backend sends it: `[latitude, longitude]`.
pub type LatLon = [f64; 2];

/// `geo` and GeoJSON put longitude first.
pub fn to_coord(pt: LatLon) -> Coord {
    Coord { x: pt[1], y: pt[0] }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Flight,
    Train,
    Bus,
    Car,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Flight, Mode::Train, Mode::Bus, Mode::Car];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Flight => "flight",
            Mode::Train => "train",
            Mode::Bus => "bus",
            Mode::Car => "car",
        }
    }

    pub fn parse(value: &str) -> Option<Mode> {
        Mode::ALL.into_iter().find(|mode| mode.as_str() == value)
    }

    /// Transit modes stop at every vertex of their route. Flights and cars only at the ends.
    pub fn stops_at_every_point(self) -> bool {
        matches!(self, Mode::Train | Mode::Bus)
    }
}

/// Cities arrive as `[name, lat, lon]` triples.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(from = "(String, f64, f64)", into = "(String, f64, f64)")]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn pt(&self) -> LatLon {
        [self.lat, self.lon]
    }
}

impl From<(String, f64, f64)> for City {
    fn from((name, lat, lon): (String, f64, f64)) -> Self {
        City { name, lat, lon }
    }
}

impl From<City> for (String, f64, f64) {
    fn from(city: City) -> Self {
        (city.name, city.lat, city.lon)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RouteEntry {
    /// Empty when the mode doesn't apply to this trip
    pub route: Vec<LatLon>,
    /// Opaque, shown in a popup when the route is clicked
    #[serde(default)]
    pub info: serde_json::Value,
}

pub type RouteSet = BTreeMap<Mode, RouteEntry>;

/// CO2 per passenger in kg. `low <= high` for well-formed data, but nothing here enforces it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Co2Interval {
    pub low: f64,
    pub high: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryEntry {
    /// A display label, like "train (electric)" or "car (2p,diesel)". Not restricted to `Mode`.
    pub mode: String,
    #[serde(rename = "CO2", default, with = "co2_interval")]
    pub co2: Option<Co2Interval>,
    /// Minutes. Absent when the mode isn't available. Normally whole, but any number is accepted.
    #[serde(rename = "Time", default)]
    pub time: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DestinationsResponse {
    pub origin: Vec<City>,
    pub destination: Vec<City>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RouteResponse {
    pub routes: RouteSet,
    pub summary: Vec<SummaryEntry>,
}

// The backend sends `[]` for modes without data, and `[low, high]` otherwise.
mod co2_interval {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Co2Interval;

    pub fn serialize<S: Serializer>(
        value: &Option<Co2Interval>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(interval) => [interval.low, interval.high].serialize(serializer),
            None => Vec::<f64>::new().serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Co2Interval>, D::Error> {
        let raw: Option<Vec<f64>> = Option::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some([low, high]) => Some(Co2Interval {
                low: *low,
                high: *high,
            }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destinations() {
        let input = r#"{
            "origin": [["Amsterdam", 52.37, 4.89]],
            "destination": [["Munich", 48.14, 11.58], ["Paris", 48.86, 2.35]]
        }"#;
        let response: DestinationsResponse = serde_json::from_str(input).unwrap();
        assert_eq!(response.origin.len(), 1);
        assert_eq!(response.origin[0].name, "Amsterdam");
        assert_eq!(response.destination[1].pt(), [48.86, 2.35]);
    }

    #[test]
    fn test_parse_route_response() {
        let input = r#"{
            "routes": {
                "flight": {"route": [[52.3, 4.7], [48.3, 11.7]], "info": "CO2: [80, 120] | Time: 75 min"},
                "train": {"route": [], "info": ""},
                "bus": {"route": [[52.3, 4.9], [50.0, 8.0], [48.1, 11.5]], "info": ""},
                "car": {"route": [], "info": ""}
            },
            "summary": [
                {"mode": "flight", "CO2": [80, 120], "Time": 75},
                {"mode": "train (electric)", "CO2": [], "Time": null},
                {"mode": "bus", "CO2": [20.5, 30], "Time": 600}
            ]
        }"#;
        let response: RouteResponse = serde_json::from_str(input).unwrap();
        assert_eq!(response.routes.len(), 4);
        assert_eq!(response.routes[&Mode::Flight].route.len(), 2);
        assert!(response.routes[&Mode::Train].route.is_empty());
        assert_eq!(response.routes[&Mode::Bus].route.len(), 3);

        assert_eq!(
            response.summary[0].co2,
            Some(Co2Interval {
                low: 80.0,
                high: 120.0
            })
        );
        assert_eq!(response.summary[0].time, Some(75.0));
        assert_eq!(response.summary[1].co2, None);
        assert_eq!(response.summary[1].time, None);
        assert_eq!(response.summary[2].mode, "bus");
    }

    #[test]
    fn test_fractional_time() {
        let input = r#"{"mode": "car (2p,diesel)", "CO2": [40, 60], "Time": 412.6}"#;
        let entry: SummaryEntry = serde_json::from_str(input).unwrap();
        assert_eq!(entry.time, Some(412.6));
    }

    #[test]
    fn test_modes_in_draw_order() {
        let mut routes = RouteSet::new();
        routes.insert(Mode::Car, RouteEntry::default());
        routes.insert(Mode::Flight, RouteEntry::default());
        let order: Vec<Mode> = routes.keys().copied().collect();
        assert_eq!(order, vec![Mode::Flight, Mode::Car]);
        assert_eq!(Mode::parse("bus"), Some(Mode::Bus));
        assert_eq!(Mode::parse("boat"), None);
    }

    #[test]
    fn test_coord_order() {
        let coord = to_coord([52.0, 4.0]);
        assert_eq!(coord.x, 4.0);
        assert_eq!(coord.y, 52.0);
    }
}
