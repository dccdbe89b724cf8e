//! Coordinate extraction from map share links
//!
//! Supports the link shapes operators paste into a lead:
//!
//! - query parameters `q`, `query`, `ll`, `destination`, `center` (`lat,lng`)
//! - the `mlat` / `mlon` pair
//! - Google path segments `@lat,lng`, `/place/lat,lng`, `/search/lat,lng`
//! - Yandex `ll` / `pt` parameters, which are `lng,lat`
//! - OpenStreetMap `#map=zoom/lat/lng` fragments
//!
//! Anything else yields `None`; parsing never fails loudly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static AT_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(-?\d+(?:\.\d+)?),\s*(-?\d+(?:\.\d+)?)").expect("AT_SEGMENT should compile")
});

static PLACE_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/(?:place|search)/\+?(-?\d+(?:\.\d+)?),\s*\+?(-?\d+(?:\.\d+)?)")
        .expect("PLACE_SEGMENT should compile")
});

static OSM_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"map=\d+/(-?\d+(?:\.\d+)?)/(-?\d+(?:\.\d+)?)").expect("OSM_FRAGMENT should compile")
});

const LAT_LNG_PARAMS: [&str; 5] = ["q", "query", "ll", "destination", "center"];
const YANDEX_PARAMS: [&str; 2] = ["ll", "pt"];

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Range-checked constructor.
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

#[derive(Clone, Copy)]
enum AxisOrder {
    LatLng,
    LngLat,
}

/// Extract coordinates from a map link, or `None` when no known shape
/// matches.
pub fn extract_coordinates(link: &str) -> Option<Coordinates> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    let url = Url::parse(link).or_else(|_| Url::parse(&format!("https://{link}"))).ok()?;
    let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let param = |key: &str| params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let is_yandex = url.host_str().is_some_and(|host| host.contains("yandex"));
    if is_yandex {
        let found = YANDEX_PARAMS
            .into_iter()
            .find_map(|key| param(key).and_then(|v| parse_pair(v, AxisOrder::LngLat)));
        if found.is_some() {
            return found;
        }
    }

    let found = LAT_LNG_PARAMS
        .into_iter()
        .find_map(|key| param(key).and_then(|v| parse_pair(v, AxisOrder::LatLng)));
    if found.is_some() {
        return found;
    }

    if let (Some(lat), Some(lng)) = (param("mlat"), param("mlon")) {
        if let Some(coords) = parse_parts(lat, lng) {
            return Some(coords);
        }
    }

    let path = url.path().replace("%2C", ",").replace("%2c", ",");
    for pattern in [&*AT_SEGMENT, &*PLACE_SEGMENT] {
        if let Some(coords) = pattern.captures(&path).and_then(|c| parse_parts(&c[1], &c[2])) {
            return Some(coords);
        }
    }

    url.fragment()
        .and_then(|fragment| OSM_FRAGMENT.captures(fragment))
        .and_then(|c| parse_parts(&c[1], &c[2]))
}

fn parse_pair(value: &str, order: AxisOrder) -> Option<Coordinates> {
    let mut parts = value.split(',');
    let first = parts.next()?;
    let second = parts.next()?;
    match order {
        AxisOrder::LatLng => parse_parts(first, second),
        AxisOrder::LngLat => parse_parts(second, first),
    }
}

fn parse_parts(lat: &str, lng: &str) -> Option<Coordinates> {
    let lat = lat.trim().trim_start_matches('+').parse::<f64>().ok()?;
    let lng = lng.trim().trim_start_matches('+').parse::<f64>().ok()?;
    Coordinates::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(link: &str) -> Option<(f64, f64)> {
        extract_coordinates(link).map(|c| (c.lat, c.lng))
    }

    #[test]
    fn query_parameter_shapes() {
        assert_eq!(coords("https://maps.google.com/?q=41.2,69.2"), Some((41.2, 69.2)));
        assert_eq!(
            coords("https://www.google.com/maps/search/?api=1&query=41.31,69.24"),
            Some((41.31, 69.24))
        );
        assert_eq!(
            coords("https://www.google.com/maps/dir/?api=1&destination=41.3%2C69.2"),
            Some((41.3, 69.2))
        );
        assert_eq!(
            coords("https://www.openstreetmap.org/?mlat=41.30&mlon=69.28#map=16/41.30/69.28"),
            Some((41.30, 69.28))
        );
    }

    #[test]
    fn google_path_segments() {
        assert_eq!(
            coords("https://www.google.com/maps/@41.311081,69.240562,15z"),
            Some((41.311081, 69.240562))
        );
        assert_eq!(
            coords("https://www.google.com/maps/place/41.3,69.2/data=abc"),
            Some((41.3, 69.2))
        );
        assert_eq!(coords("https://www.google.com/maps/search/41.35,+69.21"), Some((41.35, 69.21)));
    }

    #[test]
    fn yandex_uses_lng_lat_order() {
        assert_eq!(
            coords("https://yandex.uz/maps/?ll=69.240562%2C41.311081&z=12"),
            Some((41.311081, 69.240562))
        );
        assert_eq!(
            coords("https://yandex.com/maps/?pt=69.2,41.3,pm2rdm"),
            Some((41.3, 69.2))
        );
    }

    #[test]
    fn osm_fragment_only() {
        assert_eq!(coords("https://www.openstreetmap.org/#map=17/41.32/69.25"), Some((41.32, 69.25)));
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert_eq!(coords("https://maps.google.com/?q=141.2,69.2"), None);
        assert_eq!(coords("https://maps.google.com/?q=41.2,269.2"), None);
    }

    #[test]
    fn unrecognised_links_are_not_errors() {
        assert_eq!(coords("https://maps.google.com/?q=Chilonzor+tumani"), None);
        assert_eq!(coords("https://example.com/some/page"), None);
        assert_eq!(coords("not a link at all"), None);
        assert_eq!(coords(""), None);
    }

    #[test]
    fn scheme_is_optional() {
        assert_eq!(coords("maps.google.com/?q=41.2,69.2"), Some((41.2, 69.2)));
    }
}
