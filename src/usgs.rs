use anyhow::Result;
use chrono::DateTime;
use serde::Deserialize;

pub const USGS_REQUEST_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Builds the feed query URL from the current settings. The setting
/// values are passed through as-is; the endpoint rejects what it
/// cannot parse.
pub fn build_url(min_magnitude: &str, order_by: &str, entry_count: &str) -> String {
    format!(
        "{USGS_REQUEST_URL}?format=geojson&limit={entry_count}&minmag={min_magnitude}&orderby={order_by}"
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct Earthquake {
    pub magnitude: Option<f64>,
    pub place: String,
    /// Epoch milliseconds, as reported by the feed.
    pub time: Option<i64>,
    /// Event page on the USGS site.
    pub url: Option<String>,
}

impl Earthquake {
    pub fn magnitude_label(&self) -> String {
        match self.magnitude {
            Some(mag) => format!("{:.1}", mag),
            None => "?".to_string(),
        }
    }

    pub fn time_label(&self) -> String {
        self.time
            .and_then(DateTime::from_timestamp_millis)
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// One load request handed to the fetch worker. Carries the full URL
/// so the worker never consults the settings itself, and a sequence
/// number so the screen can tell which request an answer belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub seq: u64,
    pub url: String,
}

/// Outcome of a fetch, sent back to the screen tagged with the
/// sequence number of the request it answers. Fetches finish in any
/// order; the screen drops answers to superseded requests. All
/// failure causes collapse into `Failed`; the user retries manually.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Loaded { seq: u64, quakes: Vec<Earthquake> },
    Failed { seq: u64 },
}

impl FeedEvent {
    pub fn seq(&self) -> u64 {
        match self {
            FeedEvent::Loaded { seq, .. } | FeedEvent::Failed { seq } => *seq,
        }
    }
}

/// Current state of the asynchronous load, as observed by the screen.
/// An absent status means the first load has not finished yet.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Failed,
    Fine {
        reloading: bool,
        quakes: Vec<Earthquake>,
    },
}

pub async fn fetch_quakes(url: &str) -> Result<Vec<Earthquake>> {
    let client = reqwest::Client::new();
    let response = client.get(url).send().await?.error_for_status()?;
    let feed: FeedResponse = response.json().await?;
    Ok(feed.into_quakes())
}

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub features: Vec<Feature>,
}

impl FeedResponse {
    pub fn into_quakes(self) -> Vec<Earthquake> {
        self.features
            .into_iter()
            .map(|feature| {
                let properties = feature.properties;
                Earthquake {
                    magnitude: properties.mag,
                    place: properties
                        .place
                        .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
                    time: properties.time,
                    url: properties.url,
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub properties: Properties,
}

#[derive(Debug, Deserialize)]
pub struct Properties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_matches_the_usgs_query_format() {
        let url = build_url("2.5", "time", "50");
        assert_eq!(
            url,
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson&limit=50&minmag=2.5&orderby=time"
        );
    }

    #[test]
    fn build_url_passes_settings_through_verbatim() {
        let url = build_url("not-a-number", "magnitude-asc", "10");
        assert!(url.starts_with(USGS_REQUEST_URL));
        assert!(url.contains("format=geojson"));
        assert!(url.contains("limit=10"));
        assert!(url.contains("minmag=not-a-number"));
        assert!(url.contains("orderby=magnitude-asc"));
    }

    #[test]
    fn feed_response_maps_features_in_order() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {
                        "mag": 4.7,
                        "place": "74 km WSW of Kaktovik, Alaska",
                        "time": 1469077773620,
                        "url": "https://earthquake.usgs.gov/earthquakes/eventpage/us10006544"
                    }
                },
                {
                    "type": "Feature",
                    "properties": {
                        "mag": null,
                        "place": null,
                        "time": null,
                        "url": null
                    }
                }
            ]
        }"#;

        let feed: FeedResponse = serde_json::from_str(json).unwrap();
        let quakes = feed.into_quakes();

        assert_eq!(quakes.len(), 2);
        assert_eq!(quakes[0].magnitude, Some(4.7));
        assert_eq!(quakes[0].place, "74 km WSW of Kaktovik, Alaska");
        assert_eq!(quakes[0].time, Some(1469077773620));
        assert_eq!(
            quakes[0].url.as_deref(),
            Some("https://earthquake.usgs.gov/earthquakes/eventpage/us10006544")
        );
        assert_eq!(quakes[1].magnitude, None);
        assert_eq!(quakes[1].place, UNKNOWN_LOCATION);
        assert_eq!(quakes[1].url, None);
    }

    #[test]
    fn labels_handle_missing_values() {
        let quake = Earthquake {
            magnitude: None,
            place: UNKNOWN_LOCATION.to_string(),
            time: None,
            url: None,
        };
        assert_eq!(quake.magnitude_label(), "?");
        assert_eq!(quake.time_label(), "-");
    }

    #[test]
    fn labels_format_present_values() {
        let quake = Earthquake {
            magnitude: Some(6.3),
            place: "Near the coast of Chile".to_string(),
            time: Some(1469077773620),
            url: None,
        };
        assert_eq!(quake.magnitude_label(), "6.3");
        assert_eq!(quake.time_label(), "2016-07-21 05:09 UTC");
    }
}
