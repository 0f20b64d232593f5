use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PlaceSearchQuery {
    pub query: String,
    pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlaceSuggestion {
    pub name: String,
    pub formatted_address: String,
    pub place_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

// Google Places Text Search 响应里用得到的最小字段集
#[derive(Debug, Deserialize)]
pub struct TextSearchResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<TextSearchResult>,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextSearchResult {
    pub name: String,
    pub formatted_address: String,
    pub place_id: String,
    pub geometry: Geometry,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<TextSearchResult> for PlaceSuggestion {
    fn from(r: TextSearchResult) -> Self {
        PlaceSuggestion {
            name: r.name,
            formatted_address: r.formatted_address,
            place_id: r.place_id,
            latitude: r.geometry.location.lat,
            longitude: r.geometry.location.lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_text_search_payload() {
        let raw = r#"{
            "status": "OK",
            "results": [{
                "name": "台北車站",
                "formatted_address": "100台灣台北市中正區北平西路3號",
                "place_id": "ChIJi73bYpSpQjQRgqQGXK260bw",
                "geometry": { "location": { "lat": 25.0478, "lng": 121.5170 } }
            }]
        }"#;

        let parsed: TextSearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.status, "OK");

        let suggestion = PlaceSuggestion::from(parsed.results.into_iter().next().unwrap());
        assert_eq!(suggestion.place_id, "ChIJi73bYpSpQjQRgqQGXK260bw");
        assert!((suggestion.latitude - 25.0478).abs() < 1e-9);
    }

    #[test]
    fn zero_results_deserializes_to_empty_list() {
        let parsed: TextSearchResponse =
            serde_json::from_str(r#"{ "status": "ZERO_RESULTS" }"#).unwrap();
        assert!(parsed.results.is_empty());
        assert!(parsed.error_message.is_none());
    }
}
