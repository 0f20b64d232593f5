use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::AppState;
use crate::utils::{error_codes, error_to_api_response, success_to_api_response};

use super::model::{PlaceSearchQuery, PlaceSuggestion, TextSearchResponse};

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";

// 地点搜索走后端代理，Maps 服务端金钥不随前端发布
#[axum::debug_handler]
pub async fn search_places(
    State(state): State<AppState>,
    Query(query): Query<PlaceSearchQuery>,
) -> impl IntoResponse {
    if query.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::VALIDATION_ERROR, "請輸入搜尋關鍵字！".to_string()),
        );
    }

    let region = query.country.unwrap_or_else(|| "tw".to_string());

    let response = state
        .http
        .get(TEXT_SEARCH_URL)
        .query(&[
            ("query", query.query.as_str()),
            ("region", region.as_str()),
            ("key", state.config.maps_api_key.as_str()),
        ])
        .send()
        .await;

    let body = match response {
        Ok(resp) => resp.json::<TextSearchResponse>().await,
        Err(e) => {
            tracing::error!("Places request failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                error_to_api_response(error_codes::INTERNAL_ERROR, "地點搜尋失敗".to_string()),
            );
        }
    };

    match body {
        Ok(body) => {
            if body.status != "OK" && body.status != "ZERO_RESULTS" {
                tracing::error!(
                    "Places API returned {}: {}",
                    body.status,
                    body.error_message.unwrap_or_default()
                );
                return (
                    StatusCode::BAD_GATEWAY,
                    error_to_api_response(error_codes::INTERNAL_ERROR, "地點搜尋失敗".to_string()),
                );
            }

            let suggestions = body
                .results
                .into_iter()
                .map(PlaceSuggestion::from)
                .collect::<Vec<_>>();
            (StatusCode::OK, success_to_api_response(suggestions))
        }
        Err(e) => {
            tracing::error!("Failed to decode Places response: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                error_to_api_response(error_codes::INTERNAL_ERROR, "地點搜尋失敗".to_string()),
            )
        }
    }
}
