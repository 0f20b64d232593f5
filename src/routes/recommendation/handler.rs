use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::AppState;
use crate::routes::gathering::model::{Gathering, TimeMode};
use crate::utils::{error_codes, error_to_api_response, success_to_api_response};

use super::model::{RecommendationsResponse, mock_results};

#[derive(Debug, Deserialize)]
pub struct ShortIdQuery {
    pub short_id: String,
}

#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Query(query): Query<ShortIdQuery>,
) -> impl IntoResponse {
    // 先确认聚会存在并拿到时间模式
    let time_mode = match Gathering::time_mode_of(&state.pool, &query.short_id).await {
        Ok(Some(time_mode)) => time_mode,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                error_to_api_response(error_codes::NOT_FOUND, "找不到此聚會".to_string()),
            );
        }
        Err(e) => {
            tracing::error!("Failed to resolve gathering {}: {}", query.short_id, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
            );
        }
    };

    // 日期投票模式顺带附上共同日期
    let common_dates = if time_mode == TimeMode::DateSelection {
        match Gathering::common_dates(&state.pool, &query.short_id).await {
            Ok(dates) => dates,
            Err(e) => {
                tracing::error!("Failed to compute common dates {}: {}", query.short_id, e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
                );
            }
        }
    } else {
        None
    };

    (
        StatusCode::OK,
        success_to_api_response(RecommendationsResponse {
            results: mock_results(),
            common_dates,
        }),
    )
}
