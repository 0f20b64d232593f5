use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::AppState;
use crate::flow::validate_required;
use crate::routes::realtime::ParticipantInserted;
use crate::utils::{error_codes, error_to_api_response, success_to_api_response};

use super::model::{
    CommonDatesResponse, CreateGatheringRequest, CreateGatheringResponse, Gathering,
    JoinGatheringRequest, TimeMode, share_message,
};

#[derive(Debug, Deserialize)]
pub struct ShortIdQuery {
    pub short_id: String,
}

#[axum::debug_handler]
pub async fn create_gathering(
    State(state): State<AppState>,
    Json(req): Json<CreateGatheringRequest>,
) -> impl IntoResponse {
    // 与前端相同的栏位检查，挡在任何数据库写入之前
    if let Err(e) = validate_required("你的名字", &req.creator_name)
        .and_then(|_| validate_required("出發地點", &req.location))
    {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::VALIDATION_ERROR, e.to_string()),
        );
    }
    if req.time_mode == TimeMode::DateSelection && req.available_dates.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "請至少選擇一個日期！".to_string(),
            ),
        );
    }

    match Gathering::create(&state.pool, &req).await {
        Ok(short_id) => {
            // 发起人本身也是一条 participants 插入
            let _ = state.events.send(ParticipantInserted {
                short_id: short_id.clone(),
                name: req.creator_name.clone(),
                is_creator: true,
            });

            let share_url = state.config.join_url(&short_id);
            let message = share_message(req.intent, req.time_mode, &share_url);
            (
                StatusCode::CREATED,
                success_to_api_response(CreateGatheringResponse {
                    short_id,
                    share_url,
                    share_message: message,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to create gathering: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn find_by_short_id(
    State(state): State<AppState>,
    Query(query): Query<ShortIdQuery>,
) -> impl IntoResponse {
    match Gathering::find_by_short_id(&state.pool, &query.short_id).await {
        Ok(Some(info)) => (StatusCode::OK, success_to_api_response(info)),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "找不到此聚會".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to fetch gathering {}: {}", query.short_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn join_gathering(
    State(state): State<AppState>,
    Json(req): Json<JoinGatheringRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_required("你的名字", &req.name)
        .and_then(|_| validate_required("出發地點", &req.location))
    {
        return (
            StatusCode::BAD_REQUEST,
            error_to_api_response(error_codes::VALIDATION_ERROR, e.to_string()),
        );
    }

    match Gathering::join(&state.pool, &req).await {
        Ok(()) => {
            let _ = state.events.send(ParticipantInserted {
                short_id: req.short_id.clone(),
                name: req.name.clone(),
                is_creator: false,
            });
            (
                StatusCode::OK,
                success_to_api_response(serde_json::json!({
                    "success": true
                })),
            )
        }
        Err(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "找不到此聚會".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to join gathering {}: {}", req.short_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn common_dates(
    State(state): State<AppState>,
    Query(query): Query<ShortIdQuery>,
) -> impl IntoResponse {
    match Gathering::common_dates(&state.pool, &query.short_id).await {
        Ok(Some(common_dates)) => (
            StatusCode::OK,
            success_to_api_response(CommonDatesResponse { common_dates }),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            error_to_api_response(error_codes::NOT_FOUND, "找不到此聚會".to_string()),
        ),
        Err(e) => {
            tracing::error!("Failed to compute common dates {}: {}", query.short_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_to_api_response(error_codes::INTERNAL_ERROR, e.to_string()),
            )
        }
    }
}
