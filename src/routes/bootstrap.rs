use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;
use crate::utils::success_to_api_response;

// 前端启动所需的公开配置
#[derive(Debug, Serialize)]
pub struct ClientConfig {
    pub liff_id: String,
    pub maps_api_key: String,
    pub public_origin: String,
}

#[axum::debug_handler]
pub async fn client_config(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        success_to_api_response(ClientConfig {
            liff_id: state.config.liff_id.clone(),
            maps_api_key: state.config.maps_api_key.clone(),
            public_origin: state.config.public_origin.clone(),
        }),
    )
}
