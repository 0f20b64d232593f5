use axum::Json;
use rand::Rng;
use serde::Serialize;

// 短 ID 字符集：小写字母加数字，6 位
const SHORT_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const SHORT_ID_LEN: usize = 6;

pub fn generate_short_id() -> String {
    let mut rng = rand::thread_rng();
    (0..SHORT_ID_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..SHORT_ID_CHARSET.len());
            SHORT_ID_CHARSET[idx] as char
        })
        .collect()
}

// 所有 handler 统一返回 Json<ApiResponse<T>>
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    pub resp_data: Option<T>,
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const NOT_FOUND: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_id_is_six_lower_alphanumeric_chars() {
        for _ in 0..64 {
            let id = generate_short_id();
            assert_eq!(id.len(), SHORT_ID_LEN);
            assert!(
                id.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            );
        }
    }
}
