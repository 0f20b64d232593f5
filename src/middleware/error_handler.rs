use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

// 5xx 响应先把 body 读出来，以结构化字段记日志，再原样回填给客户端
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    if !response.status().is_server_error() {
        return response;
    }

    let status = response.status();
    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, 4096).await {
        Ok(b) => b,
        Err(e) => {
            error!(
                method = %method,
                path = %path,
                error = %e,
                "Failed to read error response body"
            );
            return Response::from_parts(parts, Body::empty());
        }
    };

    error!(
        method = %method,
        path = %path,
        status = %status,
        body = %String::from_utf8_lossy(&bytes),
        "Server error returned to client"
    );

    // 重新构建响应前先清掉长度头
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
