use crate::error::ServerError;
use crate::state::ServerState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use std::time::Instant;

const REQUEST_ID: &str = "x-request-id";

/// Key from `X-API-Key`, or from `Authorization` with an optional `Bearer `.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let raw = headers
        .get("x-api-key")
        .or_else(|| headers.get(AUTHORIZATION))?
        .to_str()
        .ok()?;
    Some(raw.strip_prefix("Bearer ").unwrap_or(raw))
}

/// Rejects requests without a configured key. Passes everything through
/// when no keys are configured.
pub async fn api_key_auth(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if !state.config.auth_enabled() {
        return Ok(next.run(request).await);
    }

    let key = presented_key(request.headers())
        .ok_or_else(|| {
            ServerError::Authentication(
                "provide a key in 'X-API-Key' or 'Authorization: Bearer <key>'".to_string(),
            )
        })?
        .to_string();

    if !state.is_valid_api_key(&key) {
        return Err(ServerError::Authentication("unknown API key".to_string()));
    }
    if !state.check_rate_limit(&key) {
        return Err(ServerError::RateLimitExceeded);
    }
    Ok(next.run(request).await)
}

/// Reuses the caller's `x-request-id` or mints one, and echoes it back.
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request.extensions_mut().insert(id.clone());
    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID, value);
    }
    response
}

pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let id = request.extensions().get::<String>().cloned().unwrap_or_default();
    let start = Instant::now();

    tracing::info!(%method, %path, request_id = %id, "request_started");
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        request_id = %id,
        status = response.status().as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "request_completed"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_headers_are_recognized() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(presented_key(&headers), Some("abc"));

        headers.insert("x-api-key", HeaderValue::from_static("xyz"));
        assert_eq!(presented_key(&headers), Some("xyz"));
    }
}
