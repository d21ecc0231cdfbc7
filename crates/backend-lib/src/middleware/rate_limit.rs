use crate::{error::AppError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limiter middleware: fixed window per client ip, applied to the
/// auth routes.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Get client IP
    let client_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    // Get rate limit settings
    let max_requests = state.settings.rate_limit.max_requests;
    let window_secs = state.settings.rate_limit.window_secs;

    // Get or create rate limit entry
    let mut entry = state
        .rate_limits
        .entry(client_ip)
        .or_insert_with(|| RateLimitEntry {
            requests: 0,
            window_start: Instant::now(),
        });

    // Check if window has expired
    if entry.window_start.elapsed() > Duration::from_secs(window_secs) {
        entry.requests = 0;
        entry.window_start = Instant::now();
    }

    // Check if rate limit exceeded
    if entry.requests >= max_requests {
        return Err(AppError::RateLimitExceeded);
    }

    // Increment request count
    entry.requests += 1;
    drop(entry);

    // Continue to next middleware/handler
    Ok(next.run(request).await)
}

/// Rate limit entry for a client
#[derive(Debug)]
pub struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}
