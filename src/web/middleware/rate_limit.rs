//! Per-client-IP rate limiting for the API.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use crate::config::WebConfig;
use crate::web::error::ApiError;

/// Rate limiter keyed by client IP.
pub type IpRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// How often idle client entries are pruned.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

const RATE_LIMITED_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// State for rate limiting.
///
/// Each client may spend `max_requests` at once; capacity refills evenly
/// over the window. Clients are keyed by peer address unless proxy headers
/// are trusted.
pub struct RateLimitState {
    limiter: IpRateLimiter,
    max_requests: u32,
    window: Duration,
    trust_proxy: bool,
}

impl RateLimitState {
    /// Create a new rate limit state.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
            max_requests,
            window,
            trust_proxy: false,
        }
    }

    /// Key clients on `X-Forwarded-For`/`X-Real-IP` when present.
    pub fn trust_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    /// Create rate limit state from the web configuration.
    pub fn from_config(config: &WebConfig) -> Self {
        Self::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        )
        .trust_proxy(config.trust_proxy)
    }

    /// Requests allowed per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check if a request from the given IP is allowed, consuming capacity.
    pub fn check(&self, ip: &str) -> bool {
        self.limiter.check_key(&ip.to_string()).is_ok()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Drop entries for clients whose capacity has fully refilled.
    pub fn cleanup(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Start a background task to periodically clean up idle entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                self.cleanup();
                tracing::debug!(
                    tracked = self.tracked_clients(),
                    "Pruned idle rate-limit entries"
                );
            }
        });
    }
}

impl std::fmt::Debug for RateLimitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitState")
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("trust_proxy", &self.trust_proxy)
            .finish_non_exhaustive()
    }
}

/// Extract client IP from request.
///
/// Forwarding headers are client-controlled, so they are only read when
/// `trust_proxy` is set.
fn get_client_ip(req: &Request, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(req) {
            return ip;
        }
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Client IP reported by a reverse proxy.
fn forwarded_ip(req: &Request) -> Option<String> {
    // First hop of X-Forwarded-For is the original client
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        // Take the first IP in the chain
        if let Some(ip) = forwarded.split(',').next() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return Some(ip.to_string());
            }
        }
    }

    req.headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Rate limiting middleware for the API.
pub async fn api_rate_limit(
    State(state): State<Arc<RateLimitState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ip = get_client_ip(&req, state.trust_proxy);

    if !state.check(&ip) {
        tracing::warn!(ip = %ip, path = %req.uri().path(), "API rate limit exceeded");
        return Err(ApiError::too_many_requests(RATE_LIMITED_MESSAGE));
    }

    Ok(next.run(req).await)
}
