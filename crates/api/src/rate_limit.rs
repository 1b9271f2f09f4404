//! Process-local admission control for the AI endpoints.

use std::num::NonZeroU32;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use tracing::warn;

use crate::error::ApiError;
use crate::extract::ApprovedUser;
use crate::state::AppState;

/// Allows `limit` requests per `window` for each caller, replenishing evenly
/// over the window.
///
/// The limiter is not shared between processes.
pub struct AiRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl AiRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        let burst = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(window / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Take one request slot for `caller`; `false` when its window is exhausted.
    pub fn try_acquire(&self, caller: &str) -> bool {
        self.limiter.check_key(&caller.to_string()).is_ok()
    }
}

/// Reject requests over the caller's AI quota with 429.
///
/// Authentication runs first, so rejected credentials never spend quota.
pub async fn limit_ai_requests(
    State(state): State<AppState>,
    user: ApprovedUser,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.ai_limiter.try_acquire(user.id()) {
        warn!(
            user_id = %user.id(),
            path = %request.uri().path(),
            "AI rate limit exceeded"
        );
        return Err(ApiError::TooManyRequests(
            "Too many AI requests, please try again later".to_string(),
        ));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_burst_then_rejects() {
        let limiter = AiRateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_acquire("dana"));
        assert!(limiter.try_acquire("dana"));
        assert!(limiter.try_acquire("dana"));
        assert!(!limiter.try_acquire("dana"));
    }

    #[test]
    fn test_callers_have_separate_quotas() {
        let limiter = AiRateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire("dana"));
        assert!(!limiter.try_acquire("dana"));
        assert!(limiter.try_acquire("yossi"));
    }

    #[test]
    fn test_zero_limit_still_admits_one() {
        let limiter = AiRateLimiter::new(0, Duration::from_secs(60));
        assert!(limiter.try_acquire("dana"));
        assert!(!limiter.try_acquire("dana"));
    }
}
