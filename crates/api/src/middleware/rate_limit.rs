//! Rate limiting middleware.
//!
//! Provides per-user rate limiting for authenticated routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::user_auth::AuthUser;

/// Type alias for the rate limiter used per user.
type UserRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests.
/// Uses a HashMap keyed by user id with individual rate limiters.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<Uuid, Arc<UserRateLimiter>>>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
        }
    }

    /// Get or create a rate limiter for the given user.
    fn get_or_create_limiter(&self, user_id: Uuid) -> Arc<UserRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(&user_id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap();

        // Double-check in case another thread created it
        if let Some(limiter) = limiters.get(&user_id) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(NonZeroU32::new(120).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(user_id, limiter.clone());
        limiter
    }

    /// Check if a request from the given user should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, user_id: Uuid) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(user_id);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                // Minimum 1 second
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

/// Middleware that applies rate limiting per authenticated user.
///
/// Must run AFTER authentication so that the user id is available in
/// request extensions. Requests without auth info pass through (they
/// fail the auth layer anyway).
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let auth = match req.extensions().get::<AuthUser>() {
        Some(auth) => auth.clone(),
        None => return next.run(req).await,
    };

    if let Some(ref rate_limiter) = state.rate_limiter {
        if let Err(retry_after) = rate_limiter.check(auth.user_id) {
            return rate_limited_response(state.config.security.rate_limit_per_minute, retry_after);
        }
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": format!("Rate limit of {} requests/minute exceeded", limit),
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    response.headers_mut().insert(
        header::RETRY_AFTER,
        retry_after.to_string().parse().unwrap(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_state_creation() {
        let state = RateLimiterState::new(120);
        assert_eq!(state.rate_limit_per_minute, 120);
    }

    #[test]
    fn test_rate_limiter_allows_requests() {
        let state = RateLimiterState::new(120);
        assert!(state.check(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn test_rate_limiter_exhaustion() {
        // Very low limit to test exhaustion
        let state = RateLimiterState::new(1);
        let user = Uuid::new_v4();

        assert!(state.check(user).is_ok());

        let result = state.check(user);
        assert!(result.is_err());
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_rate_limiter_users_independent() {
        let state = RateLimiterState::new(1);
        let user1 = Uuid::new_v4();
        let user2 = Uuid::new_v4();

        assert!(state.check(user1).is_ok());
        assert!(state.check(user2).is_ok());

        assert!(state.check(user1).is_err());
        assert!(state.check(user2).is_err());
    }

    #[test]
    fn test_rate_limiter_same_user_multiple_checks() {
        let state = RateLimiterState::new(5);
        let user = Uuid::new_v4();

        for i in 0..5 {
            assert!(state.check(user).is_ok(), "Request {} should be allowed", i);
        }
        assert!(state.check(user).is_err());
    }

    #[test]
    fn test_rate_limiter_get_or_create_idempotent() {
        let state = RateLimiterState::new(120);
        let user = Uuid::new_v4();

        let limiter1 = state.get_or_create_limiter(user);
        let limiter2 = state.get_or_create_limiter(user);

        assert!(Arc::ptr_eq(&limiter1, &limiter2));
    }

    #[test]
    fn test_rate_limiter_state_debug() {
        let state = RateLimiterState::new(120);
        state.check(Uuid::new_v4()).unwrap();

        let debug = format!("{:?}", state);
        assert!(debug.contains("RateLimiterState"));
        assert!(debug.contains("active_limiters"));
    }

    #[test]
    fn test_rate_limited_response_format() {
        let response = rate_limited_response(120, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }
}
