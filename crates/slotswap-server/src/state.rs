use std::net::IpAddr;
use std::sync::Arc;

use slotswap_core::UserId;
use slotswap_engine::SwapEngine;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::RateLimiter;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SwapEngine>,
    pub write_limiter: Arc<RateLimiter<UserId>>,
    pub read_limiter: Arc<RateLimiter<UserId>>,
    /// Registration has no actor yet, so it is limited per client IP.
    pub register_limiter: Arc<RateLimiter<IpAddr>>,
}

impl AppState {
    pub fn new(engine: SwapEngine, config: &Config) -> Self {
        Self {
            engine: Arc::new(engine),
            write_limiter: Arc::new(RateLimiter::new(config.write_limit, config.rate_window)),
            read_limiter: Arc::new(RateLimiter::new(config.read_limit, config.rate_window)),
            register_limiter: Arc::new(RateLimiter::new(
                config.register_limit,
                config.rate_window,
            )),
        }
    }

    pub fn check_write(&self, actor: UserId) -> Result<(), ApiError> {
        self.write_limiter.check(actor).map_err(ApiError::RateLimited)
    }

    pub fn check_read(&self, actor: UserId) -> Result<(), ApiError> {
        self.read_limiter.check(actor).map_err(ApiError::RateLimited)
    }

    pub fn check_register(&self, ip: IpAddr) -> Result<(), ApiError> {
        self.register_limiter.check(ip).map_err(ApiError::RateLimited)
    }

    /// Forget idle callers in every limiter.
    pub fn cleanup_limiters(&self) {
        self.write_limiter.cleanup();
        self.read_limiter.cleanup();
        self.register_limiter.cleanup();
    }
}
