use std::env;

use crate::services::scheduling::MAX_DURATION_MINUTES;

/// Upper bound applied to `MAX_PAGE_SIZE`.
pub const PAGE_SIZE_CEILING: i64 = 1000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// Assumed length of a booking with no duration when checking overlaps.
    pub default_duration_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "shutterbook.db".to_string()),
            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            max_page_size: env::var("MAX_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            default_duration_minutes: env::var("DEFAULT_DURATION_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }
        .clamped()
    }

    /// Pulls page sizes and the default duration into the ranges the
    /// handlers and the overlap check rely on.
    pub fn clamped(self) -> Self {
        let max_page_size = self.max_page_size.clamp(1, PAGE_SIZE_CEILING);
        Self {
            default_page_size: self.default_page_size.clamp(1, max_page_size),
            max_page_size,
            default_duration_minutes: self
                .default_duration_minutes
                .clamp(1, MAX_DURATION_MINUTES),
            ..self
        }
    }
}
