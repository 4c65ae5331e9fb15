use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::fmt;
use std::sync::Mutex;

/// Rate-limit metadata reported by the last response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        }

        let limit = header::<u32>(headers, "x-ratelimit-limit");
        let remaining = header::<u32>(headers, "x-ratelimit-remaining");
        let reset = header::<i64>(headers, "x-ratelimit-reset")
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }
        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

impl fmt::Display for RateLimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt<T: fmt::Display>(v: Option<T>) -> String {
            v.map(|v| v.to_string()).unwrap_or_default()
        }

        write!(
            f,
            "Rate Limit: {} / Requests Left: {} / Reset Time: {}",
            opt(self.limit),
            opt(self.remaining),
            opt(self.reset.map(|r| r.format("%Y-%m-%d %H:%M:%S UTC")))
        )
    }
}

/// Keeps the rate-limit snapshot of the most recent response.
#[derive(Default)]
pub struct RateLimitTracker {
    last: Mutex<Option<RateLimitInfo>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_from_headers(&self, headers: &HeaderMap) {
        if let Some(info) = RateLimitInfo::from_headers(headers) {
            tracing::debug!(
                "Rate limit: {:?} remaining of {:?}",
                info.remaining,
                info.limit
            );
            if let Ok(mut last) = self.last.lock() {
                *last = Some(info);
            }
        }
    }

    pub fn last(&self) -> Option<RateLimitInfo> {
        self.last.lock().ok().and_then(|last| *last)
    }
}
