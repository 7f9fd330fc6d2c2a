//! Optional retry policy for list and detail requests.
//!
//! The extractor defaults to [`RetryConfig::no_retry`]: a failed request is
//! handled once, the way the upstream tap always behaved. Retries are opt-in.

use std::time::Duration;

use crate::http_client::{HttpError, HttpErrorKind};

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt.min(i32::MAX as u32) as i32);
                let capped_seconds = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(capped_seconds);

                if !jitter {
                    return delay;
                }

                let millis = delay.as_millis() as u64;
                let spread = millis / 2;
                let offset = fastrand::u64(0..=(spread * 2));
                Duration::from_millis((millis - spread) + offset)
            }
        }
    }
}

/// Which failures are retried and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts after the first one; `0` disables retrying.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }

    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::no_retry()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::no_retry()
        }
    }

    pub const fn enabled(&self) -> bool {
        self.max_retries > 0
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        match error.kind() {
            HttpErrorKind::Timeout => self.retry_on_timeout,
            HttpErrorKind::Connect => self.retry_on_connect,
            HttpErrorKind::Body | HttpErrorKind::Other => false,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
