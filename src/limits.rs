//! Admission control for outbound upstream calls.
//!
//! Each upstream class gets its own token bucket (requests per rolling
//! minute) and concurrency ceiling. Queued calls wait; nothing is dropped.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovLimiter};
use serde::Serialize;
use std::future::Future;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Semaphore;

type DirectLimiter = GovLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// The Admiralty tide API has a far tighter quota than Open-Meteo.
const TIDE_PER_MINUTE: u32 = 30;
const TIDE_CONCURRENT: usize = 4;
const WEATHER_PER_MINUTE: u32 = 300;
const WEATHER_CONCURRENT: usize = 32;
const SEWAGE_PER_MINUTE: u32 = 60;
const SEWAGE_CONCURRENT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamClass {
    Tide,
    Weather,
    Sewage,
}

impl UpstreamClass {
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamClass::Tide => "tide",
            UpstreamClass::Weather => "weather",
            UpstreamClass::Sewage => "sewage",
        }
    }
}

struct ClassLimiter {
    limiter: DirectLimiter,
    permits: Semaphore,
    completed: AtomicU64,
    failed: AtomicU64,
    queued: AtomicU64,
}

impl ClassLimiter {
    fn new(per_minute: u32, concurrent: usize) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap());
        Self {
            limiter: GovLimiter::direct(quota),
            permits: Semaphore::new(concurrent),
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            queued: AtomicU64::new(0),
        }
    }
}

/// Per-class counters, readable without blocking request serving.
#[derive(Debug, Clone, Serialize)]
pub struct ClassStats {
    pub class: &'static str,
    pub completed: u64,
    pub failed: u64,
    pub queued: u64,
}

pub struct FetchLimits {
    tide: ClassLimiter,
    weather: ClassLimiter,
    sewage: ClassLimiter,
}

impl FetchLimits {
    pub fn new() -> Self {
        Self::with_limits(
            (TIDE_PER_MINUTE, TIDE_CONCURRENT),
            (WEATHER_PER_MINUTE, WEATHER_CONCURRENT),
            (SEWAGE_PER_MINUTE, SEWAGE_CONCURRENT),
        )
    }

    pub fn with_limits(tide: (u32, usize), weather: (u32, usize), sewage: (u32, usize)) -> Self {
        Self {
            tide: ClassLimiter::new(tide.0, tide.1),
            weather: ClassLimiter::new(weather.0, weather.1),
            sewage: ClassLimiter::new(sewage.0, sewage.1),
        }
    }

    fn class(&self, class: UpstreamClass) -> &ClassLimiter {
        match class {
            UpstreamClass::Tide => &self.tide,
            UpstreamClass::Weather => &self.weather,
            UpstreamClass::Sewage => &self.sewage,
        }
    }

    /// Schedule an upstream call. Waits for a concurrency permit and a token
    /// before dispatch; the call's own error is passed through untouched.
    pub async fn run<T, E, F>(&self, class: UpstreamClass, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let limiter = self.class(class);
        limiter.queued.fetch_add(1, Ordering::Relaxed);
        let _permit = limiter
            .permits
            .acquire()
            .await
            .expect("semaphore is never closed");
        limiter.limiter.until_ready().await;
        limiter.queued.fetch_sub(1, Ordering::Relaxed);

        let result = fut.await;
        match &result {
            Ok(_) => limiter.completed.fetch_add(1, Ordering::Relaxed),
            Err(_) => limiter.failed.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    pub fn stats(&self) -> Vec<ClassStats> {
        [
            UpstreamClass::Tide,
            UpstreamClass::Weather,
            UpstreamClass::Sewage,
        ]
        .iter()
        .map(|&class| {
            let limiter = self.class(class);
            ClassStats {
                class: class.as_str(),
                completed: limiter.completed.load(Ordering::Relaxed),
                failed: limiter.failed.load(Ordering::Relaxed),
                queued: limiter.queued.load(Ordering::Relaxed),
            }
        })
        .collect()
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let limits = FetchLimits::new();
        let ok: Result<u32, String> = limits.run(UpstreamClass::Weather, async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<u32, String> = limits
            .run(UpstreamClass::Weather, async { Err("boom".to_string()) })
            .await;
        assert_eq!(err.unwrap_err(), "boom");
    }

    #[tokio::test]
    async fn test_counters_track_outcomes() {
        let limits = FetchLimits::new();
        let _: Result<(), ()> = limits.run(UpstreamClass::Tide, async { Ok(()) }).await;
        let _: Result<(), ()> = limits.run(UpstreamClass::Tide, async { Ok(()) }).await;
        let _: Result<(), ()> = limits.run(UpstreamClass::Tide, async { Err(()) }).await;

        let stats = limits.stats();
        let tide = stats.iter().find(|s| s.class == "tide").unwrap();
        assert_eq!(tide.completed, 2);
        assert_eq!(tide.failed, 1);
        assert_eq!(tide.queued, 0);

        let weather = stats.iter().find(|s| s.class == "weather").unwrap();
        assert_eq!(weather.completed, 0);
    }

    #[tokio::test]
    async fn test_classes_are_independent() {
        let limits = FetchLimits::with_limits((1, 1), (100, 8), (100, 8));
        // Consume the only tide token; weather calls must still go straight through.
        let _: Result<(), ()> = limits.run(UpstreamClass::Tide, async { Ok(()) }).await;
        let _: Result<(), ()> = limits.run(UpstreamClass::Weather, async { Ok(()) }).await;
        let stats = limits.stats();
        assert_eq!(stats.iter().find(|s| s.class == "weather").unwrap().completed, 1);
    }
}
