use common::models::WeatherReport;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Cache slot identity: a city and the freshness window it was fetched in.
///
/// Expiry is structural. Once the window index advances, old keys stop being
/// looked up and age out under the capacity bound; nothing runs a timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    city: String,
    window: u64,
}

impl CacheKey {
    pub fn new(city: &str, window: u64) -> Self {
        Self {
            city: city.trim().to_lowercase(),
            window,
        }
    }
}

/// Maps unix time onto fixed-duration window indices.
///
/// The window index is the only clock input the cache ever sees, so tests
/// pass fixed indices instead of sleeping.
#[derive(Debug, Clone, Copy)]
pub struct WindowClock {
    period_seconds: u64,
}

impl WindowClock {
    pub fn new(period_seconds: u64) -> Self {
        Self {
            period_seconds: period_seconds.max(1),
        }
    }

    pub fn current(&self) -> u64 {
        let unix_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        unix_seconds / self.period_seconds
    }
}

struct CacheSlot {
    report: WeatherReport,
    last_used: AtomicU64,
}

/// Bounded (city, window) -> report map with least-recently-used eviction.
///
/// Recency stamps are atomics so a hit only needs the read lock; the write
/// lock is taken for inserts, where the capacity bound is enforced.
pub struct WeatherCache {
    slots: RwLock<HashMap<CacheKey, CacheSlot>>,
    ticks: AtomicU64,
    capacity: usize,
}

impl WeatherCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ticks: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn tick(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::Relaxed)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<WeatherReport> {
        let slots = self.slots.read().await;
        let slot = slots.get(key)?;
        slot.last_used.store(self.tick(), Ordering::Relaxed);
        Some(slot.report.clone())
    }

    pub async fn insert(&self, key: CacheKey, report: WeatherReport) {
        let mut slots = self.slots.write().await;
        if slots.len() >= self.capacity && !slots.contains_key(&key) {
            let victim = slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                slots.remove(&victim);
            }
        }
        slots.insert(
            key,
            CacheSlot {
                report,
                last_used: AtomicU64::new(self.tick()),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}
