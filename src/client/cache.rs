use chrono::{DateTime, Duration, Utc};
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::client::{ClientError, NearbySource};
use crate::config::QueryConfig;
use crate::service::NearbyParams;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries younger than this are served without a fetch.
    pub freshness: Duration,
    /// Past this many entries, the oldest one is evicted.
    pub capacity: usize,
    /// Radius the service applies when a circle query names none. Must match
    /// the server's `query.default_radius_m` so both spellings share a key.
    pub default_radius_m: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::seconds(30),
            capacity: 20,
            default_radius_m: 300.0,
        }
    }
}

impl CacheConfig {
    /// Defaults with the radius taken from the service's query settings.
    pub fn for_query(query: &QueryConfig) -> Self {
        Self {
            default_radius_m: query.default_radius_m,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: FeatureCollection,
    stored_at: DateTime<Utc>,
}

/// Region-keyed cache in front of a nearby source.
///
/// Keys round coordinates to two decimals, so small pans of the map reuse
/// the previous answer. Filters are not part of the key. Lookups and
/// inserts hold the lock; the fetch itself does not.
pub struct NearbyCache<S> {
    source: S,
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

/// Bounds key when the box is given, else center plus the effective radius.
/// `None` when the params carry no region at all.
pub fn cache_key(params: &NearbyParams, default_radius_m: f64) -> Option<String> {
    if let Some(b) = params.bounds {
        return Some(format!(
            "bounds:{:.2},{:.2},{:.2},{:.2}",
            b.ne_lat, b.ne_lng, b.sw_lat, b.sw_lng
        ));
    }
    match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => Some(format!(
            "center:{:.2},{:.2},{}",
            lat,
            lon,
            params.radius_m.unwrap_or(default_radius_m)
        )),
        _ => None,
    }
}

impl<S: NearbySource> NearbyCache<S> {
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cached payload if fresh, else a fetch whose result is cached.
    pub fn get(&self, params: &NearbyParams) -> Result<FeatureCollection, ClientError> {
        self.get_at(params, Utc::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock reading.
    pub fn get_at(
        &self,
        params: &NearbyParams,
        now: DateTime<Utc>,
    ) -> Result<FeatureCollection, ClientError> {
        let Some(key) = self.key(params) else {
            // Nothing to key on; let the source report the missing region.
            return self.source.fetch(params);
        };

        if let Some(entry) = self.lock().get(&key) {
            if now.signed_duration_since(entry.stored_at) < self.config.freshness {
                debug!(%key, "nearby cache hit");
                return Ok(entry.payload.clone());
            }
        }

        debug!(%key, "nearby cache miss");
        let payload = self.source.fetch(params)?;
        self.insert(key, payload.clone(), now);
        Ok(payload)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, params: &NearbyParams) -> bool {
        self.key(params).is_some_and(|k| self.lock().contains_key(&k))
    }

    fn key(&self, params: &NearbyParams) -> Option<String> {
        cache_key(params, self.config.default_radius_m)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn insert(&self, key: String, payload: FeatureCollection, now: DateTime<Utc>) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CacheEntry {
                payload,
                stored_at: now,
            },
        );

        while entries.len() > self.config.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    debug!(key = %k, "evicting oldest nearby cache entry");
                    entries.remove(&k);
                }
                None => break,
            }
        }
    }

    // A poisoned map is still a valid map.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }
}
