//! Process-wide expiring result cache.
//!
//! Values are postcard-encoded into a fjall keyspace together with an
//! absolute expiry timestamp. An expired entry reads as a miss and is
//! removed. This cache is the only persisted state in the service.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use rand::RngExt;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use tokio::task;

static GLOBAL_CACHE: OnceCell<ResultCache> = OnceCell::const_new();

/// Geocoding results barely move: 24 hours
pub const GEOCODE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Current weather goes stale fast: 30 minutes
pub const WEATHER_TTL: Duration = Duration::from_secs(30 * 60);
/// Points of interest and hotels: 6 hours
pub const PLACES_TTL: Duration = Duration::from_secs(6 * 60 * 60);
/// Photo search results: 12 hours
pub const PHOTOS_TTL: Duration = Duration::from_secs(12 * 60 * 60);
/// Place summaries: 24 hours
pub const SUMMARY_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Route legs between two fixed points: 7 days
pub const ROUTE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

pub struct ResultCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl ResultCache {
    fn new(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(ResultCache { store: items })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

/// Initializes the global result cache. **Must be called once before use.**
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    let cache = ResultCache::new(path)?;
    GLOBAL_CACHE
        .set(cache)
        .map_err(|_| anyhow!("Cache already initialized"))?;
    Ok(())
}

/// Returns a reference to the globally initialized cache.
/// # Panics
/// Panics if the cache has not been initialized by calling `cache::init()` first.
fn get_cache() -> &'static ResultCache {
    GLOBAL_CACHE
        .get()
        .expect("Cache not initialized. Call cache::init() first.")
}

// Public, ergonomic API endpoints that use the global cache.
pub async fn put<T: Serialize + Send + Debug + 'static>(
    key: &str,
    value: T,
    ttl: Duration,
) -> Result<()> {
    get_cache().put(key, value, ttl).await
}

pub async fn get<T: DeserializeOwned + Send + 'static>(key: &str) -> Result<Option<T>> {
    get_cache().get(key).await
}

pub async fn remove(key: &str) -> Result<()> {
    get_cache().remove(key).await
}

/// Build a cache key from its parameter parts.
///
/// Each part is lower-cased with whitespace collapsed, so semantically
/// identical requests collide while different limits, radii, or rounded
/// coordinates stay distinct.
#[must_use]
pub fn key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| normalize(part))
        .collect::<Vec<_>>()
        .join(":")
}

fn normalize(part: &str) -> String {
    part.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Apply a ±10% jitter to a TTL so entries written together do not all
/// expire together.
#[must_use]
pub fn jittered(ttl: Duration) -> Duration {
    let jitter: f32 = rand::rng().random_range(0.9..1.1);
    Duration::from_secs((ttl.as_secs_f32() * jitter) as u64)
}

#[cfg(test)]
pub(crate) fn init_for_tests() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let dir = tempfile::tempdir().expect("temp cache dir");
        init(dir.path().join("cache")).expect("cache init");
        // Keep the directory alive for the whole test process.
        std::mem::forget(dir);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cache() -> (ResultCache, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResultCache::new(dir.path().join("cache")).unwrap();
        (cache, dir)
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (cache, _dir) = test_cache();
        cache
            .put("greeting", "hello".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        let value: Option<String> = cache.get("greeting").await.unwrap();
        assert_eq!(value, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let (cache, _dir) = test_cache();
        cache
            .put("stale", 42u32, Duration::ZERO)
            .await
            .unwrap();
        let value: Option<u32> = cache.get("stale").await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_missing_key_is_a_miss() {
        let (cache, _dir) = test_cache();
        let value: Option<u32> = cache.get("never-written").await.unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(key(&["geocode", "Paris,  France"]), "geocode:paris, france");
        assert_eq!(
            key(&["geocode", "paris, france"]),
            key(&["geocode", "  PARIS,   FRANCE "])
        );
        // Different parameters must not collide
        assert_ne!(
            key(&["places", "48.86:2.35", "restaurant", "5000", "10"]),
            key(&["places", "48.86:2.35", "restaurant", "3000", "10"])
        );
    }

    #[test]
    fn test_jitter_stays_in_band() {
        for _ in 0..100 {
            let ttl = jittered(Duration::from_secs(1000));
            assert!(ttl >= Duration::from_secs(900));
            assert!(ttl <= Duration::from_secs(1100));
        }
    }
}
