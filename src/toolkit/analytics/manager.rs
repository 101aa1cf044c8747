use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::cache::StatsCache;
use crate::core::houses::House;
use crate::core::services::registration::Registrant;
use crate::platform::base::{DocumentStore, StoreError};

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for AnalyticsError {
    fn from(e: StoreError) -> Self {
        AnalyticsError::Store(e.to_string())
    }
}

/// Per-house membership for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseStats {
    pub counts: HashMap<House, u64>,
    pub total: u64,
    /// Difference between the fullest and the emptiest house.
    pub spread: u64,
    pub collected_at: DateTime<Utc>,
}

/// Demographic overview for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total: usize,
    pub by_sex: HashMap<String, usize>,
    pub by_religion: HashMap<String, usize>,
    pub age_buckets: HashMap<String, usize>,
    pub average_age: f64,
    /// Registrations per calendar day (UTC), keyed `YYYY-MM-DD`.
    pub per_day: HashMap<String, usize>,
    pub collected_at: DateTime<Utc>,
}

/// Read-side aggregates over the registration set.
///
/// Every computation re-reads the live collection; results are cached for
/// a short TTL so dashboard polling does not hammer the store.
pub struct AnalyticsManager {
    store: Arc<dyn DocumentStore>,
    collection: String,
    house_cache: StatsCache<HouseStats>,
    overview_cache: StatsCache<OverviewStats>,
}

impl AnalyticsManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        registrations_collection: &str,
        cache_size: usize,
        cache_ttl_secs: u64,
    ) -> Self {
        info!(
            "AnalyticsManager initialized (collection={}, cache_ttl={}s)",
            registrations_collection, cache_ttl_secs
        );
        Self {
            store,
            collection: registrations_collection.to_string(),
            house_cache: StatsCache::new(cache_size, cache_ttl_secs),
            overview_cache: StatsCache::new(cache_size, cache_ttl_secs),
        }
    }

    pub async fn house_stats(&self) -> Result<HouseStats, AnalyticsError> {
        let key = StatsCache::<HouseStats>::make_key(&["house_stats", &self.collection]);
        if let Some(cached) = self.house_cache.get(&key) {
            debug!("house_stats served from cache");
            return Ok(cached);
        }

        let registrants = self.load_registrants().await?;

        let mut counts: HashMap<House, u64> = House::all().into_iter().map(|h| (h, 0)).collect();
        for registrant in &registrants {
            *counts.entry(registrant.house).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().unwrap_or(0);
        let min = counts.values().copied().min().unwrap_or(0);
        let stats = HouseStats {
            total: registrants.len() as u64,
            spread: max - min,
            counts,
            collected_at: Utc::now(),
        };

        self.house_cache.set(&key, stats.clone());
        Ok(stats)
    }

    pub async fn overview_stats(&self) -> Result<OverviewStats, AnalyticsError> {
        let key = StatsCache::<OverviewStats>::make_key(&["overview_stats", &self.collection]);
        if let Some(cached) = self.overview_cache.get(&key) {
            debug!("overview_stats served from cache");
            return Ok(cached);
        }

        let registrants = self.load_registrants().await?;

        let mut by_sex: HashMap<String, usize> = HashMap::new();
        let mut by_religion: HashMap<String, usize> = HashMap::new();
        let mut age_buckets: HashMap<String, usize> = HashMap::new();
        let mut per_day: HashMap<String, usize> = HashMap::new();
        let mut age_sum: u64 = 0;

        for registrant in &registrants {
            let sex = match registrant.sex {
                crate::core::services::registration::Sex::Male => "male",
                crate::core::services::registration::Sex::Female => "female",
            };
            *by_sex.entry(sex.to_string()).or_insert(0) += 1;
            *by_religion
                .entry(registrant.religion.clone())
                .or_insert(0) += 1;
            *age_buckets
                .entry(age_bucket(registrant.age).to_string())
                .or_insert(0) += 1;
            *per_day
                .entry(registrant.created_at.format("%Y-%m-%d").to_string())
                .or_insert(0) += 1;
            age_sum += registrant.age as u64;
        }

        let average_age = if registrants.is_empty() {
            0.0
        } else {
            age_sum as f64 / registrants.len() as f64
        };

        let stats = OverviewStats {
            total: registrants.len(),
            by_sex,
            by_religion,
            age_buckets,
            average_age,
            per_day,
            collected_at: Utc::now(),
        };

        self.overview_cache.set(&key, stats.clone());
        Ok(stats)
    }

    pub fn invalidate(&self) {
        self.house_cache.clear();
        self.overview_cache.clear();
    }

    async fn load_registrants(&self) -> Result<Vec<Registrant>, AnalyticsError> {
        let documents = self.store.list(&self.collection).await?;
        let mut registrants = Vec::with_capacity(documents.len());
        for doc in &documents {
            match Registrant::from_document(doc) {
                Ok(registrant) => registrants.push(registrant),
                Err(e) => warn!("Skipping malformed registration in analytics: {}", e),
            }
        }
        Ok(registrants)
    }
}

/// Buckets an age for the dashboard histogram.
pub fn age_bucket(age: u32) -> &'static str {
    match age {
        0..=9 => "<10",
        10..=19 => "10-19",
        20..=29 => "20-29",
        30..=39 => "30-39",
        40..=49 => "40-49",
        50..=59 => "50-59",
        _ => "60+",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::base::Document;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};

    struct StaticStore {
        docs: Mutex<Vec<Document>>,
    }

    #[async_trait]
    impl DocumentStore for StaticStore {
        async fn get(&self, _c: &str, _id: &str) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }
        async fn set(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
            Ok(())
        }
        async fn update(&self, _c: &str, _id: &str, _f: Value) -> Result<(), StoreError> {
            Ok(())
        }
        async fn delete(&self, _c: &str, _id: &str) -> Result<(), StoreError> {
            Ok(())
        }
        async fn query_eq(
            &self,
            _c: &str,
            _f: &str,
            _v: Value,
        ) -> Result<Vec<Document>, StoreError> {
            Ok(vec![])
        }
        async fn list(&self, _c: &str) -> Result<Vec<Document>, StoreError> {
            Ok(self.docs.lock().clone())
        }
        async fn delete_batch(&self, _c: &str, _ids: &[String]) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn doc(id: &str, house: &str, sex: &str, age: u32, day: &str) -> Document {
        Document {
            id: id.to_string(),
            fields: json!({
                "full_name": "Person",
                "age": age,
                "sex": sex,
                "religion": "Catholic",
                "contact": "p@example.com",
                "owner": "uid",
                "house": house,
                "created_at": format!("{}T09:00:00Z", day),
                "updated_at": format!("{}T09:00:00Z", day),
            }),
        }
    }

    fn manager(docs: Vec<Document>) -> AnalyticsManager {
        let store = Arc::new(StaticStore {
            docs: Mutex::new(docs),
        });
        AnalyticsManager::new(store, "registrations", 8, 60)
    }

    #[tokio::test]
    async fn test_house_stats_cover_all_houses() {
        let m = manager(vec![
            doc("r1", "RED", "male", 12, "2025-03-01"),
            doc("r2", "RED", "female", 14, "2025-03-01"),
            doc("r3", "BLUE", "male", 30, "2025-03-02"),
        ]);

        let stats = m.house_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.counts[&House::Red], 2);
        assert_eq!(stats.counts[&House::Blue], 1);
        assert_eq!(stats.counts[&House::Yellow], 0);
        assert_eq!(stats.counts[&House::Purple], 0);
        assert_eq!(stats.spread, 2);
    }

    #[tokio::test]
    async fn test_overview_aggregates() {
        let m = manager(vec![
            doc("r1", "RED", "male", 9, "2025-03-01"),
            doc("r2", "BLUE", "female", 35, "2025-03-01"),
            doc("r3", "BLUE", "female", 40, "2025-03-02"),
        ]);

        let stats = m.overview_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_sex["male"], 1);
        assert_eq!(stats.by_sex["female"], 2);
        assert_eq!(stats.age_buckets["<10"], 1);
        assert_eq!(stats.age_buckets["30-39"], 1);
        assert_eq!(stats.age_buckets["40-49"], 1);
        assert_eq!(stats.per_day["2025-03-01"], 2);
        assert!((stats.average_age - 28.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_stats_are_cached_until_invalidated() {
        let store = Arc::new(StaticStore {
            docs: Mutex::new(vec![doc("r1", "RED", "male", 12, "2025-03-01")]),
        });
        let m = AnalyticsManager::new(store.clone(), "registrations", 8, 60);

        let first = m.house_stats().await.unwrap();
        assert_eq!(first.total, 1);

        // Mutate the backing store; the cached aggregate must still serve.
        store
            .docs
            .lock()
            .push(doc("r2", "BLUE", "male", 20, "2025-03-02"));

        let second = m.house_stats().await.unwrap();
        assert_eq!(second.total, 1);

        m.invalidate();
        let third = m.house_stats().await.unwrap();
        assert_eq!(third.total, 2);
    }

    #[test]
    fn test_age_bucket_edges() {
        assert_eq!(age_bucket(9), "<10");
        assert_eq!(age_bucket(10), "10-19");
        assert_eq!(age_bucket(59), "50-59");
        assert_eq!(age_bucket(60), "60+");
        assert_eq!(age_bucket(95), "60+");
    }
}
