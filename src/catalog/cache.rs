use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::error::CatalogError;
use crate::catalog::parsing::parse_payload;
use crate::catalog::source::CatalogSource;
use crate::catalog::types::{CategorizedObject, OrbitalElementRecord};

pub const DEFAULT_BUCKET: Duration = Duration::from_secs(3600);

/// A group fetched within one retrieval bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub group: String,
    pub bucket: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheEntryInfo {
    pub group: String,
    pub bucket: i64,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CacheStats {
    pub entries: usize,
    pub records: usize,
    pub network_fetches: u64,
    pub failed_fetches: u64,
    pub keys: Vec<CacheEntryInfo>,
}

/// Time-bucketed cache of catalog records, keyed by group.
///
/// A group is fetched from the source at most once per bucket. Failed
/// fetches are not cached. Storing a newer bucket for a group drops the
/// group's older ones, so at most one copy per group is kept.
pub struct ElementCache<C> {
    source: C,
    bucket_seconds: i64,
    entries: BTreeMap<CacheKey, Vec<OrbitalElementRecord>>,
    network_fetches: u64,
    failed_fetches: u64,
}

impl<C: CatalogSource> ElementCache<C> {
    pub fn new(source: C) -> Self {
        Self::with_bucket(source, DEFAULT_BUCKET)
    }

    pub fn with_bucket(source: C, bucket: Duration) -> Self {
        Self {
            source,
            bucket_seconds: bucket.as_secs().max(1) as i64,
            entries: BTreeMap::new(),
            network_fetches: 0,
            failed_fetches: 0,
        }
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn key(&self, group: &str, now: DateTime<Utc>) -> CacheKey {
        CacheKey {
            group: group.to_string(),
            bucket: now.timestamp().div_euclid(self.bucket_seconds),
        }
    }

    /// Records for `group` in the bucket containing `now`.
    ///
    /// Never fails: network, status and payload errors are logged and
    /// yield an empty list.
    pub async fn fetch(&mut self, group: &str, now: DateTime<Utc>) -> Vec<OrbitalElementRecord> {
        match self.try_fetch(group, now).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Error fetching {} data: {}", group, e);
                Vec::new()
            }
        }
    }

    async fn try_fetch(
        &mut self,
        group: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrbitalElementRecord>, CatalogError> {
        let key = self.key(group, now);
        if let Some(records) = self.entries.get(&key) {
            debug!("Using cached data for {}", group);
            return Ok(records.clone());
        }

        self.network_fetches += 1;
        let parsed = match self.source.fetch_group(group).await {
            Ok(payload) => parse_payload(&payload),
            Err(e) => Err(e),
        };
        let records = match parsed {
            Ok(records) => records,
            Err(e) => {
                self.failed_fetches += 1;
                return Err(e);
            }
        };

        info!("Fetched {} satellites from {}", records.len(), group);
        self.entries
            .retain(|old, _| old.group != key.group || old.bucket > key.bucket);
        self.entries.insert(key, records.clone());
        Ok(records)
    }

    /// Fetch and categorize every group, in order.
    ///
    /// Groups that fail contribute nothing. When every group fails the
    /// result is everything currently cached instead, the latest copy of
    /// each group.
    pub async fn fetch_all(
        &mut self,
        groups: &[String],
        now: DateTime<Utc>,
    ) -> Vec<CategorizedObject> {
        match self.try_fetch_all(groups, now).await {
            Ok(objects) => objects,
            Err(e) => {
                warn!("Error fetching satellite data ({}), using cached data", e);
                self.cached_objects()
            }
        }
    }

    async fn try_fetch_all(
        &mut self,
        groups: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<CategorizedObject>, CatalogError> {
        let mut objects = Vec::new();
        let mut succeeded = 0usize;
        let mut last_error = None;

        for group in groups {
            match self.try_fetch(group, now).await {
                Ok(records) => {
                    succeeded += 1;
                    objects.extend(
                        records
                            .into_iter()
                            .map(|record| CategorizedObject::new(record, group)),
                    );
                }
                Err(e) => {
                    warn!("Error fetching {} data: {}", group, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => {
                info!("Total satellites fetched: {}", objects.len());
                Ok(objects)
            }
        }
    }

    /// Everything cached, flattened in group order.
    pub fn cached_objects(&self) -> Vec<CategorizedObject> {
        self.entries
            .iter()
            .flat_map(|(key, records)| {
                records
                    .iter()
                    .map(move |record| CategorizedObject::new(record.clone(), &key.group))
            })
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            records: self.entries.values().map(Vec::len).sum(),
            network_fetches: self.network_fetches,
            failed_fetches: self.failed_fetches,
            keys: self
                .entries
                .iter()
                .map(|(key, records)| CacheEntryInfo {
                    group: key.group.clone(),
                    bucket: key.bucket,
                    records: records.len(),
                })
                .collect(),
        }
    }
}
