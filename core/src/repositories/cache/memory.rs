//! In-memory cache for tests, with TTLs measured against an injected clock

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::errors::DomainError;

use super::r#trait::CacheStore;

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// In-memory [`CacheStore`]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
            writes: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of `set_with_expiry` calls that stored something
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every call fail with a storage error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Drop a key without going through the trait, as an eviction would
    pub async fn evict(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// Remaining TTL of a live key, `None` if absent or persistent
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|at| at - now)
    }

    /// Number of live keys
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::storage("cache unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check_available()?;
        let now = self.clock.now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Str(s) => Ok(Some(s.clone())),
                Value::Set(_) => Err(DomainError::storage("WRONGTYPE operation on set key")),
            },
            _ => Ok(None),
        }
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        if ttl_secs == 0 {
            return Err(DomainError::Validation {
                message: "invalid expire time".to_string(),
            });
        }
        let expires_at = self.clock.now() + Duration::seconds(ttl_secs as i64);
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: Value::Str(value.to_string()),
                expires_at: Some(expires_at),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let now = self.clock.now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.map_or(false, |e| e.is_live(now)))
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        let now = self.clock.now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .map_or(false, |e| e.is_live(now)))
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), DomainError> {
        self.check_available()?;
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| {
                if !e.is_live(now) {
                    *e = Entry {
                        value: Value::Set(HashSet::new()),
                        expires_at: None,
                    };
                }
            })
            .or_insert_with(|| Entry {
                value: Value::Set(HashSet::new()),
                expires_at: None,
            });
        match &mut entry.value {
            Value::Set(members) => {
                members.insert(member.to_string());
                Ok(())
            }
            Value::Str(_) => Err(DomainError::storage("WRONGTYPE operation on string key")),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), DomainError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;
        let now_empty = match entries.get_mut(key).map(|e| &mut e.value) {
            Some(Value::Set(members)) => {
                members.remove(member);
                members.is_empty()
            }
            Some(Value::Str(_)) => {
                return Err(DomainError::storage("WRONGTYPE operation on string key"))
            }
            None => false,
        };
        // Redis drops empty sets
        if now_empty {
            entries.remove(key);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, DomainError> {
        self.check_available()?;
        let now = self.clock.now();
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => match &entry.value {
                Value::Set(members) => {
                    let mut members: Vec<String> = members.iter().cloned().collect();
                    members.sort();
                    Ok(members)
                }
                Value::Str(_) => Err(DomainError::storage("WRONGTYPE operation on string key")),
            },
            _ => Ok(Vec::new()),
        }
    }
}
