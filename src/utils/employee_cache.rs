use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::store::{EmployeeDirectory, StoreError};

/// Tune based on memory
const CACHE_CAPACITY: u64 = 50_000;

/// Remembers user → employee links in memory.
/// Only positive lookups are stored, so a freshly linked employee is seen immediately.
pub struct CachedEmployeeDirectory<D> {
    inner: D,
    cache: Cache<u64, u64>,
}

impl<D: EmployeeDirectory> CachedEmployeeDirectory<D> {
    pub fn new(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }
}

#[async_trait]
impl<D: EmployeeDirectory> EmployeeDirectory for CachedEmployeeDirectory<D> {
    async fn employee_for_user(&self, user_id: u64) -> Result<Option<u64>, StoreError> {
        if let Some(employee_id) = self.cache.get(&user_id).await {
            return Ok(Some(employee_id));
        }

        let employee_id = self.inner.employee_for_user(user_id).await?;
        if let Some(id) = employee_id {
            self.cache.insert(user_id, id).await;
        }

        Ok(employee_id)
    }
}
