use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::shift::ShiftType;

/// Slice of the staff row the scan pipeline needs on every event.
#[derive(Debug, Clone)]
pub struct CachedStaff {
    pub full_name: String,
    pub shift_type: ShiftType,
    pub active: bool,
}

pub static STAFF_CACHE: Lazy<Cache<u64, CachedStaff>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000) // tune based on memory
        .time_to_live(Duration::from_secs(3600)) // shift assignments change rarely
        .build()
});

pub async fn put(staff_id: u64, staff: CachedStaff) {
    STAFF_CACHE.insert(staff_id, staff).await;
}

pub async fn get(staff_id: u64) -> Option<CachedStaff> {
    STAFF_CACHE.get(&staff_id).await
}

/// Drop a staff member after an admin edit so the next scan re-reads the row.
pub async fn evict(staff_id: u64) {
    STAFF_CACHE.invalidate(&staff_id).await;
}

/// Batch insert staff rows
async fn batch_put(rows: &[(u64, CachedStaff)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(id, staff)| STAFF_CACHE.insert(*id, staff.clone()))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load active staff into the in-memory cache (batched)
pub async fn warmup_staff_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String, ShiftType, bool)>(
        r#"
        SELECT id, full_name, shift_type, active
        FROM staff
        WHERE active = TRUE
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (id, full_name, shift_type, active) = row?;
        batch.push((id, CachedStaff { full_name, shift_type, active }));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_put(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining rows
    if !batch.is_empty() {
        batch_put(&batch).await;
    }

    log::info!("Staff cache warmup complete: {} active staff", total_count);

    Ok(())
}
