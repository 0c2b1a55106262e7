use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
/// Tune these based on real staff headcounts.
const FILTER_CAPACITY: usize = 50_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static STAFF_FILTER: Lazy<RwLock<CuckooFilter<u64>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

/// Check if a staff id might exist (false positives possible). A negative
/// answer short-circuits the scan pipeline before any database round trip,
/// which is what keeps bulk imports with junk ids cheap.
pub fn might_exist(staff_id: u64) -> bool {
    STAFF_FILTER
        .read()
        .expect("staff filter poisoned")
        .contains(&staff_id)
}

/// Insert a single staff id into the filter
pub fn insert(staff_id: u64) {
    STAFF_FILTER
        .write()
        .expect("staff filter poisoned")
        .add(&staff_id);
}

/// Remove a staff id from the filter
pub fn remove(staff_id: u64) {
    STAFF_FILTER
        .write()
        .expect("staff filter poisoned")
        .remove(&staff_id);
}

/// Warm up the staff filter using streaming + batching
pub async fn warmup_staff_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64,)>("SELECT id FROM staff").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (staff_id,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(staff_id);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Staff filter warmup complete: {} staff", total);
    Ok(())
}

/// Insert a batch of staff ids
fn insert_batch(staff_ids: &[u64]) {
    let mut filter = STAFF_FILTER.write().expect("staff filter poisoned");

    for staff_id in staff_ids {
        filter.add(staff_id);
    }
}
