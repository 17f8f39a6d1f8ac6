//! Bytecache - demo driver
//!
//! Builds a cache from environment configuration, runs a short scripted
//! workload through the public operations, and prints the resulting
//! statistics as JSON.

use anyhow::{ensure, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bytecache::{CacheError, CacheStore, Config};

/// Main entry point for the demo driver.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Run the set/get round and the eviction round
/// 4. Print statistics and destroy the cache
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bytecache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_budget={}, initial_buckets={}",
        config.memory_budget, config.initial_buckets
    );

    let mut cache = CacheStore::from_config(&config).context("invalid cache configuration")?;

    set_get_round(&mut cache)?;
    eviction_round(&mut cache)?;

    let stats = cache.stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    cache.destroy();
    info!("Cache destroyed");
    Ok(())
}

/// Stores a few single-byte keys and reads them back.
///
/// Skipped when the budget cannot hold all pairs at once, since a
/// read-back would then hit an evicted key.
fn set_get_round(cache: &mut CacheStore) -> anyhow::Result<()> {
    let pairs: [(u8, &[u8]); 3] = [(1, &[99][..]), (89, &[23, 0][..]), (30, &[255][..])];
    let needed: u64 = pairs.iter().map(|(_, value)| value.len() as u64).sum();
    if cache.memory_budget() < needed {
        info!(
            "Set/get round skipped: needs {} bytes, budget is {}",
            needed,
            cache.memory_budget()
        );
        return Ok(());
    }

    for (key, value) in pairs {
        cache.set(&[key], value)?;
    }

    for (key, value) in pairs {
        let got = cache.get(&[key])?;
        ensure!(got == value, "key {key}: expected {value:?}, got {got:?}");
    }

    ensure!(
        matches!(cache.get(&[10]), Err(CacheError::NotFound(_))),
        "key 10 was never stored"
    );
    info!("Set/get round passed, space used: {}", cache.space_used());
    Ok(())
}

/// Writes twice the budget in fixed-size values, forcing LRU eviction.
/// Budgets under 16 bytes use empty values, which always fit.
fn eviction_round(cache: &mut CacheStore) -> anyhow::Result<()> {
    let value_size = cache.memory_budget() / 16;
    let value = vec![0xAB; usize::try_from(value_size)?];
    let rounds = 32u32;

    for i in 0..rounds {
        cache.set(format!("evict-{i}").as_bytes(), &value)?;
        ensure!(
            cache.space_used() <= cache.memory_budget(),
            "memory budget exceeded after set {i}"
        );
    }

    let last = format!("evict-{}", rounds - 1);
    ensure!(
        cache.get(last.as_bytes()).is_ok(),
        "most recent entry was evicted"
    );
    info!(
        "Eviction round passed: {} evictions, {} entries resident",
        cache.stats().evictions,
        cache.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytecache::config::DEFAULT_MEMORY_BUDGET;

    fn run_workload(budget: u64) {
        let mut cache = CacheStore::new(budget);
        set_get_round(&mut cache).unwrap();
        eviction_round(&mut cache).unwrap();
        cache.check_invariants();
        cache.destroy();
    }

    #[test]
    fn test_workload_with_zero_budget() {
        run_workload(0);
    }

    #[test]
    fn test_workload_with_budget_below_pairs() {
        run_workload(2);
    }

    #[test]
    fn test_workload_with_exact_pair_budget() {
        run_workload(4);
    }

    #[test]
    fn test_workload_with_default_budget() {
        let mut cache = CacheStore::new(DEFAULT_MEMORY_BUDGET);
        set_get_round(&mut cache).unwrap();
        eviction_round(&mut cache).unwrap();
        assert_eq!(cache.len(), 16);
        assert_eq!(cache.space_used(), DEFAULT_MEMORY_BUDGET);
        assert!(cache.get(&[1]).is_err());
        cache.destroy();
    }
}
