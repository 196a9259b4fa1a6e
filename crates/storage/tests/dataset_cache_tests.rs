use std::sync::Arc;

use chrono::NaiveDate;

use forecast_common::{ForecastCycle, GridAxes, RunHour};
use forecast_source::{MemoryDataset, MemoryProvider};
use storage::{DatasetCache, EvictionPolicy};
use test_utils::axis;

fn cycle(day: u32, hour: RunHour) -> ForecastCycle {
    ForecastCycle::new(NaiveDate::from_ymd_opt(2025, 7, day).unwrap(), hour)
}

fn dataset(cycle: ForecastCycle) -> MemoryDataset {
    let axes = GridAxes::new(vec![cycle.reference_time()], axis(-2.5, 0.25, 7), axis(114.0, 0.25, 7));
    MemoryDataset::new(cycle, axes).with_generated("tmp2m", |_, _, _| 300.0)
}

fn provider(cycles: &[ForecastCycle]) -> Arc<MemoryProvider> {
    let provider = cycles
        .iter()
        .fold(MemoryProvider::new(), |p, c| p.with_dataset(dataset(*c)));
    Arc::new(provider)
}

#[tokio::test]
async fn test_second_request_is_a_hit() {
    let c = cycle(13, RunHour::Z00);
    let provider = provider(&[c]);
    let cache = DatasetCache::new(provider.clone(), EvictionPolicy::Never);

    let first = cache.get_or_open(c).await.unwrap();
    let second = cache.get_or_open(c).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.open_count(), 1);

    let stats = cache.stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn test_failed_open_is_not_cached() {
    let provider = provider(&[]);
    let cache = DatasetCache::new(provider.clone(), EvictionPolicy::Never);
    let c = cycle(13, RunHour::Z06);

    let err = cache.get_or_open(c).await.err().unwrap();
    assert_eq!(err.kind(), "SourceUnavailable");
    assert!(cache.get_or_open(c).await.is_err());

    // Both attempts reached the provider.
    assert_eq!(provider.open_count(), 2);
    let stats = cache.stats().await;
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.entries, 0);
    assert!(!cache.contains(&c).await);
}

#[tokio::test]
async fn test_never_policy_keeps_everything() {
    let cycles: Vec<_> = (10..20).map(|d| cycle(d, RunHour::Z00)).collect();
    let cache = DatasetCache::new(provider(&cycles), EvictionPolicy::Never);
    for c in &cycles {
        cache.get_or_open(*c).await.unwrap();
    }
    let stats = cache.stats().await;
    assert_eq!(stats.entries, 10);
    assert_eq!(stats.evictions, 0);
}

#[tokio::test]
async fn test_lru_policy_evicts_least_recent() {
    let a = cycle(13, RunHour::Z00);
    let b = cycle(13, RunHour::Z06);
    let c = cycle(13, RunHour::Z12);
    let provider = provider(&[a, b, c]);
    let cache = DatasetCache::new(provider.clone(), EvictionPolicy::Lru { capacity: 2 });

    cache.get_or_open(a).await.unwrap();
    cache.get_or_open(b).await.unwrap();
    cache.get_or_open(a).await.unwrap(); // a is now most recent
    cache.get_or_open(c).await.unwrap(); // evicts b

    assert!(cache.contains(&a).await);
    assert!(!cache.contains(&b).await);
    assert!(cache.contains(&c).await);
    assert_eq!(cache.stats().await.evictions, 1);

    cache.get_or_open(b).await.unwrap();
    assert_eq!(provider.open_count(), 4);
}

#[tokio::test]
async fn test_concurrent_requests_open_once() {
    let c = cycle(13, RunHour::Z18);
    let provider = provider(&[c]);
    let cache = Arc::new(DatasetCache::new(provider.clone(), EvictionPolicy::Never));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_open(c).await.is_ok() })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap());
    }
    assert_eq!(provider.open_count(), 1);
}

#[tokio::test]
async fn test_clear() {
    let c = cycle(13, RunHour::Z00);
    let provider = provider(&[c]);
    let cache = DatasetCache::new(provider.clone(), EvictionPolicy::Never);
    cache.get_or_open(c).await.unwrap();
    cache.clear().await;
    assert_eq!(cache.stats().await.entries, 0);
    cache.get_or_open(c).await.unwrap();
    assert_eq!(provider.open_count(), 2);
}
