//! Integration tests for the product cache: dedupe and stale responses.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use kiosk_admin::{CacheKey, ClientError, ProductCache, RefreshTrigger};
use kiosk_admin_core::{KioskId, ProductId};
use kiosk_admin_integration_tests::{FakeStore, Op, product, shared};

fn cache_for(store: FakeStore, key: CacheKey) -> (Arc<FakeStore>, ProductCache) {
    let (fake, store) = shared(store);
    (fake, ProductCache::new(store, key, Duration::from_secs(2)))
}

fn names(cache: &ProductCache) -> Vec<String> {
    cache.products().iter().map(|p| p.name.clone()).collect()
}

// =============================================================================
// Dedupe
// =============================================================================

#[tokio::test]
async fn test_concurrent_refreshes_share_one_request() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::products(None),
    );
    fake.hold_reads();

    let joined = tokio::spawn({
        let cache = cache.clone();
        async move {
            futures::future::join_all([
                cache.refresh(RefreshTrigger::Focus),
                cache.refresh(RefreshTrigger::Reconnect),
                cache.refresh(RefreshTrigger::Interval),
            ])
            .await
        }
    });

    fake.wait_for(Op::ListProducts, 1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    fake.release_reads();

    let results = joined.await.unwrap();
    assert_eq!(results.len(), 3);
    for result in results {
        assert_eq!(result.unwrap().len(), 1);
    }
    assert_eq!(fake.count(Op::ListProducts), 1);
    assert_eq!(names(&cache), ["Espresso"]);
}

#[tokio::test]
async fn test_forced_revalidation_bypasses_dedupe() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::products(None),
    );

    cache.refresh(RefreshTrigger::Interval).await.unwrap();
    cache.refresh(RefreshTrigger::Focus).await.unwrap();
    assert_eq!(fake.count(Op::ListProducts), 1);

    fake.set_products(vec![product(1, "Espresso", 45, true, 0)]);
    cache.revalidate().await.unwrap();
    assert_eq!(fake.count(Op::ListProducts), 2);
    assert_eq!(cache.products()[0].quantity_in_stock, 0);
}

#[tokio::test]
async fn test_dedupe_window_expires() {
    let (fake, store) = shared(FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]));
    let cache = ProductCache::new(store, CacheKey::products(None), Duration::from_millis(50));

    cache.refresh(RefreshTrigger::Interval).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    cache.refresh(RefreshTrigger::Interval).await.unwrap();

    assert_eq!(fake.count(Op::ListProducts), 2);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_fetch_keeps_list_and_records_error() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::inventory(KioskId::new(1)),
    );
    cache.fetch().await.unwrap();

    fake.fail(Op::ListInventory, ClientError::Network("offline".to_string()));
    assert!(cache.fetch().await.is_err());
    assert_eq!(names(&cache), ["Espresso"]);
    assert!(matches!(cache.error(), Some(ClientError::Network(_))));

    fake.clear_failures();
    cache.fetch().await.unwrap();
    assert!(cache.error().is_none());
}

#[tokio::test]
async fn test_joined_callers_all_see_the_error() {
    let (fake, cache) = cache_for(FakeStore::default(), CacheKey::products(None));
    fake.fail(
        Op::ListProducts,
        ClientError::Api {
            status: 503,
            message: "Service Unavailable".to_string(),
        },
    );

    let (a, b) = tokio::join!(
        cache.refresh(RefreshTrigger::Focus),
        cache.refresh(RefreshTrigger::Reconnect)
    );
    assert!(matches!(a, Err(ClientError::Api { status: 503, .. })));
    assert!(matches!(b, Err(ClientError::Api { status: 503, .. })));
}

// =============================================================================
// Stale responses
// =============================================================================

#[tokio::test]
async fn test_response_for_previous_kiosk_is_discarded() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::inventory(KioskId::new(1)),
    );
    fake.hold_reads();

    let pending = tokio::spawn({
        let cache = cache.clone();
        async move { cache.fetch().await }
    });
    fake.wait_for(Op::ListInventory, 1).await;

    cache.set_key(CacheKey::inventory(KioskId::new(2)));
    fake.release_reads();
    pending.await.unwrap().unwrap();

    assert!(cache.products().is_empty());

    fake.set_products(vec![product(7, "Čaj", 25, true, 9)]);
    cache.fetch().await.unwrap();
    assert_eq!(names(&cache), ["Čaj"]);
}

#[tokio::test]
async fn test_response_older_than_local_mutation_is_discarded() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![
            product(1, "Espresso", 45, true, 5),
            product(2, "Kafe", 30, false, 3),
        ]),
        CacheKey::inventory(KioskId::new(1)),
    );
    cache.fetch().await.unwrap();
    fake.hold_reads();

    let pending = tokio::spawn({
        let cache = cache.clone();
        async move { cache.fetch().await }
    });
    fake.wait_for(Op::ListInventory, 2).await;

    cache.remove_optimistic(ProductId::new(2));
    fake.release_reads();
    pending.await.unwrap().unwrap();

    assert_eq!(names(&cache), ["Espresso"]);
}

#[tokio::test]
async fn test_older_request_landing_last_is_discarded() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::products(None),
    );
    fake.hold_reads();

    let slow = tokio::spawn({
        let cache = cache.clone();
        async move { cache.fetch().await }
    });
    fake.wait_for(Op::ListProducts, 1).await;

    // The newer request sees the updated list and lands first.
    fake.set_products(vec![product(1, "Espresso", 45, true, 0)]);
    fake.release_reads();
    cache.fetch().await.unwrap();
    slow.await.unwrap().unwrap();

    assert_eq!(cache.products()[0].quantity_in_stock, 0);
}

#[tokio::test]
async fn test_refresh_discarded_by_switching_away_and_back_is_retried() {
    let (fake, cache) = cache_for(
        FakeStore::new(vec![product(1, "Espresso", 45, true, 5)]),
        CacheKey::inventory(KioskId::new(1)),
    );
    fake.hold_reads();

    let pending = tokio::spawn({
        let cache = cache.clone();
        async move { cache.refresh(RefreshTrigger::Focus).await }
    });
    fake.wait_for(Op::ListInventory, 1).await;

    cache.set_key(CacheKey::inventory(KioskId::new(2)));
    cache.set_key(CacheKey::inventory(KioskId::new(1)));
    fake.release_reads();
    pending.await.unwrap().unwrap();
    assert!(cache.products().is_empty());

    let rows = cache.refresh(RefreshTrigger::Focus).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(names(&cache), ["Espresso"]);
    assert!(cache.snapshot().is_loaded());
    assert_eq!(fake.count(Op::ListInventory), 2);
}
