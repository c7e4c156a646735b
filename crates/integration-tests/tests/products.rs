//! Integration tests for optimistic product, stock and visibility mutations.
//!
//! Each test drives the services through a `Dashboard` over the in-memory
//! store and checks both what reached the store and what the cache shows.

#![allow(clippy::unwrap_used)]

use kiosk_admin::{
    ClientError, Dashboard, DashboardEvent, NotificationLevel, Section,
};
use kiosk_admin_core::{KioskId, ProductDraft, ProductId};
use kiosk_admin_integration_tests::{Call, FakeStore, Op, product, shared, test_config};
use rust_decimal::Decimal;
use tokio::sync::broadcast;

const KIOSK: KioskId = KioskId::new(1);

fn drain(rx: &mut broadcast::Receiver<DashboardEvent>) -> Vec<DashboardEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn error_notifications(events: &[DashboardEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DashboardEvent::Notification(n) if n.level == NotificationLevel::Error))
        .count()
}

async fn inventory_dashboard(store: FakeStore) -> (std::sync::Arc<FakeStore>, Dashboard) {
    let (fake, store) = shared(store);
    let mut dashboard = Dashboard::with_store(store, &test_config()).unwrap();
    dashboard.select(Some(KIOSK), Section::Inventory).unwrap();
    dashboard.load().await.unwrap();
    (fake, dashboard)
}

fn espresso_and_kafe() -> FakeStore {
    FakeStore::new(vec![
        product(1, "Espresso", 45, true, 5),
        product(2, "Kafe", 30, false, 3),
    ])
}

fn server_error() -> ClientError {
    ClientError::Api {
        status: 500,
        message: "Internal Server Error".to_string(),
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_invalid_draft_never_reaches_store() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    let before = fake.calls().len();

    let err = dashboard
        .products()
        .create_product(ProductDraft::new("  ", Decimal::ZERO))
        .await
        .unwrap_err();

    let ClientError::Validation(errors) = err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.for_field("name").is_some());
    assert!(errors.for_field("price").is_some());
    assert_eq!(fake.calls().len(), before);
}

#[tokio::test]
async fn test_create_adds_server_product_and_revalidates() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;

    let created = dashboard
        .products()
        .create_product(ProductDraft::new("Latte", Decimal::new(55, 0)).description("Mléčná"))
        .await
        .unwrap();

    assert_eq!(created.id, ProductId::new(3));
    assert_eq!(fake.count(Op::CreateProduct), 1);
    assert_eq!(fake.count(Op::ListInventory), 2);
    assert!(dashboard.cache().products().iter().any(|p| p.id == created.id));
}

// =============================================================================
// Update / Delete
// =============================================================================

#[tokio::test]
async fn test_rejected_delete_restores_identical_product() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    let original = dashboard.cache().products()[1].clone();
    let mut events = dashboard.bus().subscribe();
    fake.fail(Op::DeleteProduct, server_error());

    let err = dashboard
        .products()
        .delete_product(ProductId::new(2))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    let restored = dashboard
        .cache()
        .products()
        .iter()
        .find(|p| p.id == ProductId::new(2))
        .cloned();
    assert_eq!(restored, Some(original));
    assert_eq!(error_notifications(&drain(&mut events)), 1);
}

#[tokio::test]
async fn test_successful_delete_removes_product() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;

    dashboard
        .products()
        .delete_product(ProductId::new(2))
        .await
        .unwrap();

    assert_eq!(fake.products().len(), 1);
    let ids: Vec<_> = dashboard.cache().products().iter().map(|p| p.id).collect();
    assert_eq!(ids, [ProductId::new(1)]);
}

#[tokio::test]
async fn test_rejected_update_rolls_back() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    fake.fail(Op::UpdateProduct, server_error());

    let result = dashboard
        .products()
        .update_product(ProductId::new(1), ProductDraft::new("Ristretto", Decimal::new(50, 0)))
        .await;

    assert!(result.is_err());
    let cached = dashboard.cache().products()[0].clone();
    assert_eq!(cached.name, "Espresso");
    assert_eq!(cached.price, Decimal::new(45, 0));
}

#[tokio::test]
async fn test_update_keeps_kiosk_state() {
    let (_fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;

    let updated = dashboard
        .products()
        .update_product(ProductId::new(1), ProductDraft::new("Ristretto", Decimal::new(50, 0)))
        .await
        .unwrap();

    assert_eq!(updated.name, "Ristretto");
    assert_eq!(updated.quantity_in_stock, 5);
    assert!(updated.active);
}

// =============================================================================
// Stock and visibility
// =============================================================================

#[tokio::test]
async fn test_zero_stock_hides_product_with_one_visibility_call() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    let mut events = dashboard.bus().subscribe();
    // Changed by another admin since the list was loaded.
    fake.set_products(vec![
        product(1, "Espresso", 45, true, 5),
        product(2, "Kafe", 30, false, 7),
    ]);

    dashboard
        .products()
        .update_stock(ProductId::new(1), KIOSK, 0)
        .await
        .unwrap();

    let visibility_calls: Vec<_> = fake
        .calls()
        .into_iter()
        .filter(|c| c.op() == Op::SetVisibility)
        .collect();
    assert_eq!(
        visibility_calls,
        [Call::SetVisibility {
            product: ProductId::new(1),
            kiosk: KIOSK,
            visible: false,
        }]
    );

    let events = drain(&mut events);
    assert!(events.contains(&DashboardEvent::AdminRefreshRequested));

    let cached = dashboard.cache().products()[0].clone();
    assert_eq!(cached.quantity_in_stock, 0);
    assert!(!cached.active);

    assert_eq!(fake.count(Op::ListInventory), 2);
    assert_eq!(*dashboard.cache().products(), fake.products());
    assert_eq!(dashboard.cache().products()[1].quantity_in_stock, 7);
}

#[tokio::test]
async fn test_nonzero_stock_does_not_touch_visibility() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    let mut events = dashboard.bus().subscribe();

    dashboard
        .products()
        .update_stock(ProductId::new(2), KIOSK, 12)
        .await
        .unwrap();

    assert_eq!(fake.count(Op::SetVisibility), 0);
    assert!(!drain(&mut events).contains(&DashboardEvent::AdminRefreshRequested));
    assert_eq!(dashboard.cache().products()[1].quantity_in_stock, 12);
}

#[tokio::test]
async fn test_rejected_stock_update_rolls_back_and_skips_visibility() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    fake.fail(Op::UpdateStock, server_error());

    let result = dashboard
        .products()
        .update_stock(ProductId::new(1), KIOSK, 0)
        .await;

    assert!(result.is_err());
    assert_eq!(fake.count(Op::SetVisibility), 0);
    let cached = dashboard.cache().products()[0].clone();
    assert_eq!(cached.quantity_in_stock, 5);
    assert!(cached.active);
}

#[tokio::test]
async fn test_rejected_visibility_rolls_back() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;
    fake.fail(Op::SetVisibility, ClientError::Network("offline".to_string()));

    let result = dashboard
        .products()
        .set_visibility(ProductId::new(2), KIOSK, true)
        .await;

    assert!(matches!(result, Err(ClientError::Network(_))));
    assert!(!dashboard.cache().products()[1].active);
}

#[tokio::test]
async fn test_visibility_change_reaches_cache() {
    let (fake, dashboard) = inventory_dashboard(espresso_and_kafe()).await;

    dashboard
        .products()
        .set_visibility(ProductId::new(2), KIOSK, true)
        .await
        .unwrap();

    assert!(fake.products()[1].active);
    assert!(dashboard.cache().products()[1].is_visible());
}
