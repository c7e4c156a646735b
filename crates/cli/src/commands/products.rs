//! Product, stock and visibility commands.

use kiosk_admin::{ClientResult, Dashboard, DashboardEvent, Section};
use kiosk_admin_core::{KioskId, ProductDraft, ProductId, SortConfiguration};
use rust_decimal::Decimal;
use tokio::sync::broadcast::error::RecvError;

use super::table;

pub fn draft(
    name: String,
    price: Decimal,
    description: Option<String>,
    image: Option<String>,
) -> ProductDraft {
    let mut draft = ProductDraft::new(name, price);
    if let Some(description) = description {
        draft = draft.description(description);
    }
    if let Some(image) = image {
        draft = draft.image(image);
    }
    draft
}

fn print_table(dashboard: &Dashboard) {
    let view = dashboard.view();
    let rendered = table::products(&dashboard.rows(), view.widths(), view.sort());
    #[allow(clippy::print_stdout)]
    {
        print!("{rendered}");
    }
}

fn select(
    dashboard: &mut Dashboard,
    kiosk: Option<KioskId>,
    section: Section,
    sort: Option<SortConfiguration>,
) -> ClientResult<()> {
    dashboard.select(kiosk, section)?;
    if let Some(sort) = sort {
        dashboard.view_mut().replace_sort(sort);
    }
    Ok(())
}

/// Print the catalogue, or a kiosk's inventory, in display order.
pub async fn list(
    dashboard: &mut Dashboard,
    kiosk: Option<KioskId>,
    inventory: bool,
    sort: Option<SortConfiguration>,
) -> ClientResult<()> {
    let section = if inventory {
        Section::Inventory
    } else {
        Section::Products
    };
    select(dashboard, kiosk, section, sort)?;
    dashboard.load().await?;
    print_table(dashboard);
    Ok(())
}

pub async fn create(dashboard: &Dashboard, draft: ProductDraft) -> ClientResult<()> {
    let product = dashboard.products().create_product(draft).await?;
    tracing::info!("Created product {} with id {}", product.name, product.id);
    Ok(())
}

pub async fn update(dashboard: &Dashboard, id: ProductId, draft: ProductDraft) -> ClientResult<()> {
    dashboard.load().await?;
    let product = dashboard.products().update_product(id, draft).await?;
    tracing::info!("Updated product {}", product.id);
    Ok(())
}

pub async fn delete(dashboard: &Dashboard, id: ProductId) -> ClientResult<()> {
    dashboard.load().await?;
    dashboard.products().delete_product(id).await?;
    tracing::info!("Deleted product {id}");
    Ok(())
}

/// Set stock and print the kiosk's inventory afterwards.
pub async fn set_stock(
    dashboard: &mut Dashboard,
    product: ProductId,
    kiosk: KioskId,
    quantity: u32,
) -> ClientResult<()> {
    select(dashboard, Some(kiosk), Section::Inventory, None)?;
    dashboard.load().await?;
    dashboard
        .products()
        .update_stock(product, kiosk, quantity)
        .await?;
    print_table(dashboard);
    Ok(())
}

pub async fn set_visibility(
    dashboard: &mut Dashboard,
    product: ProductId,
    kiosk: KioskId,
    visible: bool,
) -> ClientResult<()> {
    select(dashboard, Some(kiosk), Section::Inventory, None)?;
    dashboard.load().await?;
    dashboard
        .products()
        .set_visibility(product, kiosk, visible)
        .await?;
    print_table(dashboard);
    Ok(())
}

/// Reprint a kiosk's inventory whenever it changes, until Ctrl-C.
pub async fn watch(
    dashboard: &mut Dashboard,
    kiosk: KioskId,
    sort: Option<SortConfiguration>,
) -> ClientResult<()> {
    select(dashboard, Some(kiosk), Section::Inventory, sort)?;
    dashboard.load().await?;
    let mut events = dashboard.bus().subscribe();
    dashboard.start_revalidation();
    print_table(dashboard);

    let mut last = dashboard.cache().products();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch");
                break;
            }
            event = events.recv() => match event {
                Ok(DashboardEvent::ProductsRefreshed(_)) | Err(RecvError::Lagged(_)) => {
                    let current = dashboard.cache().products();
                    if current != last {
                        print_table(dashboard);
                        last = current;
                    }
                }
                Ok(DashboardEvent::Notification(n)) => {
                    tracing::info!(level = %n.level, "{}", n.message);
                }
                Ok(_) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    dashboard.stop_revalidation();
    Ok(())
}
