//! Kiosk commands.

use kiosk_admin::{ClientResult, Dashboard};
use kiosk_admin_core::{KioskDraft, KioskId};

use super::table;

fn draft(name: String, location: String, description: Option<String>) -> KioskDraft {
    let draft = KioskDraft::new(name, location);
    match description {
        Some(description) => draft.description(description),
        None => draft,
    }
}

pub async fn list(dashboard: &Dashboard, all: bool) -> ClientResult<()> {
    let kiosks = if all {
        dashboard.kiosks().list().await?
    } else {
        dashboard.kiosks().list_active().await?
    };
    let rendered = table::kiosks(&kiosks);
    #[allow(clippy::print_stdout)]
    {
        print!("{rendered}");
    }
    Ok(())
}

pub async fn create(
    dashboard: &Dashboard,
    name: String,
    location: String,
    description: Option<String>,
) -> ClientResult<()> {
    let message = dashboard
        .kiosks()
        .create(draft(name, location, description))
        .await?;
    tracing::info!("{}", if message.is_empty() { "Kiosk created" } else { &message });
    Ok(())
}

pub async fn update(
    dashboard: &Dashboard,
    id: KioskId,
    name: String,
    location: String,
    description: Option<String>,
) -> ClientResult<()> {
    dashboard
        .kiosks()
        .update(id, draft(name, location, description))
        .await?;
    tracing::info!("Updated kiosk {id}");
    Ok(())
}

pub async fn deactivate(dashboard: &Dashboard, id: KioskId) -> ClientResult<()> {
    dashboard.kiosks().deactivate(id).await?;
    tracing::info!("Deactivated kiosk {id}");
    Ok(())
}
