pub mod convert;
pub mod currencies;
pub mod favorite;
pub mod rates;
pub mod setup;
pub mod ui;

use crate::repository::RepositoryEvent;
use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Waits for a background refresh and drains the events it produced.
pub(crate) async fn settle(
    refresh: JoinHandle<()>,
    events: &mut UnboundedReceiver<RepositoryEvent>,
    message: &str,
) -> Result<Vec<RepositoryEvent>> {
    let spinner = ui::new_spinner(message);
    let joined = refresh.await;
    spinner.finish_and_clear();
    joined.context("Refresh task failed")?;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    Ok(received)
}
