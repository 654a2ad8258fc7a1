//! Long-polling bot runner.
//!
//! Pulls updates from `getUpdates` and hands every message to a
//! [`DeliveryAdapter`] on its own Tokio task, so a slow conversion only
//! holds up the chat that sent it. Tasks share nothing but the adapter's
//! `Arc`'d transport; each document gets its own staging directory.

use crate::adapter::DeliveryAdapter;
use crate::config::BotConfig;
use crate::error::Doc2PdfError;
use crate::transport::telegram::{TelegramTransport, Update};
use crate::transport::{InboundMessage, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run the bot until Ctrl-C.
///
/// Poll failures are logged and retried after
/// [`BotConfig::poll_retry_delay_ms`]; they never stop the loop.
pub async fn run(config: BotConfig) -> Result<(), Doc2PdfError> {
    let transport = Arc::new(TelegramTransport::from_config(&config)?);
    let adapter = DeliveryAdapter::new(Arc::clone(&transport), config.adapter.clone());

    info!(
        "Bot launched (converter: {}, API: {})",
        config.adapter.converter.program, config.api_base_url
    );

    let mut offset: Option<i64> = None;
    let retry_delay = Duration::from_millis(config.poll_retry_delay_ms);

    loop {
        let poll = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                return Ok(());
            }
            poll = transport.get_updates(offset, config.poll_timeout_secs) => poll,
        };

        match poll {
            Ok(updates) => {
                debug!("Received {} updates", updates.len());
                offset = next_offset(offset, &updates);
                for msg in updates.into_iter().filter_map(|u| u.message) {
                    dispatch(&adapter, msg.into());
                }
            }
            Err(e) => {
                warn!("getUpdates failed: {}; retrying in {:?}", e, retry_delay);
                tokio::time::sleep(retry_delay).await;
            }
        }
    }
}

/// Handle `msg` on a fresh task.
pub fn dispatch<T>(adapter: &DeliveryAdapter<T>, msg: InboundMessage) -> tokio::task::JoinHandle<()>
where
    T: Transport + ?Sized + 'static,
{
    let adapter = adapter.clone();
    tokio::spawn(async move { adapter.handle(&msg).await })
}

/// Offset acknowledging every update in `updates`.
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: i64) -> Update {
        Update {
            update_id: id,
            message: None,
        }
    }

    #[test]
    fn offset_advances_past_highest_update() {
        assert_eq!(next_offset(None, &[update(5), update(7), update(6)]), Some(8));
    }

    #[test]
    fn offset_unchanged_without_updates() {
        assert_eq!(next_offset(Some(3), &[]), Some(3));
        assert_eq!(next_offset(None, &[]), None);
    }

    #[test]
    fn offset_never_moves_backwards() {
        assert_eq!(next_offset(Some(10), &[update(2)]), Some(10));
    }
}
