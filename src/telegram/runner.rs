//! Update delivery: long polling or webhook, both feeding [`MangiBot::submit`]

use std::net::SocketAddr;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;
use teloxide::types::Update;
use url::Url;

use super::convert::inbound_update;
use crate::core::error::{AppError, AppResult, HandlerError};
use crate::pipeline::Bot as MangiBot;

fn schema() -> UpdateHandler<HandlerError> {
    dptree::entry().endpoint(|update: Update, mangi: MangiBot| async move {
        match inbound_update(&update) {
            // Ordering is kept by the sequencer; completion is not awaited here.
            Some(inbound) => {
                let _ = mangi.submit(inbound).await;
            }
            None => log::trace!("Ignoring update {:?}", update.id),
        }
        Ok(())
    })
}

/// Long polling until Ctrl-C
pub async fn run_polling(bot: Bot, mangi: MangiBot) {
    log::info!("Starting @{} in polling mode", mangi.identity());
    if let Err(e) = bot.delete_webhook().await {
        log::warn!("Failed to delete webhook before polling: {}", e);
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![mangi])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
}

/// Serves the webhook on `listen` and registers `url` with Telegram
pub async fn run_webhook(bot: Bot, mangi: MangiBot, listen: SocketAddr, url: &str) -> AppResult<()> {
    let url = Url::parse(url).map_err(|e| AppError::Transport(format!("invalid webhook url '{}': {}", url, e)))?;
    log::info!("Starting @{} in webhook mode at {} (listening on {})", mangi.identity(), url, listen);

    let listener = webhooks::axum(bot.clone(), webhooks::Options::new(listen, url)).await?;

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![mangi])
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
