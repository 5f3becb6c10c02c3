use std::sync::Arc;

use anyhow::{Context as _, Result};
use dotenvy::dotenv;
use serde_json::json;
use teloxide::prelude::*;

use mangibot::cli::{Cli, Commands};
use mangibot::core::{init_logger, BotConfig, BotIdentity, DeliveryMode, FeatureSet};
use mangibot::dispatch::{handler_fn, predicate, Command};
use mangibot::pipeline::BotBuilder;
use mangibot::storage::{KvStore, RedisStore};
use mangibot::telegram::{run_polling, run_webhook, TeloxideTransport};
use mangibot::transport::Button;

/// Main entry point for the bot
///
/// Parses CLI arguments and dispatches to the selected subcommand.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = BotConfig::load(&cli.config).with_context(|| format!("loading {}", cli.config.display()))?;
    init_logger(config.dev_mode)?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            check_config(&config);
            Ok(())
        }
        Some(Commands::Run { webhook }) => run_bot(config, webhook).await,
        None => run_bot(config, false).await,
    }
}

fn check_config(config: &BotConfig) {
    let features = config.features();
    log::info!("Delivery: {:?}", config.delivery);
    log::info!("Redis: {}", config.redis_url);
    log::info!("Token auth: {} (enabled: {})", features.auth_mode, features.token_auth_enabled());
    log::info!(
        "Admin approval: {} ({} admin(s))",
        features.admin_approval,
        features.admin_ids.len()
    );
    log::info!("Dev mode: {}", features.dev_mode);
    if config.bot_token.is_none() {
        log::warn!("bot_token is not set; `run` will fail");
    }
}

async fn run_bot(config: BotConfig, force_webhook: bool) -> Result<()> {
    let token = config
        .bot_token
        .clone()
        .context("bot_token is not configured (set MANGI_BOT_TOKEN)")?;
    let features = config.features();

    let store = Arc::new(RedisStore::connect(&config.redis_url).await?);

    let bot = Bot::new(token);
    let identity = match &config.bot_username {
        Some(username) => BotIdentity::new(username.clone()),
        None => {
            let me = bot.get_me().await?;
            BotIdentity::new(me.user.username.clone().unwrap_or_default())
        }
    };
    log::info!("Running as @{}", identity);

    let kv: Arc<dyn KvStore> = store.clone();
    let transport = Arc::new(TeloxideTransport::new(bot.clone()));
    let mangi = demo_handlers(BotBuilder::new(identity, kv, transport, features.clone()), &features).build();
    mangi.publish_command_menu().await;

    let webhook = force_webhook || config.delivery == DeliveryMode::Webhook;
    let result = if webhook {
        match config.webhook_url.as_deref() {
            Some(url) => run_webhook(bot, mangi, config.webhook_listen, url).await,
            None => {
                log::error!("Webhook delivery requested but webhook_url is not set; falling back to polling");
                run_polling(bot, mangi).await;
                Ok(())
            }
        }
    } else {
        run_polling(bot, mangi).await;
        Ok(())
    };

    store.disconnect().await;
    result.map_err(Into::into)
}

/// Sample handlers shipped with the binary
fn demo_handlers(builder: BotBuilder, features: &FeatureSet) -> BotBuilder {
    let whoami = Command::new("whoami")
        .description("Show what the bot knows about you")
        .handler(handler_fn(|ctx| {
            Box::pin(async move {
                let sender = ctx.sender().clone();
                let verified = if ctx.session.token.is_some() { "yes" } else { "no" };
                ctx.reply(format!(
                    "User {} (@{}), chat {}, token: {}",
                    sender.id,
                    sender.handle(),
                    ctx.chat_id(),
                    verified
                ))
                .await?;
                Ok(())
            })
        }));
    let whoami = if features.token_auth_enabled() {
        whoami.requires_auth()
    } else {
        whoami
    };

    let builder = builder
        .command(
            Command::new("start")
                .description("Start the bot")
                .reply("Welcome! Press the button below.")
                .buttons(vec![vec![Button::callback("Say hi!", "say_hi")]])
                .handler(handler_fn(|ctx| {
                    Box::pin(async move {
                        if ctx.get_custom("stats.visits").is_none() {
                            ctx.set_custom("stats.visits", 0).await;
                        }
                        let visits = ctx.get_custom("stats.visits").and_then(|v| v.as_i64()).unwrap_or(0);
                        ctx.update_custom([("stats.visits", json!(visits + 1))]).await;
                        Ok(())
                    })
                })),
        )
        .command(whoami)
        .on_callback(
            predicate::callback_eq("say_hi"),
            handler_fn(|ctx| {
                Box::pin(async move {
                    let name = ctx.sender().first_name.clone();
                    ctx.answer_callback(Some("Hi!"), false).await?;
                    ctx.reply(format!("Hi, {}!", name)).await?;
                    Ok(())
                })
            }),
        );

    if features.token_auth_enabled() {
        builder.on_message_with_auth(
            predicate::text_contains("secure"),
            handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.reply("This conversation holds a verified token.").await?;
                    Ok(())
                })
            }),
        )
    } else {
        builder
    }
}
