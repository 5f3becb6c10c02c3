use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use super::Context;
use crate::core::error::HandlerResult;

/// User logic run for a matched update
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context) -> HandlerResult;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync,
{
    async fn handle(&self, ctx: &mut Context) -> HandlerResult {
        (self.0)(ctx).await
    }
}

/// Wraps a closure returning a boxed future as a [`Handler`]
///
/// ```no_run
/// use mangibot::dispatch::handler_fn;
///
/// let hello = handler_fn(|ctx| {
///     Box::pin(async move {
///         ctx.reply("Hello!").await?;
///         Ok(())
///     })
/// });
/// ```
pub fn handler_fn<F>(f: F) -> Arc<dyn Handler>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}
