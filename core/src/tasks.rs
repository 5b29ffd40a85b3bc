//! # Ordered task fan-out
//!
//! [`concurrent_map`] launches one tokio task per input element and collects
//! results positionally, so callers always get input order back regardless
//! of completion order. [`async_map`] is the strictly sequential sibling,
//! used here to drain the spawned handles without adding a second layer of
//! parallelism.

use std::future::Future;

use anyhow::Context;
use tokio::task::JoinHandle;

/// Applies `transform` to every item in turn, preserving order.
///
/// The first failing transform aborts the remainder.
pub async fn async_map<T, U, F, Fut>(
    items: impl IntoIterator<Item = T>,
    mut transform: F,
) -> anyhow::Result<Vec<U>>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = anyhow::Result<U>>,
{
    let mut results = Vec::new();
    for item in items {
        results.push(transform(item).await?);
    }
    Ok(results)
}

/// Applies `transform` to every item on its own tokio task.
///
/// Every task is spawned before any result is awaited, and results land in
/// input order, never completion order. A failing transform fails the whole
/// call; a panicked or cancelled worker surfaces as a task-infrastructure
/// error, distinct from transform failures.
pub async fn concurrent_map<T, U, F, Fut>(
    items: impl IntoIterator<Item = T>,
    transform: F,
) -> anyhow::Result<Vec<U>>
where
    F: Fn(T) -> Fut,
    U: Send + 'static,
    Fut: Future<Output = anyhow::Result<U>> + Send + 'static,
{
    let handles: Vec<JoinHandle<anyhow::Result<U>>> = items
        .into_iter()
        .map(|item| tokio::spawn(transform(item)))
        .collect();

    async_map(handles, |handle| async move {
        handle.await.context("concurrent worker panicked or was cancelled")?
    })
    .await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
