//! The idempotent installer runner.
//!
//! `ensure_installed` is the one routine every provisioning step goes
//! through: probe for the tool, and only when it is absent run the
//! fetch-and-install action. Re-running a finished provisioning pass is a
//! no-op beyond the presence checks.

pub mod catalog;

use std::future::Future;

use crate::error::Result;

/// What `ensure_installed` did for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The presence check reported the tool usable; nothing was touched.
    Skipped,
    /// The fetch-and-install action ran to completion.
    Installed,
}

/// Install `tool` unless it is already present.
///
/// The presence predicate runs first; when it reports true the function
/// returns immediately with no side effects. Otherwise the action is
/// invoked exactly once. Any failure from the predicate or the action
/// propagates to the caller and aborts the provisioning run; there are no
/// retries.
pub async fn ensure_installed<P, F, Fut>(
    tool: &str,
    is_present: P,
    fetch_and_install: F,
) -> Result<InstallOutcome>
where
    P: FnOnce() -> Result<bool>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if is_present()? {
        tracing::info!("{} is already installed, skipping", tool);
        return Ok(InstallOutcome::Skipped);
    }

    tracing::info!("installing {}", tool);
    fetch_and_install().await?;
    Ok(InstallOutcome::Installed)
}
