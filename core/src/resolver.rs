//! # Batched DNS resolution
//!
//! Resolves a sequence of optional endpoints while preserving positional
//! order. Entries resolve concurrently, each one succeeds or fails on its
//! own, and a failure never aborts its siblings. When a name answers with
//! both families, V4 wins.

use std::net::{IpAddr, ToSocketAddrs};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use netatlas_common::network::endpoint::{Endpoint, Host};

use crate::tasks;

/// Sentinel code for a lookup that reported success but produced no address
/// of either family.
pub const CODE_NO_DATA: i32 = -1;
/// Sentinel code for resolver failures the OS did not attach a code to.
pub const CODE_UNKNOWN: i32 = -2;

/// A failed name resolution: the OS resolver code plus the name attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to resolve {name}: {}", describe(.code))]
pub struct DnsResolutionError {
    pub code: i32,
    pub name: String,
}

impl DnsResolutionError {
    pub fn new(code: i32, name: impl Into<String>) -> Self {
        Self { code, name: name.into() }
    }
}

fn describe(code: &i32) -> String {
    match *code {
        CODE_NO_DATA => "resolver returned no addresses".to_string(),
        CODE_UNKNOWN => "unknown resolver error".to_string(),
        other => format!("resolver error {other}"),
    }
}

/// Per-entry outcome of a batch resolution.
pub type Resolution = Result<Endpoint, DnsResolutionError>;

/// Blocking system name resolution, both address families.
///
/// A seam rather than a direct call so the batch protocol can be exercised
/// without touching the real resolver.
pub trait NameLookup: Send + Sync + 'static {
    fn lookup(&self, name: &str, port: u16) -> Result<Vec<IpAddr>, DnsResolutionError>;
}

/// [`NameLookup`] over the system resolver via [`ToSocketAddrs`].
pub struct SystemLookup;

impl NameLookup for SystemLookup {
    fn lookup(&self, name: &str, port: u16) -> Result<Vec<IpAddr>, DnsResolutionError> {
        match (name, port).to_socket_addrs() {
            Ok(addrs) => Ok(addrs.map(|sock| sock.ip()).collect()),
            Err(err) => Err(DnsResolutionError::new(
                err.raw_os_error().unwrap_or(CODE_UNKNOWN),
                name,
            )),
        }
    }
}

/// The batch protocol behind a mockable seam.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve_batch(
        &self,
        entries: Vec<Option<Endpoint>>,
    ) -> anyhow::Result<Vec<Option<Resolution>>>;
}

/// Resolves endpoint batches concurrently while preserving input order.
pub struct BatchResolver {
    lookup: Arc<dyn NameLookup>,
}

impl BatchResolver {
    pub fn new() -> Self {
        Self::with_lookup(Arc::new(SystemLookup))
    }

    pub fn with_lookup(lookup: Arc<dyn NameLookup>) -> Self {
        Self { lookup }
    }
}

impl Default for BatchResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Resolver for BatchResolver {
    /// Output length and order always match the input; `None` entries pass
    /// through untouched, already-resolved endpoints come back unchanged.
    ///
    /// The returned `Err` covers task-infrastructure faults only; DNS
    /// failures stay inside the per-entry [`Resolution`].
    async fn resolve_batch(
        &self,
        entries: Vec<Option<Endpoint>>,
    ) -> anyhow::Result<Vec<Option<Resolution>>> {
        // Fast path: nothing needs resolving, so no tasks are spawned.
        if entries.iter().flatten().all(|endpoint| !endpoint.host().is_name()) {
            return Ok(entries.into_iter().map(|entry| entry.map(Ok)).collect());
        }

        let lookup = Arc::clone(&self.lookup);
        tasks::concurrent_map(entries, move |entry| {
            let lookup = Arc::clone(&lookup);
            async move {
                match entry {
                    None => Ok(None),
                    Some(endpoint) => resolve_entry(lookup, endpoint).await.map(Some),
                }
            }
        })
        .await
    }
}

/// Resolves one endpoint. DNS failures land in the returned [`Resolution`];
/// only a panicked resolver worker escapes as a hard error.
async fn resolve_entry(
    lookup: Arc<dyn NameLookup>,
    endpoint: Endpoint,
) -> anyhow::Result<Resolution> {
    let name = match endpoint.host() {
        Host::Name(name) => name.clone(),
        _ => return Ok(Ok(endpoint)),
    };

    let port = endpoint.port();
    let attempt = {
        let name = name.clone();
        tokio::task::spawn_blocking(move || lookup.lookup(&name, port))
            .await
            .context("resolver worker panicked")?
    };

    Ok(match attempt {
        Ok(addrs) => match preferred(&addrs) {
            Some(ip) => Ok(endpoint.with_host(host_from_ip(ip))),
            None => {
                debug!(%name, "lookup succeeded but returned no usable address");
                Err(DnsResolutionError::new(CODE_NO_DATA, name))
            }
        },
        Err(err) => Err(err),
    })
}

/// V4 beats V6 when both families resolve.
fn preferred(addrs: &[IpAddr]) -> Option<IpAddr> {
    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.iter().find(|ip| ip.is_ipv6()))
        .copied()
}

fn host_from_ip(ip: IpAddr) -> Host {
    match ip {
        IpAddr::V4(v4) => Host::V4(v4),
        IpAddr::V6(v6) => Host::V6(v6),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
