//! Connector catalog cache.

use thiserror::Error;

use crate::core::models::{ConnectorDescriptor, ConnectorRole};
use crate::host::{ClientError, HostApi};

/// Catalog fetch failed; the previously cached contents are kept.
#[derive(Debug, Error)]
#[error("failed to fetch connector catalog: {0}")]
pub struct FetchError(#[from] pub ClientError);

/// Cached contents of the daemon's connector registry.
///
/// Holds whatever the last successful [`load`](Self::load) returned, in
/// registry order. The list is replaced wholesale, never merged, and a
/// failed load leaves the stale list in place so the job form stays usable.
#[derive(Debug, Default)]
pub struct ConnectorCatalog {
    connectors: Vec<ConnectorDescriptor>,
}

impl ConnectorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from the daemon.
    ///
    /// On failure the cached list is untouched and the error is returned
    /// for the view to surface as a non-fatal notice.
    pub async fn load(&mut self, host: &dyn HostApi) -> Result<(), FetchError> {
        let connectors = host.available_connectors().await?;
        self.connectors = connectors;
        Ok(())
    }

    /// Connectors able to fill the given role, in registry order.
    pub fn by_role(&self, role: ConnectorRole) -> impl Iterator<Item = &ConnectorDescriptor> {
        self.connectors.iter().filter(move |c| c.role == role)
    }

    /// Whether a connector with this name is registered for this role.
    pub fn contains(&self, role: ConnectorRole, name: &str) -> bool {
        self.connectors.iter().any(|c| c.role == role && c.name == name)
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
