//! Data scope passed through to the item/movement sources.

use serde::{Deserialize, Serialize};

use crate::id::{LocationId, TenantId};

/// Which tenant's (and optionally which location's) data to read.
///
/// Passed explicitly to every read; nothing in the workspace keeps an
/// ambient "current tenant".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantScope {
    pub tenant_id: TenantId,
    pub location_id: Option<LocationId>,
}

impl TenantScope {
    /// Whole-tenant scope (all locations).
    pub fn tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            location_id: None,
        }
    }

    pub fn location(tenant_id: TenantId, location_id: LocationId) -> Self {
        Self {
            tenant_id,
            location_id: Some(location_id),
        }
    }

    /// Whether a record owned by `tenant_id`/`location_id` is visible in this scope.
    pub fn allows(&self, tenant_id: TenantId, location_id: Option<LocationId>) -> bool {
        if self.tenant_id != tenant_id {
            return false;
        }
        match self.location_id {
            None => true,
            Some(scoped) => location_id == Some(scoped),
        }
    }
}

impl core::fmt::Display for TenantScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.location_id {
            Some(loc) => write!(f, "{}/{}", self.tenant_id, loc),
            None => core::fmt::Display::fmt(&self.tenant_id, f),
        }
    }
}
