use std::collections::HashMap;

use log::warn;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::client::Client;

use super::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionReason {
    Granted,
    ForceAllow,
    Denied,
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub reason: PermissionReason,
    /// Keys that were absent or false in the map.
    pub missing: Vec<String>,
}

/// Fetches the permission map: the scoped endpoint first, then the
/// coarse one whenever the scoped call fails or answers without a map.
/// `None` when every source comes up empty, which downstream treats as
/// an empty map (deny all requested keys).
pub async fn fetch_permission_map(
    client: &Client,
    keys: &[String],
    cancel: &CancelToken,
) -> Option<HashMap<String, bool>> {
    match client.permissions_me(keys).await {
        Ok(resp) => {
            if cancel.is_cancelled() {
                return None;
            }
            match resp.permissions {
                Some(map) => Some(map),
                None => {
                    warn!("Scoped permissions response has no map, trying coarse endpoint");
                    fetch_coarse_map(client, cancel).await
                }
            }
        }
        Err(err) => {
            warn!("Fetch scoped permissions failed: {err:#}, trying coarse endpoint");
            if cancel.is_cancelled() {
                return None;
            }
            fetch_coarse_map(client, cancel).await
        }
    }
}

async fn fetch_coarse_map(
    client: &Client,
    cancel: &CancelToken,
) -> Option<HashMap<String, bool>> {
    match client.auth_permissions().await {
        Ok(map) => {
            if cancel.is_cancelled() {
                return None;
            }
            Some(map)
        }
        Err(err) => {
            warn!("Fetch coarse permissions failed: {err:#}, denying requested keys");
            None
        }
    }
}

/// Checks the requested keys against the fetched map. A key passes only
/// when present and true; an absent map denies everything. Full-access
/// roles pass unconditionally, and the named floor overrides are
/// consulted only after the generic check has denied.
pub fn check_keys(
    role: &Role,
    page: &str,
    keys: &[String],
    map: Option<&HashMap<String, bool>>,
) -> PermissionDecision {
    if role.has_full_access() {
        return PermissionDecision {
            allowed: true,
            reason: PermissionReason::Granted,
            missing: Vec::new(),
        };
    }

    let missing: Vec<String> = match map {
        Some(map) => keys
            .iter()
            .filter(|key| !map.get(*key).copied().unwrap_or(false))
            .cloned()
            .collect(),
        None => keys.to_vec(),
    };

    if missing.is_empty() {
        return PermissionDecision {
            allowed: true,
            reason: PermissionReason::Granted,
            missing,
        };
    }

    if floor_override(role, page) {
        return PermissionDecision {
            allowed: true,
            reason: PermissionReason::ForceAllow,
            missing,
        };
    }

    PermissionDecision {
        allowed: false,
        reason: PermissionReason::Denied,
        missing,
    }
}

/// Standing product rule: the royalty-share role always keeps the
/// splits page and the whole accounting area, whatever the permission
/// map says. The permission backfill for this role was never completed
/// server-side; keep the behavior exactly as observed.
pub fn floor_override(role: &Role, page: &str) -> bool {
    if *role != Role::RoyaltyShare {
        return false;
    }
    let page = page.trim().to_lowercase();
    page == "splits" || page == "accounting" || page.starts_with("accounting/")
}
