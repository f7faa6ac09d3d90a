use anyhow::Result;
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::client::Client;
use crate::route::RouteDescriptor;
use crate::session::SessionStore;

use super::perms;
use super::resolver::{Resolution, RoleResolver};
use super::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    NotSignedIn,
    AdminOnly,
    SectionNotAllowed,
    PermissionDenied,
}

/// Render decision for one route mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum GateOutcome {
    /// State is not settled, render nothing to avoid a flash of
    /// protected content. Also reported for a cancelled evaluation,
    /// whose caller is gone anyway.
    Loading,
    Allow,
    /// Fixed "access restricted" notice naming the page and role, with
    /// a single recovery action.
    Deny {
        page: String,
        role: Role,
        reason: DenyReason,
        recover_to: String,
    },
    /// Session ended because the role changed server-side; route to
    /// sign-in.
    ForcedLogout,
}

/// Authorization gate for routes. Performs its own role and permission
/// fetches per evaluation; sibling gates converge independently to the
/// same authoritative state.
pub struct Gate<'a> {
    client: &'a Client,
    session: &'a SessionStore,
    home_page: String,
}

impl<'a> Gate<'a> {
    pub fn new(client: &'a Client, session: &'a SessionStore, home_page: String) -> Self {
        Self {
            client,
            session,
            home_page,
        }
    }

    pub async fn evaluate(
        &self,
        route: &RouteDescriptor,
        cancel: &CancelToken,
    ) -> Result<GateOutcome> {
        let signed_in = self.session.token().is_some();

        // Role and permission fetches are issued together; the decision
        // is computed only after both have settled, partial results
        // never grant access.
        let wants_map = signed_in && !route.permission_keys.is_empty();
        let mut resolver = RoleResolver::new(self.client, self.session);
        let (resolution, map) = tokio::join!(resolver.resolve(cancel), async {
            if wants_map {
                perms::fetch_permission_map(self.client, &route.permission_keys, cancel).await
            } else {
                None
            }
        });

        let decision = match resolution? {
            Resolution::Cancelled => return Ok(GateOutcome::Loading),
            Resolution::ForcedLogout { .. } => return Ok(GateOutcome::ForcedLogout),
            Resolution::Decided(decision) => decision,
        };
        if cancel.is_cancelled() {
            return Ok(GateOutcome::Loading);
        }
        if !decision.loaded {
            return Ok(GateOutcome::Loading);
        }

        if !signed_in {
            return Ok(self.deny(route, decision.role, DenyReason::NotSignedIn));
        }

        if route.requires_admin && !decision.role.is_admin() {
            return Ok(self.deny(route, decision.role, DenyReason::AdminOnly));
        }

        let section = route.section();
        if !decision.scope.permits(&section) && !perms::floor_override(&decision.role, &section) {
            return Ok(self.deny(route, decision.role, DenyReason::SectionNotAllowed));
        }

        if !route.permission_keys.is_empty() {
            let check = perms::check_keys(
                &decision.role,
                &route.name,
                &route.permission_keys,
                map.as_ref(),
            );
            if !check.allowed {
                return Ok(self.deny(route, decision.role, DenyReason::PermissionDenied));
            }
        }

        Ok(GateOutcome::Allow)
    }

    fn deny(&self, route: &RouteDescriptor, role: Role, reason: DenyReason) -> GateOutcome {
        GateOutcome::Deny {
            page: route.name.clone(),
            role,
            reason,
            recover_to: self.home_page.clone(),
        }
    }
}
