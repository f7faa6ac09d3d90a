use anyhow::{Context, Result};
use log::{info, warn};

use crate::cancel::CancelToken;
use crate::client::Client;
use crate::session::{claims, LogoutReason, SessionStore};

use super::{AccessScope, DecisionSource, Role, RoleDecision, RESTRICTED_FLOOR_SECTIONS};

/// Terminal outcome of one resolution pass.
#[derive(Debug, Clone)]
pub enum Resolution {
    Decided(RoleDecision),
    /// The server-side role no longer matches the token's role claim.
    /// The session has already been cleared with a recorded reason;
    /// callers must route to sign-in and render nothing.
    ForcedLogout { jwt_role: Role, server_role: Role },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Uninitialized,
    Bootstrapped,
    Authoritative,
    Fallback,
    ForcedLogout,
}

/// Resolves the session's role and allowed sections.
///
/// The pipeline: bootstrap from the token's role claim for instant
/// first paint, then reconcile against the rbac endpoint, falling back
/// to the profile endpoint and finally to the bootstrap value. Network
/// failures never escape, they are traced and the next source is tried.
/// The single disruptive condition is a role mismatch between token and
/// server, which force-ends the session.
pub struct RoleResolver<'a> {
    client: &'a Client,
    session: &'a SessionStore,
    state: ResolveState,
    jwt_role: Option<Role>,
}

impl<'a> RoleResolver<'a> {
    pub fn new(client: &'a Client, session: &'a SessionStore) -> Self {
        Self {
            client,
            session,
            state: ResolveState::Uninitialized,
            jwt_role: None,
        }
    }

    pub fn state(&self) -> ResolveState {
        self.state
    }

    pub async fn resolve(&mut self, cancel: &CancelToken) -> Result<Resolution> {
        let token = match self.session.token() {
            Some(token) => token,
            None => return Ok(Resolution::Decided(RoleDecision::unauthenticated())),
        };

        let mut decision = self.bootstrap(&token);
        self.state = ResolveState::Bootstrapped;

        if cancel.is_cancelled() {
            return Ok(Resolution::Cancelled);
        }

        match self.client.rbac_sections().await {
            Ok(resp) => {
                if cancel.is_cancelled() {
                    return Ok(Resolution::Cancelled);
                }
                if resp.role.trim().is_empty() {
                    decision
                        .trace
                        .push(String::from("rbac sections response has empty role"));
                    self.fallback(decision, cancel).await
                } else {
                    let server_role = Role::parse(&resp.role);
                    if let Some(forced) = self.check_role_mismatch(&server_role)? {
                        return Ok(forced);
                    }

                    let scope = authoritative_scope(&server_role, &resp.allowed_sections);
                    decision.role = server_role;
                    decision.scope = scope;
                    decision.source = DecisionSource::ServerAuthoritative;
                    decision.loaded = true;
                    self.state = ResolveState::Authoritative;
                    Ok(Resolution::Decided(decision))
                }
            }
            Err(err) => {
                decision
                    .trace
                    .push(format!("rbac sections fetch failed: {err}"));
                warn!("Fetch rbac sections failed: {err:#}, falling back to profile");
                self.fallback(decision, cancel).await
            }
        }
    }

    /// Secondary path: the profile endpoint supplies the role only, the
    /// scope comes from the fixed table. When even the role cannot be
    /// determined the bootstrap decision stands rather than blocking.
    async fn fallback(
        &mut self,
        mut decision: RoleDecision,
        cancel: &CancelToken,
    ) -> Result<Resolution> {
        match self.client.profile_me().await {
            Ok(profile) => {
                if cancel.is_cancelled() {
                    return Ok(Resolution::Cancelled);
                }
                if profile.role.trim().is_empty() {
                    decision
                        .trace
                        .push(String::from("profile response has empty role"));
                    self.keep_bootstrap(decision)
                } else {
                    let server_role = Role::parse(&profile.role);
                    if let Some(forced) = self.check_role_mismatch(&server_role)? {
                        return Ok(forced);
                    }

                    decision.scope = server_role.default_scope();
                    decision.role = server_role;
                    decision.source = DecisionSource::ProfileFallback;
                    decision.loaded = true;
                    self.state = ResolveState::Fallback;
                    Ok(Resolution::Decided(decision))
                }
            }
            Err(err) => {
                if cancel.is_cancelled() {
                    return Ok(Resolution::Cancelled);
                }
                decision.trace.push(format!("profile fetch failed: {err}"));
                warn!("Fetch profile failed: {err:#}, keeping bootstrap decision");
                self.keep_bootstrap(decision)
            }
        }
    }

    fn keep_bootstrap(&mut self, mut decision: RoleDecision) -> Result<Resolution> {
        decision.loaded = true;
        self.state = ResolveState::Fallback;
        Ok(Resolution::Decided(decision))
    }

    /// A role that changed server-side since token issuance invalidates
    /// the whole session. Silently adopting the new role could retain
    /// privileges after a demotion, so the session ends here.
    fn check_role_mismatch(&mut self, server_role: &Role) -> Result<Option<Resolution>> {
        let jwt_role = match &self.jwt_role {
            Some(role) => role.clone(),
            None => return Ok(None),
        };
        if jwt_role == *server_role {
            return Ok(None);
        }

        warn!(
            "Role changed server-side ('{jwt_role}' -> '{server_role}'), ending session"
        );
        self.session
            .clear_with_reason(LogoutReason::RoleChanged)
            .context("clear session after role change")?;
        self.state = ResolveState::ForcedLogout;
        Ok(Some(Resolution::ForcedLogout {
            jwt_role,
            server_role: server_role.clone(),
        }))
    }

    /// Provisional decision from the token's embedded role claim, used
    /// only to avoid a blank first paint.
    fn bootstrap(&mut self, token: &str) -> RoleDecision {
        let mut trace = Vec::new();
        let role = match claims::peek_role(token) {
            Some(role) => {
                let role = Role::parse(&role);
                self.jwt_role = Some(role.clone());
                info!("Bootstrapped role '{role}' from token claim");
                role
            }
            None => {
                trace.push(String::from("token has no readable role claim"));
                Role::Unknown(String::new())
            }
        };

        RoleDecision {
            scope: role.default_scope(),
            role,
            source: DecisionSource::JwtBootstrap,
            loaded: false,
            trace,
        }
    }
}

/// Scope for an authoritative response: full-access roles get
/// everything, a non-empty section list is taken as-is (plus the fixed
/// floor for the restricted role), an empty list falls back to the
/// role table.
fn authoritative_scope(role: &Role, allowed_sections: &[String]) -> AccessScope {
    if role.has_full_access() {
        return AccessScope::All;
    }
    if allowed_sections.iter().all(|s| s.trim().is_empty()) {
        return role.default_scope();
    }

    let mut scope = AccessScope::sections(allowed_sections.iter().map(String::as_str));
    if *role == Role::RoyaltyShare {
        if let AccessScope::Sections(ref mut sections) = scope {
            for section in RESTRICTED_FLOOR_SECTIONS {
                sections.insert(String::from(section));
            }
        }
    }
    scope
}
