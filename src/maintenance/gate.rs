use anyhow::Result;
use log::warn;
use serde::Serialize;

use crate::access::Role;
use crate::cancel::CancelToken;
use crate::client::Client;
use crate::session::SessionStore;

use super::MaintenanceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoticeVariant {
    InlineCard,
    FullPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum MaintenanceOutcome {
    ShowContent,
    ShowNotice {
        page: String,
        variant: NoticeVariant,
    },
    /// Evaluation was cancelled, the caller is gone.
    Cancelled,
}

/// Per-page maintenance gate. Seeds its decision synchronously from the
/// store's mirror, then converges to the live value once the role and
/// map fetches settle, without a remount.
pub struct MaintenanceGate<'a> {
    store: &'a MaintenanceStore,
    variant: NoticeVariant,
    /// When set, admins see the notice like everyone else.
    bypass_admin: bool,
}

impl<'a> MaintenanceGate<'a> {
    pub fn new(store: &'a MaintenanceStore, variant: NoticeVariant) -> Self {
        Self {
            store,
            variant,
            bypass_admin: false,
        }
    }

    pub fn with_bypass_admin(mut self, bypass_admin: bool) -> Self {
        self.bypass_admin = bypass_admin;
        self
    }

    /// First-paint decision from the mirror. A cached admin role never
    /// sees a seeded notice; the live pass may still show one when
    /// `bypass_admin` is set.
    pub fn seed(&self, page: &str, session: &SessionStore) -> MaintenanceOutcome {
        if let Some(user) = session.cached_user() {
            if Role::parse(&user.role).is_admin() {
                return MaintenanceOutcome::ShowContent;
            }
        }
        if self.store.is_on(page) {
            self.notice(page)
        } else {
            MaintenanceOutcome::ShowContent
        }
    }

    /// Live decision: refreshes the map and the caller's role together,
    /// replacing whatever the seed said.
    pub async fn evaluate(
        &self,
        page: &str,
        client: &Client,
        session: &SessionStore,
        cancel: &CancelToken,
    ) -> Result<MaintenanceOutcome> {
        let (role, map) = tokio::join!(
            fetch_role(client, session),
            self.store.refresh(client, cancel)
        );
        let map = map?;
        if cancel.is_cancelled() {
            return Ok(MaintenanceOutcome::Cancelled);
        }

        let on = map
            .get(&page.trim().to_lowercase())
            .copied()
            .unwrap_or(false);
        if !on {
            return Ok(MaintenanceOutcome::ShowContent);
        }

        if !self.bypass_admin {
            if let Some(role) = role {
                if role.is_admin() {
                    return Ok(MaintenanceOutcome::ShowContent);
                }
            }
        }

        Ok(self.notice(page))
    }

    fn notice(&self, page: &str) -> MaintenanceOutcome {
        MaintenanceOutcome::ShowNotice {
            page: String::from(page),
            variant: self.variant,
        }
    }
}

/// Live role for the admin bypass. Falls back to the cached user when
/// the profile fetch fails; anonymous sessions have no role at all.
async fn fetch_role(client: &Client, session: &SessionStore) -> Option<Role> {
    session.token()?;
    match client.profile_me().await {
        Ok(profile) => Some(Role::parse(&profile.role)),
        Err(err) => {
            warn!("Fetch profile for maintenance bypass failed: {err:#}");
            session.cached_user().map(|user| Role::parse(&user.role))
        }
    }
}
