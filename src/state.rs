use crate::admin::{ExpiredEventsTask, VerificationQueue};
use crate::api::{ApiClient, VerificationTarget};
use crate::config::AppConfig;
use crate::dashboard::{DirectorySearch, PastEvents, RegistrationList};
use crate::notices::Notices;
use crate::profiles::{ProfileLoader, RoleProfileView};
use crate::profiles::{CurrentUser, Profile, Role};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;

/// Everything a screen needs: config, the backend client and the shared
/// notice queue.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
    pub notices: Notices,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let transport = Arc::new(HttpTransport::new(&config.api)?) as Arc<dyn Transport>;
        tracing::info!(base_url = %config.api.base_url, "backend client ready");

        Ok(Self::from_parts(config, transport))
    }

    pub fn from_parts(config: Arc<AppConfig>, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            api: ApiClient::new(transport),
            notices: Notices::new(),
        }
    }

    pub fn profile_loader(&self) -> ProfileLoader {
        ProfileLoader::new(
            self.api.clone(),
            self.notices.clone(),
            self.config.username_debounce,
        )
    }

    pub fn profile_view(
        &self,
        role: Role,
        profile: Profile,
        viewer: Option<&CurrentUser>,
    ) -> RoleProfileView {
        RoleProfileView::new(self.api.clone(), role, profile, viewer)
    }

    pub fn verification_queue(&self, target: VerificationTarget) -> VerificationQueue {
        VerificationQueue::new(self.api.clone(), self.notices.clone(), target)
    }

    pub fn past_events(&self, firebase_uid: &str) -> PastEvents {
        PastEvents::new(self.api.clone(), self.notices.clone(), firebase_uid)
    }

    pub fn registration_list(&self, firebase_uid: &str) -> RegistrationList {
        RegistrationList::new(self.api.clone(), self.notices.clone(), firebase_uid)
    }

    pub fn directory_search(&self) -> DirectorySearch {
        DirectorySearch::new(self.api.clone(), self.config.search_debounce)
    }

    pub fn expired_events_task(&self) -> ExpiredEventsTask {
        ExpiredEventsTask::new(self.api.clone(), self.notices.clone())
    }

    #[cfg(test)]
    pub fn fake(transport: Arc<dyn Transport>) -> Self {
        let config = AppConfig::from_lookup(|_| None).expect("defaults are valid");
        Self::from_parts(Arc::new(config), transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::ProfileScreen;
    use crate::test_util::{Reply, ScriptedTransport};
    use crate::transport::Method;

    #[tokio::test]
    async fn screens_share_one_notice_queue() {
        let t = ScriptedTransport::new();
        t.on(Method::Get, "/api/organization/unverified", Reply::Status(500));
        let state = AppState::fake(t.clone());

        let loader = state.profile_loader();
        loader.load(Role::Participant, "missing").await;
        assert_eq!(loader.screen(), ProfileScreen::NotFound);

        state
            .verification_queue(VerificationTarget::Organization)
            .load()
            .await;

        let messages: Vec<_> = state
            .notices
            .snapshot()
            .into_iter()
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            ["Failed to fetch profile data", "Failed to fetch organizations"]
        );
    }
}
