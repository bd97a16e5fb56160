use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::decode::{
    decode, directory_page, event_list, keyed_event_list, list_of, single_event, DirectoryPage,
};
use crate::error::ApiError;
use crate::events::dto::{Event, Organization, ParticipantPage, Skill, TaskOutcome};
use crate::profiles::dto::{Profile, PublicProfile, Role, UsernameCheck};
use crate::transport::{ApiRequest, Method, Transport};

/// Account kinds an admin can approve or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationTarget {
    Organization,
    Organizer,
}

impl VerificationTarget {
    pub fn segment(&self) -> &'static str {
        match self {
            VerificationTarget::Organization => "organization",
            VerificationTarget::Organizer => "organizer",
        }
    }
}

impl fmt::Display for VerificationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Typed access to the backend REST API.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch(&self, req: ApiRequest) -> Result<(String, Value), ApiError> {
        let path = req.path();
        let resp = self.transport.send(req).await?;
        Ok((path, resp.body))
    }

    // ---- profiles ----

    #[instrument(skip(self))]
    pub async fn profile(&self, role: Role, firebase_uid: &str) -> Result<Profile, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "auth", role.as_str(), firebase_uid]))
            .await?;
        decode(&path, body)
    }

    /// Role-agnostic lookup used by the public profile page.
    #[instrument(skip(self))]
    pub async fn public_profile(&self, firebase_uid: &str) -> Result<PublicProfile, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "auth", firebase_uid]))
            .await?;
        decode(&path, body)
    }

    /// Resolves the signed-in account's role.
    #[instrument(skip(self))]
    pub async fn role_of(&self, firebase_uid: &str) -> Result<PublicProfile, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "auth", "role", firebase_uid]))
            .await?;
        decode(&path, body)
    }

    /// Whole-object replace. An empty response body echoes the sent profile.
    #[instrument(skip(self, profile))]
    pub async fn update_profile(
        &self,
        role: Role,
        firebase_uid: &str,
        profile: &Profile,
    ) -> Result<Profile, ApiError> {
        let body = serde_json::to_value(profile).map_err(|e| ApiError::decode("profile", e))?;
        let req = ApiRequest::new(Method::Put, ["api", "auth", role.as_str(), firebase_uid]).json(body);
        let (path, body) = self.fetch(req).await?;
        match body {
            Value::Object(_) => decode(&path, body),
            _ => Ok(profile.clone()),
        }
    }

    #[instrument(skip(self))]
    pub async fn username_taken(&self, username: &str) -> Result<bool, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "auth", "check-username", username]))
            .await?;
        decode::<UsernameCheck>(&path, body).map(|c| c.exists)
    }

    // ---- events ----

    #[instrument(skip(self))]
    pub async fn events_page(&self, page: u32, size: u32) -> Result<Vec<Event>, ApiError> {
        let req = ApiRequest::get(["api", "events"])
            .query("page", page.to_string())
            .query("size", size.to_string());
        let (path, body) = self.fetch(req).await?;
        event_list(&path, body)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn events_batch(&self, ids: &[String]) -> Result<Vec<Event>, ApiError> {
        let req = ApiRequest::get(["api", "events"]).query("ids", ids.join(","));
        let (path, body) = self.fetch(req).await?;
        event_list(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn event(&self, id: &str) -> Result<Event, ApiError> {
        let (path, body) = self.fetch(ApiRequest::get(["api", "events", id])).await?;
        single_event(&path, body)
    }

    /// Events a participant has attended.
    #[instrument(skip(self))]
    pub async fn past_events(&self, firebase_uid: &str) -> Result<Vec<Event>, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "participant", firebase_uid, "past-events"]))
            .await?;
        event_list(&path, body)
    }

    /// Events created by an organization or organizer account.
    #[instrument(skip(self))]
    pub async fn events_created_by(&self, firebase_uid: &str) -> Result<Vec<Event>, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "events", "user", firebase_uid]))
            .await?;
        keyed_event_list(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn registered_participants(
        &self,
        event_id: &str,
        page: u32,
        size: u32,
    ) -> Result<ParticipantPage, ApiError> {
        let req = ApiRequest::get(["api", "events", event_id, "registered-participants"])
            .query("page", page.to_string())
            .query("size", size.to_string());
        let (path, body) = self.fetch(req).await?;
        decode(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn skills(&self) -> Result<Vec<Skill>, ApiError> {
        let (path, body) = self.fetch(ApiRequest::get(["api", "skills"])).await?;
        list_of(&path, body)
    }

    // ---- organizations / organizers ----

    #[instrument(skip(self))]
    pub async fn organizations(&self) -> Result<Vec<Organization>, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", "organization"]))
            .await?;
        list_of(&path, body)
    }

    /// Name search over organizations or organizers, `size` per page.
    #[instrument(skip(self))]
    pub async fn directory(
        &self,
        target: VerificationTarget,
        query: &str,
        page: u32,
        size: u32,
    ) -> Result<DirectoryPage, ApiError> {
        let req = ApiRequest::get(["api", target.segment()])
            .query("q", query)
            .query("page", page.to_string())
            .query("size", size.to_string());
        let (path, body) = self.fetch(req).await?;
        directory_page(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn verified_organizers(&self, organization_id: &str) -> Result<Vec<Profile>, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get([
                "api",
                "organizer",
                organization_id,
                "verified-organizers",
            ]))
            .await?;
        list_of(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn organizer(&self, id: &str) -> Result<Profile, ApiError> {
        let (path, body) = self.fetch(ApiRequest::get(["api", "organizer", id])).await?;
        decode(&path, body)
    }

    // ---- verification ----

    #[instrument(skip(self))]
    pub async fn unverified(&self, target: VerificationTarget) -> Result<Vec<Profile>, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::get(["api", target.segment(), "unverified"]))
            .await?;
        list_of(&path, body)
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, target: VerificationTarget, id: &str) -> Result<(), ApiError> {
        self.fetch(ApiRequest::new(
            Method::Put,
            ["api", target.segment(), id, "approve"],
        ))
        .await
        .map(|_| ())
    }

    /// Deletes the account server-side.
    #[instrument(skip(self))]
    pub async fn reject(&self, target: VerificationTarget, id: &str) -> Result<(), ApiError> {
        self.fetch(ApiRequest::new(
            Method::Delete,
            ["api", target.segment(), id, "reject"],
        ))
        .await
        .map(|_| ())
    }

    // ---- maintenance ----

    #[instrument(skip(self))]
    pub async fn deactivate_expired_events(&self) -> Result<TaskOutcome, ApiError> {
        let (path, body) = self
            .fetch(ApiRequest::new(
                Method::Post,
                ["api", "scheduled-tasks", "deactivate-expired-events"],
            ))
            .await?;
        decode(&path, body)
    }
}
