use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::dto::{CurrentUser, Profile};
use crate::api::ApiClient;
use crate::error::ApiError;

/// Verified organizers of an organization. Uses the dedicated endpoint and,
/// if that fails, looks up `organizer_ids` one at a time, leaving out any
/// that fail. An organization without an id goes straight to the fallback.
pub async fn fetch_organizers(
    api: &ApiClient,
    organization: &Profile,
    cancel: &CancellationToken,
) -> Vec<Profile> {
    if let Some(id) = organization.id.as_deref() {
        match api.verified_organizers(id).await {
            Ok(list) => return list,
            Err(e) => warn!(error = %e, organization = id, "verified organizer lookup failed"),
        }
    }

    let mut out = Vec::new();
    for id in &organization.organizer_ids {
        if cancel.is_cancelled() {
            break;
        }
        match api.organizer(id).await {
            Ok(p) => out.push(p),
            Err(e) => debug!(error = %e, %id, "skipping organizer"),
        }
    }
    out
}

/// Resolves the signed-in account from its Firebase uid.
pub async fn resolve_current_user(
    api: &ApiClient,
    firebase_uid: &str,
) -> Result<CurrentUser, ApiError> {
    let found = api.role_of(firebase_uid).await?;
    Ok(CurrentUser {
        id: found.user.id,
        firebase_uid: firebase_uid.to_string(),
        role: found.role,
        following: found.user.following,
    })
}
