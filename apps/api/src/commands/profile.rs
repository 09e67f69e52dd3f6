//! # Profile Commands

use tracing::info;

use crate::commands::checked;
use crate::error::ApiError;
use crate::state::AppState;
use renthub_core::validation::validate_profile_update;
use renthub_core::{CallerIdentity, ProfileUpdate};

/// Saves the caller's name, phone and city.
///
/// Returns the refreshed identity; the HTTP collaborator should store it in
/// the session so later commands carry the new details. Listings already
/// submitted keep their snapshotted owner fields. Works for a caller who has
/// never been seen before.
pub async fn update_profile(
    state: &AppState,
    caller: &CallerIdentity,
    update: ProfileUpdate,
) -> Result<CallerIdentity, ApiError> {
    validate_profile_update(&update)?;

    let result = state.db.users().update_profile(caller, &update).await;
    let profile = checked("update_profile", &caller.user_id, &caller.user_id, result)?;

    info!(user_id = %profile.id, "Profile updated");
    Ok(profile.to_identity())
}
