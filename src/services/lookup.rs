use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Creator, CreatorUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct CreatorProfile {
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
    pub note_count: u64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    data: Option<LookupData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupData {
    nickname: Option<String>,
    profile_image_url: Option<String>,
    #[serde(default)]
    note_count: u64,
}

/// Client for the profile lookup proxy. Every call is best-effort: callers
/// log failures and carry on with what they already have.
#[derive(Clone)]
pub struct NoteClient {
    client: Client,
    endpoint: Url,
}

impl NoteClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::Config(format!("invalid lookup_url {endpoint:?}: {e}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("note-checklist/1.0")
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub async fn fetch_creator(&self, username: &str) -> Result<CreatorProfile> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", username);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::CollaboratorUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::CollaboratorUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::CollaboratorUnavailable(e.to_string()))?;
        parse_profile(&body, username)
    }

    /// Look up several creators concurrently, pairing each result with the
    /// creator id it belongs to.
    pub async fn refresh_all(
        &self,
        targets: Vec<(String, String)>,
    ) -> Vec<(String, Result<CreatorProfile>)> {
        stream::iter(targets)
            .map(|(id, username)| async move {
                let result = self.fetch_creator(&username).await;
                if let Err(e) = &result {
                    tracing::debug!("Lookup failed for {}: {}", username, e);
                }
                (id, result)
            })
            .buffer_unordered(5) // Max 5 concurrent lookups
            .collect()
            .await
    }
}

fn parse_profile(body: &str, username: &str) -> Result<CreatorProfile> {
    let response: LookupResponse = serde_json::from_str(body)
        .map_err(|e| AppError::CollaboratorUnavailable(format!("bad response: {e}")))?;

    let data = response.data.ok_or_else(|| {
        AppError::CollaboratorUnavailable(format!("no profile for {username}"))
    })?;

    Ok(CreatorProfile {
        nickname: data.nickname.filter(|n| !n.trim().is_empty()),
        profile_image_url: data.profile_image_url,
        note_count: data.note_count,
    })
}

/// Why a lookup was requested; decides which fields the profile may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPurpose {
    /// Right after registration.
    Registered,
    /// Periodic refresh of the whole list.
    Refresh,
    /// After the user confirmed a status for the creator.
    StatusConfirmed,
}

/// Turn a fresh profile into the update it implies for `creator`.
pub fn profile_update(
    creator: &Creator,
    profile: &CreatorProfile,
    purpose: LookupPurpose,
    now: DateTime<Utc>,
) -> CreatorUpdate {
    match purpose {
        LookupPurpose::Registered => {
            // Only replace the name if the user kept the default.
            let name = if creator.name == creator.username {
                profile.nickname.clone()
            } else {
                None
            };
            CreatorUpdate {
                name,
                icon_url: Some(profile.profile_image_url.clone()),
                last_known_article_count: Some(Some(profile.note_count)),
                last_checked_at: Some(Some(now)),
                ..Default::default()
            }
        }
        LookupPurpose::Refresh => {
            let grew = creator
                .last_known_article_count
                .is_some_and(|known| profile.note_count > known);
            CreatorUpdate {
                icon_url: Some(profile.profile_image_url.clone()),
                last_checked_at: Some(Some(now)),
                has_new: grew.then_some(true),
                ..Default::default()
            }
        }
        LookupPurpose::StatusConfirmed => CreatorUpdate {
            last_known_article_count: Some(Some(profile.note_count)),
            ..Default::default()
        },
    }
}
