use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const NOTE_BASE_URL: &str = "https://note.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: String,
    pub username: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    pub order: i64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub last_known_article_count: Option<u64>,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub has_new: bool,
}

impl Creator {
    pub fn profile_url(username: &str) -> String {
        format!("{}/{}", NOTE_BASE_URL, username)
    }
}

/// Partial update for a creator. `None` leaves the field alone; the nested
/// options allow clearing a nullable field. `id`, `username` and `url` are
/// fixed at registration and have no entry here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatorUpdate {
    pub name: Option<String>,
    pub icon_url: Option<Option<String>>,
    pub order: Option<i64>,
    pub archived: Option<bool>,
    pub last_known_article_count: Option<Option<u64>>,
    pub last_checked_at: Option<Option<DateTime<Utc>>>,
    pub has_new: Option<bool>,
}

impl CreatorUpdate {
    pub fn archived(archived: bool) -> Self {
        Self {
            archived: Some(archived),
            ..Default::default()
        }
    }

    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, creator: &mut Creator) {
        if let Some(name) = self.name {
            creator.name = name;
        }
        if let Some(icon_url) = self.icon_url {
            creator.icon_url = icon_url;
        }
        if let Some(order) = self.order {
            creator.order = order;
        }
        if let Some(archived) = self.archived {
            creator.archived = archived;
        }
        if let Some(count) = self.last_known_article_count {
            creator.last_known_article_count = count;
        }
        if let Some(checked) = self.last_checked_at {
            creator.last_checked_at = checked;
        }
        if let Some(has_new) = self.has_new {
            creator.has_new = has_new;
        }
    }
}
