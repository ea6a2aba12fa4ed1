use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The two flags the user sets per creator per app-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CreatorStatus {
    pub read: bool,
    pub commented: bool,
}

impl CreatorStatus {
    pub fn new(read: bool, commented: bool) -> Self {
        Self { read, commented }
    }

    pub fn is_done(&self) -> bool {
        self.read || self.commented
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusItem {
    pub read: bool,
    pub commented: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusItem {
    pub fn status(&self) -> CreatorStatus {
        CreatorStatus::new(self.read, self.commented)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatus {
    #[serde(default)]
    pub date_key: Option<NaiveDate>,
    #[serde(default)]
    pub items: HashMap<String, StatusItem>,
}

/// Checklist totals over the active creators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub total: usize,
    pub read: usize,
    pub commented: usize,
}
