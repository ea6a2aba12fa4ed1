use std::rc::Rc;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::clock::Clock;
use crate::error::Result;
use crate::models::{Creator, CreatorStatus, DailyStatus, Progress, StatusItem};

use super::schema::{DAILY_STATUS_KEY, LAST_RESET_AT_KEY};
use super::store::KeyValueStore;

/// Local hour at which one app-day ends and the next begins.
pub const DAY_BOUNDARY_HOUR: u32 = 5;

/// Start of the app-day containing `now`: today at 05:00 if the local clock
/// has reached 05:00, otherwise yesterday at 05:00.
pub fn app_day_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let date = app_day_date(now);
    let boundary = date.and_time(boundary_time());
    let tz = now.timezone();
    // Inside a DST gap 05:00 does not exist; the day starts once the clock
    // resumes after the jump.
    tz.from_local_datetime(&boundary)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(boundary + chrono::Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&boundary))
}

/// Calendar date the app-day containing `now` started on.
pub fn app_day_date<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let local = now.naive_local();
    if local.time() >= boundary_time() {
        local.date()
    } else {
        local.date() - Days::new(1)
    }
}

fn boundary_time() -> NaiveTime {
    NaiveTime::from_hms_opt(DAY_BOUNDARY_HOUR, 0, 0).expect("DAY_BOUNDARY_HOUR is below 24")
}

/// Per-creator daily flags and the lazy reset policy around them.
#[derive(Clone)]
pub struct DailyStatusTracker {
    store: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
}

impl DailyStatusTracker {
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn daily_status(&self) -> Result<DailyStatus> {
        match self.store.get(DAILY_STATUS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(DailyStatus::default()),
        }
    }

    fn save(&self, daily: &DailyStatus) -> Result<()> {
        let json = serde_json::to_string(daily)?;
        self.store.set(DAILY_STATUS_KEY, &json)
    }

    pub fn last_reset_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(LAST_RESET_AT_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
            Err(e) => {
                tracing::warn!("Ignoring unreadable last reset timestamp {:?}: {}", raw, e);
                Ok(None)
            }
        }
    }

    /// Resets every flag if the last reset happened before the app-day that
    /// contains `now` began. Returns whether a reset happened.
    pub fn check_and_reset_if_needed(
        &self,
        now: DateTime<Local>,
        active: &[Creator],
    ) -> Result<bool> {
        let day_start = app_day_start(&now).with_timezone(&Utc);
        let due = match self.last_reset_at()? {
            Some(last) => last < day_start,
            None => true,
        };
        if !due {
            return Ok(false);
        }

        self.reset_at(now, active)?;
        self.store.set(LAST_RESET_AT_KEY, &now.to_rfc3339())?;
        tracing::info!(app_day = %app_day_date(&now), "Daily status reset");
        Ok(true)
    }

    /// Clears today's record, leaving one blank entry per active creator.
    pub fn reset_all(&self, active: &[Creator]) -> Result<()> {
        self.reset_at(self.clock.now(), active)
    }

    fn reset_at(&self, now: DateTime<Local>, active: &[Creator]) -> Result<()> {
        let daily = DailyStatus {
            date_key: Some(app_day_date(&now)),
            items: active
                .iter()
                .filter(|c| !c.archived)
                .map(|c| (c.id.clone(), StatusItem::default()))
                .collect(),
        };
        self.save(&daily)
    }

    pub fn get_item(&self, creator_id: &str) -> Result<Option<StatusItem>> {
        Ok(self.daily_status()?.items.remove(creator_id))
    }

    pub fn get_status(&self, creator_id: &str) -> Result<CreatorStatus> {
        Ok(self
            .get_item(creator_id)?
            .map(|item| item.status())
            .unwrap_or_default())
    }

    pub fn set_status(&self, creator_id: &str, status: CreatorStatus) -> Result<()> {
        let mut daily = self.daily_status()?;
        let updated_at = status
            .is_done()
            .then(|| self.clock.now().with_timezone(&Utc));
        daily.items.insert(
            creator_id.to_string(),
            StatusItem {
                read: status.read,
                commented: status.commented,
                updated_at,
            },
        );
        self.save(&daily)
    }

    pub fn progress(&self, active: &[Creator]) -> Result<Progress> {
        let daily = self.daily_status()?;
        let mut progress = Progress {
            total: active.len(),
            ..Default::default()
        };
        for creator in active {
            if let Some(item) = daily.items.get(&creator.id) {
                progress.read += item.read as usize;
                progress.commented += item.commented as usize;
            }
        }
        Ok(progress)
    }
}
