use std::rc::Rc;

use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::{
    app_day_date, CreatorRegistry, DailyStatusTracker, KeyValueStore, MemoryStore, PendingReturn,
    SqliteStore,
};
use crate::error::{AppError, Result};
use crate::models::{Creator, CreatorStatus, CreatorUpdate, Progress};
use crate::services::{parse_identifier, profile_update, CreatorProfile, LookupPurpose, NoteClient};
use crate::tui::{AppAction, KeyContext};

// Message for a finished batch of lookups
pub struct LookupResults {
    pub purpose: LookupPurpose,
    pub results: Vec<(String, Result<CreatorProfile>)>,
}

/// One checklist line: the creator joined with today's flags.
#[derive(Debug, Clone)]
pub struct ChecklistRow {
    pub creator: Creator,
    pub status: CreatorStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Checklist,
    Archived,
}

#[derive(Debug, Clone)]
pub struct StatusPrompt {
    pub creator_id: String,
    pub name: String,
    pub draft: CreatorStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    AddCreator,
    Rename(String),
}

#[derive(Debug, Clone)]
pub struct TextInput {
    pub kind: InputKind,
    pub buffer: String,
}

pub struct App {
    // Data
    pub rows: Vec<ChecklistRow>,
    pub archived: Vec<Creator>,
    pub progress: Progress,
    pub app_day: NaiveDate,

    // UI State
    pub view: View,
    pub selected_index: usize,
    pub show_help: bool,
    pub status_prompt: Option<StatusPrompt>,
    pub text_input: Option<TextInput>,
    pub message: Option<String>,

    // Async state
    pub pending_lookups: usize,
    lookup_rx: mpsc::Receiver<LookupResults>,
    lookup_tx: mpsc::Sender<LookupResults>,

    // Services
    pub registry: CreatorRegistry,
    pub tracker: DailyStatusTracker,
    pending: PendingReturn,
    clock: Rc<dyn Clock>,
    lookup: Option<NoteClient>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let durable = Rc::new(SqliteStore::open(&config.db_path)?);
        let session = Rc::new(MemoryStore::new());

        let lookup = match config.lookup_url.as_deref().map(NoteClient::new) {
            Some(Ok(client)) => Some(client),
            Some(Err(e)) => {
                tracing::warn!("Profile lookups disabled: {}", e);
                None
            }
            None => None,
        };

        Self::with_parts(durable, session, Rc::new(SystemClock), lookup)
    }

    pub fn with_parts(
        durable: Rc<dyn KeyValueStore>,
        session: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        lookup: Option<NoteClient>,
    ) -> Result<Self> {
        let (lookup_tx, lookup_rx) = mpsc::channel(8);

        let mut app = Self {
            rows: Vec::new(),
            archived: Vec::new(),
            progress: Progress::default(),
            app_day: app_day_date(&clock.now()),
            view: View::Checklist,
            selected_index: 0,
            show_help: false,
            status_prompt: None,
            text_input: None,
            message: None,
            pending_lookups: 0,
            lookup_rx,
            lookup_tx,
            registry: CreatorRegistry::new(durable.clone()),
            tracker: DailyStatusTracker::new(durable, clock.clone()),
            pending: PendingReturn::new(session),
            clock,
            lookup,
        };
        app.on_foreground()?;
        Ok(app)
    }

    pub fn key_context(&self) -> KeyContext {
        if self.show_help {
            KeyContext::Help
        } else if self.text_input.is_some() {
            KeyContext::TextInput
        } else if self.status_prompt.is_some() {
            KeyContext::StatusPrompt
        } else if self.view == View::Archived {
            KeyContext::Archived
        } else {
            KeyContext::Checklist
        }
    }

    pub fn selected_creator(&self) -> Option<&Creator> {
        match self.view {
            View::Checklist => self.rows.get(self.selected_index).map(|r| &r.creator),
            View::Archived => self.archived.get(self.selected_index),
        }
    }

    fn visible_len(&self) -> usize {
        match self.view {
            View::Checklist => self.rows.len(),
            View::Archived => self.archived.len(),
        }
    }

    pub fn reload(&mut self) -> Result<()> {
        self.app_day = app_day_date(&self.clock.now());
        let active = self.registry.list_active()?;
        self.progress = self.tracker.progress(&active)?;
        self.rows = active
            .into_iter()
            .map(|creator| {
                let status = self.tracker.get_status(&creator.id)?;
                Ok(ChecklistRow { creator, status })
            })
            .collect::<Result<Vec<_>>>()?;
        self.archived = self.registry.list_archived()?;

        let len = self.visible_len();
        if len > 0 && self.selected_index >= len {
            self.selected_index = len - 1;
        }
        Ok(())
    }

    /// Runs whenever the app comes back to the foreground: apply the daily
    /// reset if one is due, then resume any status prompt left pending.
    pub fn on_foreground(&mut self) -> Result<()> {
        let active = self.registry.list_active()?;
        if self.tracker.check_and_reset_if_needed(self.clock.now(), &active)? {
            self.message = Some("New day: checklist cleared".to_string());
        }
        self.reload()?;
        self.handle_return()
    }

    /// Record that the user is leaving to check `creator_id`.
    pub fn begin_visit(&mut self, creator_id: &str) -> Result<()> {
        self.pending.set(creator_id)
    }

    fn handle_return(&mut self) -> Result<()> {
        let Some(pending_id) = self.pending.get()? else {
            return Ok(());
        };
        self.pending.clear()?;

        match self.rows.iter().position(|r| r.creator.id == pending_id) {
            Some(idx) => {
                self.view = View::Checklist;
                self.selected_index = idx;
                self.open_status_prompt();
            }
            None => tracing::debug!(id = %pending_id, "Pending creator is gone, dropping marker"),
        }
        Ok(())
    }

    fn open_status_prompt(&mut self) {
        if let Some(row) = self.rows.get(self.selected_index) {
            self.status_prompt = Some(StatusPrompt {
                creator_id: row.creator.id.clone(),
                name: row.creator.name.clone(),
                draft: row.status,
            });
        }
    }

    pub fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        if action == AppAction::Quit {
            return Ok(true);
        }

        self.message = None;
        if let Err(e) = self.apply(action) {
            if !e.is_user_facing() {
                tracing::error!("Action failed: {}", e);
            }
            self.message = Some(e.to_string());
        }
        Ok(false)
    }

    fn apply(&mut self, action: AppAction) -> Result<()> {
        // Lazy reset: a long-lived session may have crossed the boundary.
        if self.status_prompt.is_none() && self.text_input.is_none() {
            self.reset_if_due()?;
        }

        match action {
            AppAction::Quit => {}

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.visible_len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::OpenCreator => {
                if let Some(creator) = self.selected_creator().cloned() {
                    self.begin_visit(&creator.id)?;
                    if let Err(e) = open::that(&creator.url) {
                        tracing::warn!("Failed to open {}: {}", creator.url, e);
                        self.pending.clear()?;
                        self.message = Some(format!("Could not open browser: {e}"));
                    }
                }
            }

            AppAction::EditStatus => self.open_status_prompt(),

            AppAction::ToggleRead => {
                if let Some(prompt) = self.status_prompt.as_mut() {
                    prompt.draft.read = !prompt.draft.read;
                }
            }

            AppAction::ToggleCommented => {
                if let Some(prompt) = self.status_prompt.as_mut() {
                    prompt.draft.commented = !prompt.draft.commented;
                }
            }

            AppAction::StatusConfirm => {
                if let Some(prompt) = self.status_prompt.take() {
                    // Prompt may have been open across the day boundary.
                    self.reset_if_due()?;
                    self.confirm_status(&prompt.creator_id, prompt.draft)?;
                }
            }

            AppAction::StatusCancel => {
                self.status_prompt = None;
            }

            AppAction::AddCreator => {
                self.text_input = Some(TextInput {
                    kind: InputKind::AddCreator,
                    buffer: String::new(),
                });
            }

            AppAction::RenameCreator => {
                if let Some(creator) = self.selected_creator() {
                    self.text_input = Some(TextInput {
                        kind: InputKind::Rename(creator.id.clone()),
                        buffer: creator.name.clone(),
                    });
                }
            }

            AppAction::InputChar(c) => {
                if let Some(input) = self.text_input.as_mut() {
                    input.buffer.push(c);
                }
            }

            AppAction::InputBackspace => {
                if let Some(input) = self.text_input.as_mut() {
                    input.buffer.pop();
                }
            }

            AppAction::InputConfirm => {
                if let Some(input) = self.text_input.take() {
                    match input.kind {
                        InputKind::AddCreator => self.add_creator(&input.buffer)?,
                        InputKind::Rename(id) => self.rename_creator(&id, &input.buffer)?,
                    }
                }
            }

            AppAction::InputCancel => {
                self.text_input = None;
            }

            AppAction::ArchiveCreator => {
                if let Some(creator) = self.selected_creator().cloned() {
                    self.registry.archive(&creator.id)?;
                    self.message = Some(format!("Archived {}", creator.name));
                    self.reload()?;
                }
            }

            AppAction::RestoreCreator => {
                if let Some(creator) = self.selected_creator().cloned() {
                    self.registry.restore(&creator.id)?;
                    self.message = Some(format!("Restored {}", creator.name));
                    self.reload()?;
                }
            }

            AppAction::MoveCreatorUp | AppAction::MoveCreatorDown => {
                if let Some(id) = self.selected_creator().map(|c| c.id.clone()) {
                    if action == AppAction::MoveCreatorUp {
                        self.registry.move_up(&id)?;
                    } else {
                        self.registry.move_down(&id)?;
                    }
                    self.reload()?;
                    if let Some(idx) = self.rows.iter().position(|r| r.creator.id == id) {
                        self.selected_index = idx;
                    }
                }
            }

            AppAction::ResetAll => {
                let active = self.registry.list_active()?;
                self.tracker.reset_all(&active)?;
                self.message = Some("Checklist cleared".to_string());
                self.reload()?;
            }

            AppAction::RefreshProfiles => self.refresh_profiles(),

            AppAction::ToggleArchivedView => {
                self.view = match self.view {
                    View::Checklist => View::Archived,
                    View::Archived => View::Checklist,
                };
                self.selected_index = 0;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }
        }

        Ok(())
    }

    fn reset_if_due(&mut self) -> Result<bool> {
        let active = self.registry.list_active()?;
        let reset = self
            .tracker
            .check_and_reset_if_needed(self.clock.now(), &active)?;
        if reset {
            self.reload()?;
        }
        Ok(reset)
    }

    fn confirm_status(&mut self, creator_id: &str, status: CreatorStatus) -> Result<()> {
        self.tracker.set_status(creator_id, status)?;

        if let Some(creator) = self.registry.get(creator_id)? {
            if creator.has_new {
                self.registry.update(
                    creator_id,
                    CreatorUpdate {
                        has_new: Some(false),
                        ..Default::default()
                    },
                )?;
            }
            self.spawn_lookup(
                LookupPurpose::StatusConfirmed,
                vec![(creator.id, creator.username)],
            );
        }

        self.reload()
    }

    /// `text` is a note.com link, optionally followed by a display name.
    fn add_creator(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        let (link, display_name) = text
            .split_once(char::is_whitespace)
            .unwrap_or((text, ""));
        let Some(username) = parse_identifier(link) else {
            self.message = Some("Enter a note.com URL".to_string());
            return Ok(());
        };

        let creator = self.registry.add(&username, display_name)?;
        self.message = Some(format!("Added {}", creator.name));
        self.view = View::Checklist;
        self.reload()?;
        self.selected_index = self.rows.len().saturating_sub(1);

        self.spawn_lookup(
            LookupPurpose::Registered,
            vec![(creator.id, creator.username)],
        );
        Ok(())
    }

    fn rename_creator(&mut self, id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.registry.update(id, CreatorUpdate::rename(name))?;
        self.reload()
    }

    pub fn refresh_profiles(&mut self) {
        let targets = self
            .rows
            .iter()
            .map(|r| (r.creator.id.clone(), r.creator.username.clone()))
            .collect();
        self.spawn_lookup(LookupPurpose::Refresh, targets);
    }

    fn spawn_lookup(&mut self, purpose: LookupPurpose, targets: Vec<(String, String)>) {
        let Some(client) = self.lookup.clone() else {
            return;
        };
        if targets.is_empty() {
            return;
        }

        self.pending_lookups += 1;
        let tx = self.lookup_tx.clone();

        tokio::spawn(async move {
            let results = client.refresh_all(targets).await;
            let _ = tx.send(LookupResults { purpose, results }).await;
        });
    }

    /// Apply finished lookups (non-blocking). Failures leave state as it was.
    pub fn poll_lookup_results(&mut self) -> Result<()> {
        let mut changed = false;
        while let Ok(batch) = self.lookup_rx.try_recv() {
            self.pending_lookups = self.pending_lookups.saturating_sub(1);
            changed |= self.apply_lookup_results(batch)?;
        }
        if changed {
            self.reload()?;
        }
        Ok(())
    }

    fn apply_lookup_results(&mut self, batch: LookupResults) -> Result<bool> {
        let mut changed = false;
        let now = Utc::now();

        for (id, result) in batch.results {
            let profile = match result {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!("Profile lookup for {} failed: {}", id, e);
                    continue;
                }
            };

            // The creator may have been removed by an import meanwhile
            let Some(creator) = self.registry.get(&id)? else {
                continue;
            };

            let update = profile_update(&creator, &profile, batch.purpose, now);
            if update.is_empty() {
                continue;
            }
            match self.registry.update(&id, update) {
                Ok(_) => changed = true,
                Err(AppError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(changed)
    }
}
