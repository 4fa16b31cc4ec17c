use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, warn};

use crate::config::{ConfigStore, Settings, Toggle};
use crate::history::{HistoryDb, SessionRecord, SessionSummary, HISTORY_LIMIT};
use crate::notes::{note_stats, NoteStats, NoteStore};
use crate::runtime::AppEvent;
use crate::session::{Feedback, Session, TypingEngine};

/// Ticks a transient status message stays on screen.
pub const STATUS_TICKS: u16 = 10;

/// Rows on the settings screen: every toggle, then the theme.
pub const SETTINGS_ROWS: usize = Toggle::ALL.len() + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Screen {
    Home,
    Editor,
    Practice,
    Summary,
    History,
    Settings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    ticks_left: u16,
}

/// Everything the app persists to.
pub struct Stores {
    pub notes: Box<dyn NoteStore>,
    pub config: Box<dyn ConfigStore>,
    /// `None` when the history database could not be opened.
    pub history: Option<HistoryDb>,
}

pub struct App {
    pub screen: Screen,
    pub settings: Settings,
    /// Editor buffer.
    pub note: String,
    /// Full practice input, rebuilt from key presses.
    pub typed: String,
    pub engine: TypingEngine,
    pub feedback: Option<Feedback>,
    /// Outcome of the practice run that led to the summary screen.
    pub result: Option<SessionSummary>,
    /// Newest first.
    pub history: Vec<SessionRecord>,
    pub status: Option<Status>,
    pub settings_cursor: usize,
    pub should_quit: bool,
    stores: Stores,
}

impl App {
    pub fn new(settings: Settings, stores: Stores) -> Self {
        let note = stores.notes.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load saved note");
            String::new()
        });

        let mut app = Self {
            screen: Screen::Home,
            engine: TypingEngine::new(settings.stats_interval()),
            settings,
            note,
            typed: String::new(),
            feedback: None,
            result: None,
            history: Vec::new(),
            status: None,
            settings_cursor: 0,
            should_quit: false,
            stores,
        };
        app.refresh_history();
        app
    }

    pub fn session(&self) -> Option<&Session> {
        self.engine.session()
    }

    /// Most recent stored session, shown on the home screen.
    pub fn last_session(&self) -> Option<&SessionRecord> {
        if self.settings.history_enabled {
            self.history.first()
        } else {
            None
        }
    }

    pub fn note_stats(&self) -> NoteStats {
        note_stats(&self.note)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            ticks_left: STATUS_TICKS,
        });
    }

    /// Replace the note wholesale (e.g. from a file) and persist it.
    pub fn replace_note(&mut self, text: &str) {
        self.note = text.trim().to_owned();
        self.save_note(false);
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Paste(text) => self.on_paste(&text),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize => {}
        }
    }

    fn on_tick(&mut self) {
        if let Some(status) = self.status.as_mut() {
            status.ticks_left = status.ticks_left.saturating_sub(1);
            if status.ticks_left == 0 {
                self.status = None;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Home => self.on_home_key(key),
            Screen::Editor => self.on_editor_key(key),
            Screen::Practice => self.on_practice_key(key),
            Screen::Summary => self.on_summary_key(key),
            Screen::History => self.on_history_key(key),
            Screen::Settings => self.on_settings_key(key),
        }
    }

    fn on_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('e') | KeyCode::Enter => self.screen = Screen::Editor,
            KeyCode::Char('p') => self.start_practice(),
            KeyCode::Char('h') => self.screen = Screen::History,
            KeyCode::Char('s') => self.screen = Screen::Settings,
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    /// ctrl+d / ctrl+enter, honoured only while shortcuts are enabled.
    fn is_finish_chord(&self, key: &KeyEvent) -> bool {
        self.settings.shortcuts_enabled
            && key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('d') | KeyCode::Enter)
    }

    fn on_editor_key(&mut self, key: KeyEvent) {
        if self.is_finish_chord(&key) {
            self.end_writing();
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Char('s') if ctrl => {
                if self.save_note(false) {
                    self.set_status("Note saved");
                }
            }
            KeyCode::Enter if !ctrl => self.edit_note(|note| note.push('\n')),
            KeyCode::Backspace => self.edit_note(|note| {
                note.pop();
            }),
            KeyCode::Char(c) if !ctrl => self.edit_note(|note| note.push(c)),
            _ => {}
        }
    }

    fn edit_note(&mut self, edit: impl FnOnce(&mut String)) {
        edit(&mut self.note);
        if self.settings.auto_save && self.save_note(true) {
            self.set_status("saved");
        }
    }

    /// Persist the editor buffer. Returns whether it was written.
    fn save_note(&mut self, silent: bool) -> bool {
        match self.stores.notes.save(&self.note) {
            Ok(()) => {
                if !silent {
                    debug!(chars = self.note.chars().count(), "note saved");
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "could not save note");
                self.set_status(format!("Could not save note: {e}"));
                false
            }
        }
    }

    /// Finish a writing session: save, then show the note summary or go home.
    pub fn end_writing(&mut self) {
        self.save_note(false);

        if self.settings.auto_practice {
            self.result = None;
            self.screen = Screen::Summary;
        } else {
            self.reset_session();
            self.screen = Screen::Home;
        }
    }

    pub fn start_practice(&mut self) {
        let reference = self.stores.notes.load().unwrap_or_else(|e| {
            warn!(error = %e, "could not load note, practicing the editor buffer");
            self.note.trim().to_owned()
        });

        if reference.is_empty() {
            self.set_status("Write a note before practicing");
            return;
        }

        self.engine.set_stats_interval(self.settings.stats_interval());
        let session = self.engine.start(reference);
        info!(length = session.reference_len(), "practice started");

        self.typed.clear();
        self.feedback = self.engine.on_input_changed(&self.typed).ok();
        self.result = None;
        self.screen = Screen::Practice;
    }

    fn on_practice_key(&mut self, key: KeyEvent) {
        if self.is_finish_chord(&key) {
            self.finish_practice();
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.abandon_practice(),
            KeyCode::Enter if !ctrl => self.type_input(|typed| typed.push('\n')),
            KeyCode::Backspace => self.type_input(|typed| {
                typed.pop();
            }),
            KeyCode::Char(c) if !ctrl => self.type_input(|typed| typed.push(c)),
            _ => {}
        }
    }

    fn on_paste(&mut self, text: &str) {
        match self.screen {
            Screen::Editor => self.edit_note(|note| note.push_str(text)),
            Screen::Practice if self.settings.disable_paste => {
                debug!(chars = text.chars().count(), "paste blocked");
                self.set_status("Paste is disabled while practicing");
            }
            Screen::Practice => self.type_input(|typed| typed.push_str(text)),
            _ => {}
        }
    }

    fn type_input(&mut self, edit: impl FnOnce(&mut String)) {
        edit(&mut self.typed);

        match self.engine.on_input_changed(&self.typed) {
            Ok(feedback) => {
                let complete = feedback.complete;
                self.feedback = Some(feedback);
                if complete {
                    self.finish_practice();
                }
            }
            Err(e) => warn!(error = %e, "input ignored"),
        }
    }

    /// End the practice run, record it and show the summary.
    pub fn finish_practice(&mut self) {
        let Some(session) = self.engine.finish() else {
            return;
        };

        let summary = SessionSummary::from_session(&session, Local::now());
        info!(
            wpm = summary.wpm,
            accuracy = summary.accuracy,
            complete = session.is_complete(),
            "practice finished"
        );

        if self.settings.history_enabled {
            self.record(&summary);
        }

        self.result = Some(summary);
        self.typed.clear();
        self.feedback = None;
        self.screen = Screen::Summary;
    }

    fn abandon_practice(&mut self) {
        if self.engine.finish().is_some() {
            debug!("practice abandoned");
        }
        self.typed.clear();
        self.feedback = None;
        self.screen = Screen::Home;
    }

    fn record(&mut self, summary: &SessionSummary) {
        let Some(db) = self.stores.history.as_ref() else {
            return;
        };

        match db.record(summary) {
            Ok(record) => {
                self.history.insert(0, record);
                self.history.truncate(HISTORY_LIMIT);
            }
            Err(e) => {
                warn!(error = %e, "could not record practice session");
                self.set_status("Could not save practice history");
            }
        }
    }

    fn refresh_history(&mut self) {
        let Some(db) = self.stores.history.as_ref() else {
            self.history.clear();
            return;
        };

        match db.recent() {
            Ok(records) => self.history = records,
            Err(e) => warn!(error = %e, "could not read practice history"),
        }
    }

    fn reset_session(&mut self) {
        if self.settings.clear_session {
            self.note.clear();
        }
        self.engine.finish();
        self.typed.clear();
        self.feedback = None;
    }

    fn on_summary_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('p') | KeyCode::Char('r') => self.start_practice(),
            KeyCode::Char('e') => self.screen = Screen::Editor,
            KeyCode::Char('h') => self.screen = Screen::History,
            KeyCode::Char('b') | KeyCode::Esc => {
                if self.settings.clear_session {
                    self.reset_session();
                }
                self.screen = Screen::Home;
            }
            _ => {}
        }
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('p') => self.start_practice(),
            KeyCode::Char('x') => self.clear_history(),
            KeyCode::Char('b') | KeyCode::Esc => self.screen = Screen::Home,
            _ => {}
        }
    }

    fn clear_history(&mut self) {
        let Some(db) = self.stores.history.as_ref() else {
            return;
        };

        match db.clear() {
            Ok(()) => {
                info!("practice history cleared");
                self.history.clear();
                self.set_status("History cleared");
            }
            Err(e) => {
                warn!(error = %e, "could not clear practice history");
                self.set_status("Could not clear history");
            }
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_cursor = self.settings_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_cursor = (self.settings_cursor + 1).min(SETTINGS_ROWS - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => match Toggle::ALL.get(self.settings_cursor) {
                Some(toggle) => self.toggle_setting(*toggle),
                None => self.cycle_theme(),
            },
            KeyCode::Char('b') | KeyCode::Esc => self.screen = Screen::Home,
            _ => {}
        }
    }

    /// Flip a setting for this run and persist only that change, so
    /// command-line overrides never leak into the saved file.
    pub fn toggle_setting(&mut self, toggle: Toggle) {
        let value = self.settings.toggle(toggle);
        info!(setting = %toggle, value, "setting changed");

        let mut persisted = self.stores.config.load();
        persisted.set(toggle, value);
        if let Err(e) = self.stores.config.save(&persisted) {
            warn!(error = %e, "could not save settings");
            self.set_status("Could not save settings");
        }

        if toggle == Toggle::HistoryEnabled && value {
            self.refresh_history();
        }
    }

    /// Move to the next theme and persist it the same way as a toggle.
    pub fn cycle_theme(&mut self) {
        self.settings.theme = self.settings.theme.next();
        info!(theme = %self.settings.theme, "theme changed");

        let mut persisted = self.stores.config.load();
        persisted.theme = self.settings.theme;
        if let Err(e) = self.stores.config.save(&persisted) {
            warn!(error = %e, "could not save settings");
            self.set_status("Could not save settings");
        }
    }
}
