//! Synchronization controller
//!
//! Owns the lyric track and the sync cursor for one editing session. User
//! commands and playback events come in here; the controller mutates the
//! track, keeps the cursor in range, asks the playback port to seek/play,
//! and queues notifications for the host. It is the only writer of the
//! track.
//!
//! Manual tagging workflow: play the song and press "next line" on every
//! line change. Each press closes the current line (end time, if unset) and
//! opens the next one (start time) at the same playback instant.

use serde::{Deserialize, Serialize};

use super::notification::Notification;
use super::resolver::{self, ActivePosition};
use super::shortcuts::{map_key, KeyInput, ShortcutAction};
use crate::config::SyncConfig;
use crate::models::{
    AdditionalLine, AudioReference, EnrichmentField, LyricTrack, ProjectDraft, SavedProject,
    TrackEdit, TrackError,
};
use crate::playback::{MirroredPlayback, PlaybackError, PlaybackEvent, PlaybackPort, PlaybackRate};
use crate::renderers::karaoke::{self, DisplayPlan};
use crate::storage::{BlobStore, ProjectRepository, StoreError};
use crate::utils::DebounceTimer;

/// Project metadata carried alongside the track
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Set once the project exists in storage; saves then update it
    pub project_id: Option<String>,
    pub title: String,
    pub artist: String,
    #[serde(flatten)]
    pub audio: AudioReference,
}

/// How a session is opened
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OpenRequest {
    /// Fresh project from pasted lyrics
    #[serde(rename_all = "camelCase")]
    New {
        title: String,
        artist: String,
        lyrics_text: String,
        #[serde(flatten)]
        audio: AudioReference,
    },
    /// Continue editing a saved project
    Existing { project: SavedProject },
}

/// What the cursor is currently driven by
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CursorMode {
    /// Following playback
    Idle,
    /// Moved by the user (line commands or click)
    Navigating,
    /// A line's text field is open; shortcuts are suppressed
    EditingText { line: usize },
}

pub struct SyncController<P: PlaybackPort = MirroredPlayback> {
    config: SyncConfig,
    session: SessionInfo,
    track: LyricTrack,
    cursor: usize,
    mode: CursorMode,
    port: P,
    active: ActivePosition,
    scroll: DebounceTimer<usize>,
    clock_ms: f64,
    notifications: Vec<Notification>,
}

impl SyncController<MirroredPlayback> {
    /// Start a session for a new or saved project
    pub fn open(request: OpenRequest, config: SyncConfig) -> Self {
        let (session, track) = match request {
            OpenRequest::New {
                title,
                artist,
                lyrics_text,
                audio,
            } => {
                log::info!("Opening new project '{}'", title);
                let session = SessionInfo {
                    project_id: None,
                    title,
                    artist,
                    audio,
                };
                (session, LyricTrack::from_raw_text(&lyrics_text))
            }
            OpenRequest::Existing { project } => {
                log::info!("Opening saved project {} ({} lines)", project.id, project.lyrics.len());
                let session = SessionInfo {
                    project_id: Some(project.id),
                    title: project.title,
                    artist: project.artist,
                    audio: project.audio,
                };
                (session, LyricTrack::from_saved(project.lyrics))
            }
        };

        let port = MirroredPlayback::new(session.audio.is_loaded());
        Self::with_port(session, track, port, config)
    }

    /// Open a project read from storage. A missing or unreadable project
    /// falls back to the placeholder session instead of failing.
    pub fn open_loaded(loaded: Result<Option<SavedProject>, StoreError>, config: SyncConfig) -> Self {
        match loaded {
            Ok(Some(project)) => Self::open(OpenRequest::Existing { project }, config),
            Ok(None) => {
                let mut controller = Self::placeholder(config);
                controller.notify(Notification::warning("Project not found, using test data"));
                controller
            }
            Err(e) => {
                log::warn!("Failed to load project: {}", e);
                let mut controller = Self::placeholder(config);
                controller.notify(Notification::error(format!("Could not load project: {}", e)));
                controller
            }
        }
    }

    /// Test session without audio
    pub fn placeholder(config: SyncConfig) -> Self {
        let session = SessionInfo {
            project_id: None,
            title: "Test Song".to_string(),
            artist: "Test Artist".to_string(),
            audio: AudioReference {
                audio_file_name: "test.mp3".to_string(),
                audio_data_url: None,
                audio_file_type: "audio/mpeg".to_string(),
            },
        };
        let mut controller = Self::with_port(
            session,
            LyricTrack::placeholder(),
            MirroredPlayback::new(false),
            config,
        );
        controller.notify(Notification::info("Using test data (no audio)"));
        controller
    }
}

impl<P: PlaybackPort> SyncController<P> {
    pub fn with_port(session: SessionInfo, track: LyricTrack, port: P, config: SyncConfig) -> Self {
        let scroll = DebounceTimer::new(config.scroll_delay_ms());
        let active = resolver::resolve(port.current_time(), track.lines(), &config);
        Self {
            config,
            session,
            track,
            cursor: 0,
            mode: CursorMode::Idle,
            port,
            active,
            scroll,
            clock_ms: 0.0,
            notifications: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn track(&self) -> &LyricTrack {
        &self.track
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn active(&self) -> &ActivePosition {
        &self.active
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn synced_count(&self) -> usize {
        self.track.synced_count()
    }

    /// Playback progress in percent, 0 while the duration is unknown
    pub fn progress_percent(&self) -> f64 {
        let duration = self.port.duration();
        if duration > 0.0 {
            self.port.current_time() / duration * 100.0
        } else {
            0.0
        }
    }

    pub fn display_plan(&self) -> DisplayPlan {
        karaoke::plan(&self.active, self.track.lines(), &self.config)
    }

    /// Notifications queued since the last call
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ------------------------------------------------------------------
    // Playback events
    // ------------------------------------------------------------------

    /// Feed one media event. `now_ms` is the host clock used for scroll
    /// debouncing.
    pub fn handle_event(&mut self, event: PlaybackEvent, now_ms: f64) {
        self.clock_ms = now_ms;
        self.port.observe(&event);

        match event {
            PlaybackEvent::TimeUpdate(time) => self.update_active_line(time, now_ms),
            PlaybackEvent::Error(message) => {
                log::warn!("Media error: {}", message);
                self.port.pause();
                self.notify(Notification::error(format!("Cannot play audio: {}", message)));
            }
            PlaybackEvent::DurationKnown(_)
            | PlaybackEvent::Play
            | PlaybackEvent::Pause
            | PlaybackEvent::Ended => {}
        }
    }

    /// Move focus to the line active at `time`. Focus changes immediately;
    /// only the scroll request is debounced.
    pub fn update_active_line(&mut self, time: f64, now_ms: f64) {
        self.active = resolver::resolve(time, self.track.lines(), &self.config);

        let focus = self.active.line.unwrap_or(0);
        if focus != self.cursor {
            self.cursor = focus;
            if !matches!(self.mode, CursorMode::EditingText { .. }) {
                self.mode = CursorMode::Idle;
            }
            self.scroll.schedule(focus, now_ms);
        }
    }

    /// When the pending scroll request becomes due (host clock, ms)
    pub fn scroll_deadline(&self) -> Option<f64> {
        self.scroll.deadline()
    }

    /// Line to scroll into view, once its debounce delay has passed
    pub fn poll_scroll(&mut self, now_ms: f64) -> Option<usize> {
        self.clock_ms = now_ms;
        self.scroll.poll(now_ms)
    }

    // ------------------------------------------------------------------
    // Manual sync
    // ------------------------------------------------------------------

    /// Stamp the current playback time as the start of `index`
    pub fn set_timestamp(&mut self, index: usize) -> bool {
        let time = self.port.current_time();
        let result = self.track.set_timestamp(index, time);
        self.commit(result, || format!("Set start time for line {}", index + 1))
    }

    /// Stamp the current playback time as the end of `index`
    pub fn set_end_time(&mut self, index: usize) -> bool {
        let time = self.port.current_time();
        let result = self.track.set_end_time(index, time);
        self.commit(result, || format!("Set end time for line {}", index + 1))
    }

    pub fn clear_timestamp(&mut self, index: usize) -> bool {
        let result = self.track.clear_timestamp(index);
        self.commit(result, || format!("Cleared timing for line {}", index + 1))
    }

    /// Close the current line and start the next one at the current time
    pub fn go_to_next_line(&mut self) -> bool {
        if self.cursor >= self.track.last_index() {
            self.notify(Notification::warning("Already at the last line"));
            return false;
        }

        let time = self.port.current_time();
        let current = self.cursor;
        let next = current + 1;

        let needs_end = self
            .track
            .get(current)
            .is_some_and(|line| line.end_time.is_none());

        let result = if needs_end {
            self.track.set_end_time(current, time)
        } else {
            Ok(self.track.clone())
        }
        .and_then(|track| track.set_timestamp(next, time));

        match result {
            Ok(track) => {
                self.replace_track(track);
                self.navigate_to(next);
                true
            }
            Err(e) => {
                self.reject(e);
                false
            }
        }
    }

    /// Undo the in-progress line and step back, seeking to the previous
    /// line's start when it has one
    pub fn go_to_previous_line(&mut self) -> bool {
        if self.cursor == 0 {
            self.notify(Notification::warning("Already at the first line"));
            return false;
        }

        let current = self.cursor;
        // Line 0 is never cleared; the guard above already excludes it
        if current != 0 {
            match self.track.clear_timestamp(current) {
                Ok(track) => self.replace_track(track),
                Err(e) => {
                    self.reject(e);
                    return false;
                }
            }
        }

        let previous = current - 1;
        if let Some(start) = self.track.get(previous).and_then(|line| line.timestamp) {
            self.seek_quietly(start);
        }
        self.navigate_to(previous);
        true
    }

    /// Click on a line: focus it and jump to its start
    pub fn select_line(&mut self, index: usize) -> bool {
        let Some(line) = self.track.get(index) else {
            self.reject(TrackError::OutOfRange {
                index,
                len: self.track.len(),
            });
            return false;
        };

        if let Some(start) = line.timestamp {
            self.seek_quietly(start);
        }
        self.navigate_to(index);
        true
    }

    // ------------------------------------------------------------------
    // Line editing
    // ------------------------------------------------------------------

    pub fn insert_line_above(&mut self, index: usize) -> bool {
        let result = self.track.insert_line_above(index, self.cursor);
        let inserted = self.commit_edit(result, "Added a line above");
        if inserted {
            self.shift_text_edit(index);
        }
        inserted
    }

    pub fn insert_line_below(&mut self, index: usize) -> bool {
        let result = self.track.insert_line_below(index, self.cursor);
        let inserted = self.commit_edit(result, "Added a line below");
        if inserted {
            self.shift_text_edit(index + 1);
        }
        inserted
    }

    pub fn delete_line(&mut self, index: usize) -> bool {
        let result = self.track.delete_line(index, self.cursor);
        let message = format!("Deleted line {}", index + 1);
        let deleted = self.commit_edit(result, &message);

        if deleted {
            if let CursorMode::EditingText { line } = self.mode {
                if line == index {
                    self.mode = CursorMode::Idle;
                } else if line > index {
                    self.mode = CursorMode::EditingText { line: line - 1 };
                }
            }
        }
        deleted
    }

    pub fn update_text(&mut self, index: usize, text: &str) -> bool {
        let result = self.track.update_text(index, text);
        self.commit(result, || format!("Updated line {}", index + 1))
    }

    pub fn update_enrichment(&mut self, index: usize, field: EnrichmentField, value: &str) -> bool {
        let result = self.track.update_enrichment(index, field, value);
        self.commit(result, || format!("Updated line {} details", index + 1))
    }

    pub fn update_additional_lines(&mut self, index: usize, additional: Vec<AdditionalLine>) -> bool {
        let result = self.track.update_additional_lines(index, additional);
        self.commit(result, || format!("Updated line {} details", index + 1))
    }

    /// A line's text field was opened; keyboard shortcuts stop firing
    pub fn begin_text_edit(&mut self, index: usize) -> bool {
        if index >= self.track.len() {
            return false;
        }
        self.mode = CursorMode::EditingText { line: index };
        // keep the row being edited where the user clicked it
        self.scroll.cancel();
        true
    }

    pub fn end_text_edit(&mut self) {
        if matches!(self.mode, CursorMode::EditingText { .. }) {
            self.mode = CursorMode::Idle;
        }
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    pub fn toggle_play_pause(&mut self) -> bool {
        if !self.port.has_media() {
            self.reject_playback(PlaybackError::NoMedia);
            return false;
        }

        if self.port.is_playing() {
            self.port.pause();
            return true;
        }

        match self.port.play() {
            Ok(()) => true,
            Err(e) => {
                self.port.pause();
                self.reject_playback(e);
                false
            }
        }
    }

    /// Seek by `delta` seconds, clamped to the media bounds
    pub fn seek_relative(&mut self, delta: f64) -> bool {
        if !self.port.has_media() {
            self.reject_playback(PlaybackError::NoMedia);
            return false;
        }
        let target = self.port.current_time() + delta;
        let duration = self.port.duration();
        let target = if duration > 0.0 { target.min(duration) } else { target };
        self.port.seek(target.max(0.0));
        true
    }

    pub fn seek_backward(&mut self) -> bool {
        self.seek_relative(-self.config.seek_step_secs)
    }

    pub fn seek_forward(&mut self) -> bool {
        self.seek_relative(self.config.seek_step_secs)
    }

    /// Progress-bar seek, `percent` in 0..=100
    pub fn seek_to_percent(&mut self, percent: f64) -> bool {
        if !self.port.has_media() {
            self.reject_playback(PlaybackError::NoMedia);
            return false;
        }
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        let duration = self.port.duration();
        self.port.seek(fraction * duration);
        true
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.port.set_playback_rate(rate);
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Dispatch a key event. Returns the action that ran, if any;
    /// `ShowHelp` is returned for the host to open the help dialog.
    pub fn handle_key(&mut self, input: &KeyInput) -> Option<ShortcutAction> {
        if matches!(self.mode, CursorMode::EditingText { .. }) {
            return None;
        }
        let action = map_key(input)?;
        let cursor = self.cursor;

        match action {
            ShortcutAction::TogglePlay => {
                self.toggle_play_pause();
            }
            ShortcutAction::PreviousLine => {
                self.go_to_previous_line();
            }
            ShortcutAction::NextLine => {
                self.go_to_next_line();
            }
            ShortcutAction::SeekBackward => {
                self.seek_backward();
            }
            ShortcutAction::SeekForward => {
                self.seek_forward();
            }
            ShortcutAction::SetEndTime => {
                self.set_end_time(cursor);
            }
            ShortcutAction::SetTimestamp => {
                self.set_timestamp(cursor);
            }
            ShortcutAction::InsertAbove => {
                self.insert_line_above(cursor);
            }
            ShortcutAction::InsertBelow => {
                self.insert_line_below(cursor);
            }
            ShortcutAction::DeleteLine => {
                self.delete_line(cursor);
            }
            ShortcutAction::ShowHelp => {}
        }
        Some(action)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Save payload for the current state. Taking a snapshot leaves the
    /// session free to keep handling time updates while the host writes it.
    pub fn snapshot(&self) -> ProjectDraft {
        ProjectDraft {
            project_id: self.session.project_id.clone(),
            title: self.session.title.clone(),
            artist: self.session.artist.clone(),
            lyrics: self.track.to_lines(),
            audio: self.session.audio.clone(),
        }
    }

    /// Record a completed save: later saves update the same project
    pub fn mark_saved(&mut self, project_id: &str) {
        let updating = self.session.project_id.is_some();
        self.session.project_id = Some(project_id.to_string());
        self.notify(Notification::success(if updating {
            "Project updated"
        } else {
            "Project saved"
        }));
    }

    /// Save through a repository. On failure the track is left as it was
    /// and the user can retry.
    pub fn save<S: BlobStore>(&mut self, repository: &mut ProjectRepository<S>) -> Option<SavedProject> {
        match repository.save(&self.snapshot()) {
            Ok(project) => {
                self.mark_saved(&project.id);
                Some(project)
            }
            Err(e) => {
                log::warn!("Save failed: {}", e);
                self.notify(Notification::error(format!("Could not save project: {}", e)));
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    fn commit<F>(&mut self, result: Result<LyricTrack, TrackError>, success: F) -> bool
    where
        F: FnOnce() -> String,
    {
        match result {
            Ok(track) => {
                self.replace_track(track);
                self.notify(Notification::success(success()));
                true
            }
            Err(e) => {
                self.reject(e);
                false
            }
        }
    }

    fn commit_edit(&mut self, result: Result<TrackEdit, TrackError>, success: &str) -> bool {
        match result {
            Ok(TrackEdit { track, cursor }) => {
                self.replace_track(track);
                self.cursor = cursor;
                self.notify(Notification::success(success));
                true
            }
            Err(e) => {
                self.reject(e);
                false
            }
        }
    }

    fn replace_track(&mut self, track: LyricTrack) {
        self.track = track;
        self.cursor = self.cursor.min(self.track.last_index());
        self.active = resolver::resolve(self.port.current_time(), self.track.lines(), &self.config);
    }

    /// Keep the open text field on its line after a row lands at `position`
    fn shift_text_edit(&mut self, position: usize) {
        if let CursorMode::EditingText { line } = self.mode {
            if position <= line {
                self.mode = CursorMode::EditingText { line: line + 1 };
            }
        }
    }

    fn navigate_to(&mut self, index: usize) {
        self.cursor = index;
        self.mode = CursorMode::Navigating;
        self.scroll.schedule(index, self.clock_ms);
    }

    /// Seek issued as a side effect of navigation; skipped without media
    fn seek_quietly(&mut self, time: f64) {
        if self.port.has_media() {
            self.port.seek(time);
            self.active = resolver::resolve(time, self.track.lines(), &self.config);
        }
    }

    fn reject(&mut self, error: TrackError) {
        log::debug!("Rejected track edit: {}", error);
        self.notify(Notification::warning(user_message(&error)));
    }

    fn reject_playback(&mut self, error: PlaybackError) {
        match error {
            PlaybackError::NoMedia => self.notify(Notification::warning("No audio file to play")),
            PlaybackError::PlayFailed(reason) => {
                self.notify(Notification::error(format!("Cannot play audio: {}", reason)))
            }
        }
    }
}

fn user_message(error: &TrackError) -> String {
    match error {
        TrackError::LastLine => "Cannot delete the last line".to_string(),
        TrackError::AnchorLine => "The first line always starts at its timestamp".to_string(),
        TrackError::OutOfRange { index, .. } => format!("Line {} does not exist", index + 1),
        TrackError::NegativeTime(_) => "Invalid playback time".to_string(),
    }
}
