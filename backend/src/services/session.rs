//! View sessions and their play loop.
//!
//! A session owns the user-selected parameters of one map view. Its state lives
//! in a `watch` channel: every mutation goes through the sender, and stream
//! subscribers observe each change. Playing spawns a tokio interval task that
//! advances the time position and wraps to the start at the end of the index.
//! The task is aborted on pause, on speed change (then restarted), on delete
//! and when the session is dropped.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::api::{SessionInfo, SessionState, SessionUpdate, SessionView};
use crate::data::Dataset;
use crate::models::{PlaySpeed, RegionCode};
use crate::services::frame::build_frame_view;
use crate::services::region_series::extract_region_series;

/// Session lookup and playback errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error("Cannot play a time index of {len} bucket(s)")]
    NoTimeIndex { len: usize },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Position after `t` in an index of `len` entries, wrapping to 0.
pub fn next_position(t: usize, len: usize) -> usize {
    if t + 1 >= len {
        0
    } else {
        t + 1
    }
}

/// Clamp a scrub target into `[0, len - 1]`.
pub fn clamp_position(t: usize, len: usize) -> usize {
    t.min(len.saturating_sub(1))
}

/// One view session.
#[derive(Debug)]
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    state: Arc<watch::Sender<SessionState>>,
    player: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(SessionState {
            playing: false,
            ..initial
        });
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            state: Arc::new(tx),
            player: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id.clone(),
            created_at: self.created_at,
            state: self.state(),
        }
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.player
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Apply a partial update against a time index of `len` entries.
    ///
    /// A speed change while playing restarts the timer at the new interval.
    pub fn apply(&self, update: SessionUpdate, len: usize) {
        // Held across the state change and the restart so a concurrent pause
        // cannot land in between.
        let mut player = self.player.lock();
        let speed_changed = update
            .speed
            .is_some_and(|speed| speed != self.state.borrow().speed);

        self.state.send_if_modified(|s| {
            let before = s.clone();
            if let Some(t) = update.t {
                s.t = clamp_position(t, len);
            }
            if let Some(view) = update.view_mode {
                s.view_mode = view;
            }
            if let Some(model) = update.model {
                s.model = model;
            }
            if let Some(pinned) = update.pinned {
                s.pinned = pinned
                    .map(|r| RegionCode::normalize(r.as_str()))
                    .filter(|r| !r.is_empty());
            }
            if let Some(speed) = update.speed {
                s.speed = speed;
            }
            *s != before
        });

        if speed_changed && player.as_ref().is_some_and(|h| !h.is_finished()) {
            self.start_loop(&mut player, len);
        }
    }

    /// Start advancing the position once per tick of the session's speed.
    pub fn play(&self, len: usize) -> SessionResult<()> {
        if len <= 1 {
            return Err(SessionError::NoTimeIndex { len });
        }
        let mut player = self.player.lock();
        self.state.send_if_modified(|s| {
            let t = clamp_position(s.t, len);
            let changed = !s.playing || s.t != t;
            s.playing = true;
            s.t = t;
            changed
        });
        self.start_loop(&mut player, len);
        Ok(())
    }

    /// Stop the play loop and release its timer.
    pub fn pause(&self) {
        let mut player = self.player.lock();
        self.abort_loop(&mut player);
        self.state.send_if_modified(|s| {
            let was_playing = s.playing;
            s.playing = false;
            was_playing
        });
    }

    fn start_loop(&self, player: &mut Option<JoinHandle<()>>, len: usize) {
        let speed = self.state.borrow().speed;
        let handle = spawn_play_loop(Arc::clone(&self.state), speed, len);
        if let Some(previous) = player.replace(handle) {
            previous.abort();
        }
        log::debug!("Session {} playing at {:?}", self.id, speed);
    }

    fn abort_loop(&self, player: &mut Option<JoinHandle<()>>) {
        if let Some(handle) = player.take() {
            handle.abort();
            log::debug!("Session {} play loop stopped", self.id);
        }
    }

    fn stop_loop(&self) {
        self.abort_loop(&mut self.player.lock());
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(handle) = self.player.get_mut().take() {
            handle.abort();
        }
    }
}

fn spawn_play_loop(
    state: Arc<watch::Sender<SessionState>>,
    speed: PlaySpeed,
    len: usize,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(speed.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.send_modify(|s| s.t = next_position(s.t, len));
        }
    })
}

/// In-memory session registry.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from `initial` (never playing) and return its info.
    pub fn create(&self, initial: SessionState) -> SessionInfo {
        let session = Arc::new(Session::new(initial));
        let info = session.info();
        self.sessions
            .write()
            .insert(session.id.clone(), Arc::clone(&session));
        log::info!("Session {} created", info.session_id);
        info
    }

    pub fn get(&self, id: &str) -> SessionResult<Arc<Session>> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn info(&self, id: &str) -> SessionResult<SessionInfo> {
        Ok(self.get(id)?.info())
    }

    pub fn update(&self, id: &str, update: SessionUpdate, len: usize) -> SessionResult<SessionInfo> {
        let session = self.get(id)?;
        session.apply(update, len);
        Ok(session.info())
    }

    pub fn play(&self, id: &str, len: usize) -> SessionResult<SessionInfo> {
        let session = self.get(id)?;
        session.play(len)?;
        Ok(session.info())
    }

    pub fn pause(&self, id: &str) -> SessionResult<SessionInfo> {
        let session = self.get(id)?;
        session.pause();
        Ok(session.info())
    }

    pub fn subscribe(&self, id: &str) -> SessionResult<watch::Receiver<SessionState>> {
        Ok(self.get(id)?.subscribe())
    }

    /// Remove a session and stop its play loop.
    pub fn delete(&self, id: &str) -> SessionResult<()> {
        let session = self
            .sessions
            .write()
            .remove(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.stop_loop();
        log::info!("Session {} deleted", id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Frame and pinned series for a session state.
pub fn session_view(dataset: &Dataset, session_id: &str, state: SessionState) -> SessionView {
    let frame = build_frame_view(dataset, state.t, state.view_mode, state.model);
    let pinned = state
        .pinned
        .as_ref()
        .map(|region| extract_region_series(dataset, region, frame.t, state.model, &frame.aggregates));
    SessionView {
        session_id: session_id.to_string(),
        state,
        frame,
        pinned,
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
