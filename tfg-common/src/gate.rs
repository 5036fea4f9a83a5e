//! Password gates
//!
//! Two independent Locked/Unlocked switches per browser session: one for
//! viewing the gallery, one for the admin tools. They are a UX barrier only.
//! The passwords are shared plaintext values, there is no lockout, and the
//! only way back to Locked is to drop the session (reloading the page does).

use std::collections::HashMap;
use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

const TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateKind {
    /// Viewing the gallery
    Site,
    /// Import and editing
    Admin,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::Site => write!(f, "site"),
            GateKind::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    #[default]
    Locked,
    Unlocked,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("{message}")]
    WrongPassword { gate: GateKind, message: String },

    #[error("unknown or expired session")]
    UnknownSession,
}

/// The two shared passwords, injected from configuration
#[derive(Clone)]
pub struct GateSecrets {
    site: String,
    admin: String,
}

impl GateSecrets {
    pub fn new(site: impl Into<String>, admin: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            admin: admin.into(),
        }
    }

    fn expected(&self, kind: GateKind) -> &str {
        match kind {
            GateKind::Site => &self.site,
            GateKind::Admin => &self.admin,
        }
    }
}

// never print the passwords
impl fmt::Debug for GateSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateSecrets").finish_non_exhaustive()
    }
}

/// One Locked/Unlocked switch
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    kind: GateKind,
    state: GateState,
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        Self {
            kind,
            state: GateState::Locked,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == GateState::Unlocked
    }

    /// Locked -> Unlocked on an exact match; a wrong attempt stays Locked
    ///
    /// Submitting to an already unlocked gate is checked the same way but
    /// never locks it again.
    pub fn submit(&mut self, attempt: &str, secrets: &GateSecrets) -> Result<GateState, GateError> {
        let kind = self.kind;
        if attempt == secrets.expected(kind) {
            self.state = GateState::Unlocked;
            Ok(self.state)
        } else {
            Err(GateError::WrongPassword {
                gate: kind,
                message: wrong_password_message(kind).to_string(),
            })
        }
    }
}

pub fn wrong_password_message(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Site => "密碼錯誤，請重新輸入",
        GateKind::Admin => "管理員密碼錯誤",
    }
}

/// Both gates of one browser session
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub site: Gate,
    pub admin: Gate,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            site: Gate::new(GateKind::Site),
            admin: Gate::new(GateKind::Admin),
        }
    }
}

impl Session {
    pub fn gate(&self, kind: GateKind) -> &Gate {
        match kind {
            GateKind::Site => &self.site,
            GateKind::Admin => &self.admin,
        }
    }

    pub fn gate_mut(&mut self, kind: GateKind) -> &mut Gate {
        match kind {
            GateKind::Site => &mut self.site,
            GateKind::Admin => &mut self.admin,
        }
    }
}

/// Sessions held before the least recently used one is dropped
pub const MAX_SESSIONS: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Tracked {
    session: Session,
    last_seen: u64,
}

/// Sessions plus a logical clock for recency
#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Tracked>,
    clock: u64,
}

impl Sessions {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, token: &str) -> Option<&mut Session> {
        let now = self.tick();
        self.entries.get_mut(token).map(|tracked| {
            tracked.last_seen = now;
            &mut tracked.session
        })
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, tracked)| tracked.last_seen)
            .map(|(token, _)| token.clone());
        if let Some(token) = oldest {
            self.entries.remove(&token);
            debug!("Dropped least recently used gallery session");
        }
    }
}

/// Transient sessions, held in memory only
///
/// The page keeps its token in a JS variable, so a reload starts over with
/// both gates locked. Restarting the server forgets every session. At most
/// `capacity` sessions are kept; opening one more drops the session that
/// was used least recently.
pub struct SessionRegistry {
    sessions: RwLock<Sessions>,
    capacity: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `capacity` is raised to at least 1
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(Sessions::default()),
            capacity: capacity.max(1),
        }
    }

    /// Open a session with both gates locked and return its token
    pub async fn open(&self) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let mut sessions = self.sessions.write().await;
        while sessions.entries.len() >= self.capacity {
            sessions.evict_least_recent();
        }
        let last_seen = sessions.tick();
        sessions.entries.insert(
            token.clone(),
            Tracked {
                session: Session::default(),
                last_seen,
            },
        );
        debug!("Opened gallery session, {} open", sessions.entries.len());
        token
    }

    /// Current state of a session; counts as use
    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.write().await.touch(token).copied()
    }

    /// Try a password against one gate of a session
    pub async fn unlock(
        &self,
        token: &str,
        kind: GateKind,
        attempt: &str,
        secrets: &GateSecrets,
    ) -> Result<Session, GateError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.touch(token).ok_or(GateError::UnknownSession)?;
        session.gate_mut(kind).submit(attempt, secrets)?;
        info!("Unlocked {} gate for a session", kind);
        Ok(*session)
    }

    pub async fn is_unlocked(&self, token: &str, kind: GateKind) -> bool {
        self.get(token)
            .await
            .is_some_and(|session| session.gate(kind).is_unlocked())
    }

    /// Number of sessions currently held
    pub async fn open_count(&self) -> usize {
        self.sessions.read().await.entries.len()
    }
}
