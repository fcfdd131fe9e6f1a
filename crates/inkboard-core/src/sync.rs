//! Relay boundary for multi-user sessions.
//!
//! The relay only forwards opaque payloads between the participants of a
//! session. Payloads are JSON-encoded [`RelayMessage`]s; the last message
//! applied wins.

use crate::element::{Element, ElementId};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// Relay errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Failed to decode relay payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Not joined to session {0}")]
    NotJoined(Uuid),
    #[error("Relay unavailable: {0}")]
    Unavailable(String),
}

/// Changes exchanged between participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayMessage {
    /// Whole-scene replacement (undo/redo, document load).
    SceneReplace { scene: Scene },
    /// One element created or changed.
    ElementPatch { element: Element },
    /// One element erased.
    ElementRemoved { id: ElementId },
}

impl RelayMessage {
    /// Encode as an opaque payload.
    pub fn encode(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(payload: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Pub/sub transport: broadcast to every other participant of a session.
pub trait Relay {
    fn join(&self, session: Uuid) -> Result<(), SyncError>;

    /// Send `payload` to every participant of `session` except this one.
    fn broadcast(&self, session: Uuid, payload: &str) -> Result<(), SyncError>;

    /// Take the payloads delivered to this participant, oldest first.
    fn poll(&self, session: Uuid) -> Result<Vec<String>, SyncError>;
}

type Mailboxes = HashMap<Uuid, HashMap<Uuid, VecDeque<String>>>;

/// In-process hub that [`LoopbackRelay`] participants connect to.
#[derive(Debug, Clone, Default)]
pub struct LoopbackHub {
    sessions: Arc<Mutex<Mailboxes>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a new participant.
    pub fn connect(&self) -> LoopbackRelay {
        LoopbackRelay {
            peer: Uuid::new_v4(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

/// In-memory [`Relay`] participant.
#[derive(Debug, Clone)]
pub struct LoopbackRelay {
    peer: Uuid,
    sessions: Arc<Mutex<Mailboxes>>,
}

impl LoopbackRelay {
    pub fn peer_id(&self) -> Uuid {
        self.peer
    }

    fn with_sessions<T>(&self, f: impl FnOnce(&mut Mailboxes) -> T) -> Result<T, SyncError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| SyncError::Unavailable(format!("Lock error: {}", e)))?;
        Ok(f(&mut sessions))
    }
}

impl Relay for LoopbackRelay {
    fn join(&self, session: Uuid) -> Result<(), SyncError> {
        self.with_sessions(|sessions| {
            sessions
                .entry(session)
                .or_default()
                .entry(self.peer)
                .or_default();
        })?;
        log::debug!("Peer {} joined session {}", self.peer, session);
        Ok(())
    }

    fn broadcast(&self, session: Uuid, payload: &str) -> Result<(), SyncError> {
        self.with_sessions(|sessions| {
            let peers = sessions
                .get_mut(&session)
                .filter(|peers| peers.contains_key(&self.peer))
                .ok_or(SyncError::NotJoined(session))?;
            for (peer, mailbox) in peers.iter_mut() {
                if *peer != self.peer {
                    mailbox.push_back(payload.to_string());
                }
            }
            Ok(())
        })?
    }

    fn poll(&self, session: Uuid) -> Result<Vec<String>, SyncError> {
        self.with_sessions(|sessions| {
            sessions
                .get_mut(&session)
                .and_then(|peers| peers.get_mut(&self.peer))
                .map(|mailbox| mailbox.drain(..).collect())
                .ok_or(SyncError::NotJoined(session))
        })?
    }
}
