use duet_core::{MediaHandle, Participant, Role, RoomId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the caller knows about the call right now. A session only runs while
/// a room, a local stream and the enabled flag are all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub is_initiator: bool,
    #[serde(default)]
    pub local_stream: Option<MediaHandle>,
    #[serde(default)]
    pub enabled: bool,
    pub user_id: UserId,
}

/// Why a session stays inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InertReason {
    #[error("no room id")]
    MissingRoom,

    #[error("session is disabled")]
    Disabled,

    #[error("no local media stream")]
    MissingLocalStream,
}

impl SessionOptions {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            room_id: None,
            is_initiator: false,
            local_stream: None,
            enabled: false,
            user_id: user_id.into(),
        }
    }

    pub fn with_room(mut self, room_id: impl Into<RoomId>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    pub fn with_initiator(mut self, is_initiator: bool) -> Self {
        self.is_initiator = is_initiator;
        self
    }

    pub fn with_local_stream(mut self, stream: MediaHandle) -> Self {
        self.local_stream = Some(stream);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn preconditions(&self) -> Result<(), InertReason> {
        match &self.room_id {
            Some(room) if !room.is_blank() => {}
            _ => return Err(InertReason::MissingRoom),
        }
        if !self.enabled {
            return Err(InertReason::Disabled);
        }
        if self.local_stream.is_none() {
            return Err(InertReason::MissingLocalStream);
        }
        Ok(())
    }

    pub fn participant(&self) -> Participant {
        Participant::new(
            self.user_id.clone(),
            Role::from_initiator_flag(self.is_initiator),
        )
    }

    /// True when both describe the same call attempt, ignoring the stream.
    pub(crate) fn same_call(&self, other: &SessionOptions) -> bool {
        self.room_id == other.room_id
            && self.is_initiator == other.is_initiator
            && self.user_id == other.user_id
            && self.enabled == other.enabled
    }
}
