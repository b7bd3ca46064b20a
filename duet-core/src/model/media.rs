use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Audio, MediaKind::Video];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTrack {
    pub id: String,
    pub kind: MediaKind,
}

impl MediaTrack {
    pub fn audio(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Audio,
        }
    }

    pub fn video(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Video,
        }
    }
}

/// Handle to a media stream: a stream id plus its tracks. Capture and
/// rendering live outside this crate; the handle only names what exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaHandle {
    pub id: String,
    pub tracks: Vec<MediaTrack>,
}

impl MediaHandle {
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn track(&self, kind: MediaKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    /// Per kind, what has to change to go from this stream to `other`:
    /// `Some` for a new or swapped track, `None` for a removed one.
    pub fn track_changes<'a>(
        &self,
        other: &'a MediaHandle,
    ) -> Vec<(MediaKind, Option<&'a MediaTrack>)> {
        MediaKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let next = other.track(kind);
                let unchanged = self.track(kind).map(|t| &t.id) == next.map(|t| &t.id);
                (!unchanged).then_some((kind, next))
            })
            .collect()
    }

    /// Puts `track` in the slot for `kind`, or empties the slot.
    pub fn set_track(&mut self, kind: MediaKind, track: Option<MediaTrack>) {
        self.tracks.retain(|t| t.kind != kind);
        self.tracks.extend(track);
    }
}
