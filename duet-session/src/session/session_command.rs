use duet_core::MediaHandle;

/// Commands sent from the controller to the running session task.
#[derive(Debug)]
pub enum SessionCommand {
    /// The local stream changed; swap outbound tracks in place.
    ReplaceTracks(MediaHandle),

    /// Tear the session down.
    Stop,
}
