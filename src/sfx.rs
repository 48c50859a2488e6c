use crate::session::GameEvent;

/// Default playback volume for effect cues.
pub const SFX_VOLUME: f32 = 0.3;

/// Sound cue ids the host's audio layer resolves to actual clips.
pub const SFX_MOVE: &str = "move";
pub const SFX_ROTATE: &str = "rotate";
pub const SFX_DROP: &str = "drop";
pub const SFX_LINE_CLEAR: &str = "lineClear";
pub const SFX_GAME_OVER: &str = "gameOver";

/// Cue to play for a simulation event, if any. Successful moves share one
/// cue regardless of direction; locking has its own, and a clear layers its
/// cue on top of the lock that produced it.
pub fn sound_for_event(event: &GameEvent) -> Option<&'static str> {
    match event {
        GameEvent::PieceMoved => Some(SFX_MOVE),
        GameEvent::PieceRotated => Some(SFX_ROTATE),
        GameEvent::PieceLocked => Some(SFX_DROP),
        GameEvent::LinesCleared { .. } => Some(SFX_LINE_CLEAR),
        GameEvent::GameOver => Some(SFX_GAME_OVER),
        GameEvent::PieceSpawned
        | GameEvent::Paused
        | GameEvent::Resumed
        | GameEvent::Restarted
        | GameEvent::MuteToggled { .. } => None,
    }
}

/// Volume after applying the player's mute preference.
pub fn effective_volume(muted: bool) -> f32 {
    if muted { 0.0 } else { SFX_VOLUME }
}
