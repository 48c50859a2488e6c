use crate::session::{GameEvent, Session};

/// Player commands accepted by the session reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    TogglePause,
    ToggleMute,
    Restart,
}

const COMMAND_SPECS: &[(&str, &str, Command)] = &[
    ("moveLeft", "Left", Command::MoveLeft),
    ("moveRight", "Right", Command::MoveRight),
    ("softDrop", "Down", Command::SoftDrop),
    ("rotate", "Rotate", Command::Rotate),
    ("togglePause", "Pause", Command::TogglePause),
    ("toggleMute", "Mute", Command::ToggleMute),
    ("restart", "Restart", Command::Restart),
];

/// Stable string ids for host key bindings and remote drivers.
pub fn command_from_id(id: &str) -> Option<Command> {
    COMMAND_SPECS
        .iter()
        .find_map(|(command_id, _, command)| (*command_id == id).then_some(*command))
}

pub fn command_label(command: Command) -> &'static str {
    COMMAND_SPECS
        .iter()
        .find_map(|(_, label, candidate)| (*candidate == command).then_some(*label))
        .unwrap_or("")
}

/// Route one command into the session. While the identity-capture modal is
/// open every command is swallowed so typing a name cannot steer the piece.
/// The session's own state gates handle pause and game over.
pub fn apply(session: &mut Session, command: Command) -> Vec<GameEvent> {
    if session.modal_open() {
        return Vec::new();
    }
    match command {
        Command::MoveLeft => session.move_piece(-1, 0),
        Command::MoveRight => session.move_piece(1, 0),
        Command::SoftDrop => session.move_piece(0, 1),
        Command::Rotate => session.rotate_piece(),
        Command::TogglePause => session.toggle_pause(),
        Command::ToggleMute => session.toggle_mute(),
        Command::Restart => session.restart(),
    }
}

/// Pure variant of `apply` for drivers that keep a history of states.
pub fn step(session: &Session, command: Command) -> Session {
    let mut next = session.clone();
    apply(&mut next, command);
    next
}
