use serde::{Deserialize, Serialize};

use crate::active::ActivePiece;
use crate::board::Board;
use crate::piece::Piece;
use crate::records::{PlayerIdentity, ScoreSubmission};
use crate::scoring;

/// Observable outcomes of a simulation step, consumed by the host's display
/// and audio layers. The simulation itself never blocks on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared {
        rows: u32,
        points: u32,
        level: u32,
        maximal: bool,
    },
    PieceSpawned,
    GameOver,
    Paused,
    Resumed,
    Restarted,
    MuteToggled { muted: bool },
}

/// One running game: board, falling piece, progression counters, and the
/// gravity clock. Owned exclusively by the host; all mutation happens
/// synchronously through `tick` and the command reducer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    board: Board,
    active: Option<ActivePiece>,
    score: u32,
    level: u32,
    lines_cleared: u32,
    drop_interval_ms: u32,
    drop_accumulator_ms: u32,
    paused: bool,
    game_over: bool,
    #[serde(default)]
    modal_open: bool,
    #[serde(default)]
    muted: bool,
    rng: Rng,
}

/// Serde-able view of the session for display refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub board: Vec<Vec<u8>>,
    pub active: Option<ActivePiece>,
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub drop_interval_ms: u32,
    pub paused: bool,
    pub game_over: bool,
    pub muted: bool,
}

impl Session {
    /// Start a session with an empty board and the first piece spawned.
    pub fn new(seed: u64) -> Self {
        let mut session = Self {
            board: Board::new(),
            active: None,
            score: 0,
            level: 1,
            lines_cleared: 0,
            drop_interval_ms: scoring::INITIAL_DROP_INTERVAL_MS,
            drop_accumulator_ms: 0,
            paused: false,
            game_over: false,
            modal_open: false,
            muted: false,
            rng: Rng::new(seed),
        };
        let mut events = Vec::new();
        session.spawn_piece(&mut events);
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn drop_accumulator_ms(&self) -> u32 {
        self.drop_accumulator_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// While the host's identity-capture modal is open, every command is
    /// silently dropped by the reducer.
    pub fn set_modal_open(&mut self, open: bool) {
        self.modal_open = open;
    }

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Usually seeded from the persisted preference at startup.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Mute is accepted in every state, including paused and game over.
    pub fn toggle_mute(&mut self) -> Vec<GameEvent> {
        self.muted = !self.muted;
        vec![GameEvent::MuteToggled { muted: self.muted }]
    }

    /// Advance the gravity clock. Called once per host frame with the
    /// elapsed wall-clock time; applies at most one gravity drop. A no-op
    /// while paused or after game over, which freezes the accumulator across
    /// a pause so resuming never triggers an instant drop.
    pub fn tick(&mut self, elapsed_ms: u32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_over || self.paused {
            return events;
        }

        self.drop_accumulator_ms = self.drop_accumulator_ms.saturating_add(elapsed_ms);
        if self.drop_accumulator_ms > self.drop_interval_ms {
            self.drop_accumulator_ms = 0;
            events.extend(self.move_piece(0, 1));
        }
        events
    }

    /// Try to shift the active piece. A blocked sideways move is simply
    /// rolled back; a blocked downward move locks the piece and runs the
    /// clear-score-spawn sequence atomically.
    pub fn move_piece(&mut self, dx: i32, dy: i32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_over || self.paused {
            return events;
        }
        let Some(active) = self.active else {
            return events;
        };

        let candidate = active.translated(dx, dy);
        if !candidate.collides(&self.board) {
            self.active = Some(candidate);
            events.push(GameEvent::PieceMoved);
            return events;
        }

        if dy > 0 {
            self.lock_active_piece(&mut events);
        }
        events
    }

    /// Advance to the next rotation state, rolling back on collision. No
    /// wall kicks: a rotation that would collide is rejected outright.
    pub fn rotate_piece(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.game_over || self.paused {
            return events;
        }
        let Some(active) = self.active else {
            return events;
        };

        let candidate = active.rotated();
        if !candidate.collides(&self.board) {
            self.active = Some(candidate);
            events.push(GameEvent::PieceRotated);
        }
        events
    }

    pub fn toggle_pause(&mut self) -> Vec<GameEvent> {
        if self.game_over {
            return Vec::new();
        }
        self.paused = !self.paused;
        vec![if self.paused {
            GameEvent::Paused
        } else {
            GameEvent::Resumed
        }]
    }

    /// Re-initialize the board and counters and spawn a fresh piece. Only
    /// accepted from the terminal state; the RNG stream carries over.
    pub fn restart(&mut self) -> Vec<GameEvent> {
        if !self.game_over {
            return Vec::new();
        }
        self.board = Board::new();
        self.active = None;
        self.score = 0;
        self.level = 1;
        self.lines_cleared = 0;
        self.drop_interval_ms = scoring::INITIAL_DROP_INTERVAL_MS;
        self.drop_accumulator_ms = 0;
        self.paused = false;
        self.game_over = false;

        let mut events = vec![GameEvent::Restarted];
        self.spawn_piece(&mut events);
        events
    }

    /// The finalized record handed to the leaderboard collaborator, or
    /// `None` when submission must be withheld (session still running,
    /// nothing scored, or incomplete identity).
    pub fn final_report(&self, identity: &PlayerIdentity) -> Option<ScoreSubmission> {
        if !self.game_over || self.score == 0 || !identity.is_complete() {
            return None;
        }
        Some(ScoreSubmission {
            username: identity.username.clone(),
            email: identity.email.clone(),
            score: self.score,
            level: self.level,
            lines: self.lines_cleared,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            board: self.board.rows().to_vec(),
            active: self.active,
            score: self.score,
            level: self.level,
            lines_cleared: self.lines_cleared,
            drop_interval_ms: self.drop_interval_ms,
            paused: self.paused,
            game_over: self.game_over,
            muted: self.muted,
        }
    }

    /// Board grid with the active piece painted in, for rendering.
    pub fn board_with_active_piece(&self) -> Vec<Vec<u8>> {
        let mut rows = self.board.rows().to_vec();
        if let Some(active) = &self.active {
            let value = active.piece.cell_value();
            for (x, y) in active.cells() {
                if (0..rows.len() as i32).contains(&y) && (0..rows[0].len() as i32).contains(&x) {
                    rows[y as usize][x as usize] = value;
                }
            }
        }
        rows
    }

    pub fn set_cell(&mut self, x: usize, y: usize, value: u8) {
        self.board.set_cell(x, y, value);
    }

    pub fn set_active_for_test(&mut self, piece: Piece, x: i32, y: i32, rotation: usize) {
        self.active = Some(ActivePiece {
            piece,
            rotation: rotation % piece.rotation_states(),
            x,
            y,
        });
    }

    /// Lock, clear, score, spawn: one atomic step. No input is processed
    /// between the decision to lock and the next piece appearing.
    fn lock_active_piece(&mut self, events: &mut Vec<GameEvent>) {
        let Some(active) = self.active.take() else {
            return;
        };
        self.board.place(&active);
        events.push(GameEvent::PieceLocked);

        let full = self.board.full_rows();
        if !full.is_empty() {
            let rows = full.len() as u32;
            self.board.remove_rows(full);

            // The multiplier is the level in effect when the clear happened.
            let points = scoring::line_clear_points(rows, self.level);
            self.score = self.score.saturating_add(points);
            self.lines_cleared = self.lines_cleared.saturating_add(rows);
            self.level = scoring::level_for_lines(self.lines_cleared);
            self.drop_interval_ms = scoring::drop_interval_ms(self.level);

            events.push(GameEvent::LinesCleared {
                rows,
                points,
                level: self.level,
                maximal: scoring::is_maximal_clear(rows),
            });
        }

        self.spawn_piece(events);
    }

    fn spawn_piece(&mut self, events: &mut Vec<GameEvent>) {
        let index = (self.rng.next_u32() as usize) % Piece::ALL.len();
        let active = ActivePiece::spawn(Piece::ALL[index]);
        let blocked = active.collides(&self.board);
        self.active = Some(active);

        if blocked {
            self.game_over = true;
            events.push(GameEvent::GameOver);
        } else {
            events.push(GameEvent::PieceSpawned);
        }
    }
}

/// Deterministic xorshift64* generator so sessions can be replayed from a
/// seed in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32) as u32
    }
}
