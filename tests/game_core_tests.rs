use blockfall::board::{BOARD_HEIGHT, BOARD_WIDTH};
use blockfall::command::{self, Command, command_from_id};
use blockfall::piece::Piece;
use blockfall::records::PlayerIdentity;
use blockfall::scoring;
use blockfall::session::{GameEvent, Session};
use blockfall::sfx;

/// Set up a single-line clear: the bottom row is full except for the two
/// columns the O piece will land in, then soft-drop the piece into the gap.
fn clear_single_row(session: &mut Session) -> Vec<GameEvent> {
    for x in 0..BOARD_WIDTH {
        if x != 4 && x != 5 {
            session.set_cell(x, BOARD_HEIGHT - 1, 1);
        }
    }
    session.set_active_for_test(Piece::O, 4, BOARD_HEIGHT as i32 - 2, 0);
    command::apply(session, Command::SoftDrop)
}

fn force_game_over(session: &mut Session) {
    for x in 3..7 {
        session.set_cell(x, 0, 1);
        session.set_cell(x, 1, 1);
    }
    session.set_active_for_test(Piece::O, 0, BOARD_HEIGHT as i32 - 2, 0);
    command::apply(session, Command::SoftDrop);
    assert!(session.is_game_over());
}

#[test]
fn locking_into_a_full_row_clears_and_scores() {
    let mut session = Session::new(0);
    let events = clear_single_row(&mut session);

    assert_eq!(events[0], GameEvent::PieceLocked);
    assert!(matches!(
        events[1],
        GameEvent::LinesCleared {
            rows: 1,
            points: 100,
            level: 1,
            maximal: false,
        }
    ));
    assert_eq!(events[2], GameEvent::PieceSpawned);

    assert_eq!(session.score(), 100);
    assert_eq!(session.lines_cleared(), 1);
    assert_eq!(session.level(), 1);
    assert!(session.board().full_rows().is_empty());
}

#[test]
fn four_rows_at_once_is_a_maximal_clear() {
    let mut session = Session::new(0);
    // Four full rows with a one-column well for a vertical I.
    for y in (BOARD_HEIGHT - 4)..BOARD_HEIGHT {
        for x in 0..BOARD_WIDTH {
            if x != 4 {
                session.set_cell(x, y, 1);
            }
        }
    }
    session.set_active_for_test(Piece::I, 4, BOARD_HEIGHT as i32 - 4, 1);

    let events = command::apply(&mut session, Command::SoftDrop);
    assert!(events.contains(&GameEvent::LinesCleared {
        rows: 4,
        points: 1_000,
        level: 1,
        maximal: true,
    }));
    assert_eq!(session.score(), 1_000);
    assert_eq!(session.lines_cleared(), 4);
}

#[test]
fn clears_are_scored_at_the_level_in_effect_when_they_happen() {
    let mut session = Session::new(0);

    // Ten single clears at level 1: 10 x 100 points.
    for _ in 0..10 {
        clear_single_row(&mut session);
    }
    assert_eq!(session.score(), 1_000);
    assert_eq!(session.lines_cleared(), 10);
    assert_eq!(session.level(), 2);
    assert_eq!(session.drop_interval_ms(), scoring::drop_interval_ms(2));

    // The eleventh clear lands at level 2 and is worth double.
    clear_single_row(&mut session);
    assert_eq!(session.score(), 1_200);
}

#[test]
fn final_report_requires_game_over_points_and_identity() {
    let identity = PlayerIdentity {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
    };

    // Running session: nothing to report.
    let mut session = Session::new(0);
    assert!(session.final_report(&identity).is_none());

    // Score something, then end the game.
    clear_single_row(&mut session);
    force_game_over(&mut session);

    let report = session.final_report(&identity).expect("report available");
    assert_eq!(report.username, "ada");
    assert_eq!(report.score, session.score());
    assert_eq!(report.level, session.level());
    assert_eq!(report.lines, session.lines_cleared());

    // Missing identity withholds the report.
    assert!(session.final_report(&PlayerIdentity::default()).is_none());
}

#[test]
fn scoreless_games_are_never_reported() {
    let identity = PlayerIdentity {
        username: "ada".to_string(),
        email: "ada@example.com".to_string(),
    };
    let mut session = Session::new(0);
    force_game_over(&mut session);
    assert_eq!(session.score(), 0);
    assert!(session.final_report(&identity).is_none());
}

#[test]
fn a_clearing_lock_plays_drop_then_line_clear_cues() {
    let mut session = Session::new(0);
    let events = clear_single_row(&mut session);
    let cues: Vec<&str> = events.iter().filter_map(sfx::sound_for_event).collect();
    assert_eq!(cues, vec![sfx::SFX_DROP, sfx::SFX_LINE_CLEAR]);
}

#[test]
fn blocked_rotation_leaves_the_pose_untouched() {
    let mut session = Session::new(0);
    // T at spawn; its next rotation state needs (4, 2), which is blocked.
    session.set_active_for_test(Piece::T, 4, 0, 0);
    session.set_cell(4, 2, 1);

    let events = command::apply(&mut session, Command::Rotate);
    assert!(events.is_empty());
    let active = session.active_piece().unwrap();
    assert_eq!(active.rotation, 0);
    assert_eq!((active.x, active.y), (4, 0));
    assert_eq!(active.shape(), Piece::T.shape(0));
}

#[test]
fn string_command_ids_drive_the_session() {
    let mut session = Session::new(9);
    let x_before = session.active_piece().unwrap().x;

    let left = command_from_id("moveLeft").unwrap();
    command::apply(&mut session, left);
    assert_eq!(session.active_piece().unwrap().x, x_before - 1);

    let pause = command_from_id("togglePause").unwrap();
    assert_eq!(command::apply(&mut session, pause), vec![GameEvent::Paused]);
}

#[test]
fn restart_after_game_over_starts_a_fresh_game() {
    let mut session = Session::new(0);
    clear_single_row(&mut session);
    force_game_over(&mut session);

    let events = command::apply(&mut session, Command::Restart);
    assert_eq!(events[0], GameEvent::Restarted);
    assert!(!session.is_game_over());
    assert_eq!(session.score(), 0);
    assert_eq!(session.lines_cleared(), 0);
    assert_eq!(
        session.drop_interval_ms(),
        scoring::INITIAL_DROP_INTERVAL_MS
    );
    let filled: usize = session
        .board()
        .rows()
        .iter()
        .flat_map(|row| row.iter())
        .filter(|&&c| c != 0)
        .count();
    assert_eq!(filled, 0);
}

#[test]
fn sessions_with_the_same_seed_replay_identically() {
    let mut a = Session::new(1234);
    let mut b = Session::new(1234);

    let script = [
        Command::MoveLeft,
        Command::SoftDrop,
        Command::Rotate,
        Command::MoveRight,
        Command::SoftDrop,
        Command::SoftDrop,
    ];
    for command in script {
        command::apply(&mut a, command);
        command::apply(&mut b, command);
        a.tick(400);
        b.tick(400);
    }

    assert_eq!(a.snapshot(), b.snapshot());
}

#[test]
fn snapshot_round_trips_through_json() {
    let mut session = Session::new(77);
    clear_single_row(&mut session);

    let snapshot = session.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: blockfall::session::SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
}
