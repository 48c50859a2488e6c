/// Scoring and progression rules, kept as pure functions so the session can
/// be driven deterministically from tests.

pub const LINES_PER_LEVEL: u32 = 10;
pub const INITIAL_DROP_INTERVAL_MS: u32 = 1_500;

/// Rows that count as a maximal clear (informally, a "tetris").
pub const MAXIMAL_CLEAR_ROWS: u32 = 4;

/// Base points for clearing `rows` lines in one lock event, before the level
/// multiplier. More than 4 rows is unreachable with standard pieces but is
/// handled as 100 points per row.
pub fn line_clear_base_points(rows: u32) -> u32 {
    match rows {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 1_000,
        n => 100 * n,
    }
}

/// Points awarded for a clear at the level in effect when the clear happened.
pub fn line_clear_points(rows: u32, level: u32) -> u32 {
    line_clear_base_points(rows).saturating_mul(level)
}

pub fn is_maximal_clear(rows: u32) -> bool {
    rows == MAXIMAL_CLEAR_ROWS
}

/// Level is derived from cumulative cleared lines: one level per ten lines,
/// starting at 1.
pub fn level_for_lines(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL + 1
}

/// Gravity period for a level: a four-band piecewise-linear schedule, each
/// band steeper than the last, floored at 100 ms.
pub fn drop_interval_ms(level: u32) -> u32 {
    let level = i64::from(level.max(1));
    let interval = if level <= 2 {
        (1_500 - (level - 1) * 150).max(1_200)
    } else if level <= 4 {
        (1_150 - (level - 2) * 225).max(700)
    } else if level <= 6 {
        (750 - (level - 4) * 175).max(400)
    } else {
        (450 - (level - 6) * 25).max(100)
    };
    interval as u32
}
