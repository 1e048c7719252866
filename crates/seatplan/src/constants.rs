/// Layout A: 4 rows x 3 banks
pub const ROWS_A: usize = 4;
pub const COLS_A: usize = 3;

/// Layout B: 3 rows x 4 banks (the back row of A turned into the rightmost column)
pub const ROWS_B: usize = 3;
pub const COLS_B: usize = 4;

/// Seats per bank
pub const SIDES: usize = 2;

/// Total seats, identical for both layouts
pub const SEAT_COUNT: usize = ROWS_A * COLS_A * SIDES; // 24

/// Two-seat banks, identical for both layouts
pub const BANK_COUNT: usize = ROWS_A * COLS_A; // 12

/// Row index nearest the board in both layouts
pub const FRONT_ROW: usize = 0;

/// Scoring defaults
pub const BASE_SCORE: i64 = 500;
pub const FRONT_BONUS: i64 = 200;
pub const BACK_BONUS: i64 = 30;
pub const SOLO_BONUS: i64 = 100;
pub const EMPTY_BANK_PENALTY: i64 = 50;
/// Full bank penalty keyed by distance from the front row
pub const FULL_BANK_PENALTY: [i64; ROWS_A] = [0, 100, 200, 400];

/// Solver defaults
pub const DEFAULT_ATTEMPTS: usize = 10_000;
pub const DEFAULT_CANDIDATES: usize = 10;
pub const DEFAULT_PROGRESS_EVERY: usize = 1_000;
/// Placements one attempt may try before it counts as failed
pub const DEFAULT_MAX_NODES: usize = 50_000;

/// Expected headers in roster CSV files
pub const EXPECTED_NAME_HEADER: &str = "Name";
pub const EXPECTED_GENDER_HEADER: &str = "Gender";
