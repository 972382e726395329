//! Board geometry and game defaults.

/// Number of rows and columns on a card.
pub const CARD_SIZE: usize = 5;

/// Row and column of the fixed free cell.
pub const FREE_ROW: usize = 2;
pub const FREE_COL: usize = 2;

/// Inclusive number range for each column, in B-I-N-G-O order.
pub const COLUMN_RANGES: [(u8, u8); CARD_SIZE] =
    [(1, 15), (16, 30), (31, 45), (46, 60), (61, 75)];

/// Smallest callable number.
pub const MIN_NUMBER: u8 = 1;

/// Largest callable number.
pub const MAX_NUMBER: u8 = 75;

/// Seconds between draws when a game runs in automatic mode.
pub const DEFAULT_AUTO_CALL_INTERVAL_SECS: u64 = 5;
