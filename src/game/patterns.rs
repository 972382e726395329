use serde::{Deserialize, Serialize};
use std::fmt;

use super::card::BingoCard;
use super::constants::CARD_SIZE;

/// Named winning patterns. A card wins when every cell in the pattern's
/// set is satisfied by the call history (the free cell always is).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum BingoPattern {
    AnyLine,
    FourCorners,
    Cross,
    LetterX,
    SmallSquare,
    TopRow,
    MiddleRow,
    BottomRow,
    LeftL,
    RightL,
    FullHouse,
}

impl fmt::Display for BingoPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::AnyLine => "any line",
            Self::FourCorners => "four corners",
            Self::Cross => "cross",
            Self::LetterX => "letter X",
            Self::SmallSquare => "small square",
            Self::TopRow => "top row",
            Self::MiddleRow => "middle row",
            Self::BottomRow => "bottom row",
            Self::LeftL => "left L",
            Self::RightL => "right L",
            Self::FullHouse => "full house",
        };
        write!(f, "{repr}")
    }
}

const LAST: usize = CARD_SIZE - 1;
const CENTER: usize = CARD_SIZE / 2;

fn satisfied(card: &BingoCard, row: usize, col: usize, called: &[u8]) -> bool {
    card.cell(row, col).is_some_and(|c| c.is_satisfied(called))
}

fn row_satisfied(card: &BingoCard, row: usize, called: &[u8]) -> bool {
    (0..CARD_SIZE).all(|col| satisfied(card, row, col, called))
}

fn col_satisfied(card: &BingoCard, col: usize, called: &[u8]) -> bool {
    (0..CARD_SIZE).all(|row| satisfied(card, row, col, called))
}

/// Top-left to bottom-right diagonal.
fn diag_down_satisfied(card: &BingoCard, called: &[u8]) -> bool {
    (0..CARD_SIZE).all(|i| satisfied(card, i, i, called))
}

/// Top-right to bottom-left diagonal.
fn diag_up_satisfied(card: &BingoCard, called: &[u8]) -> bool {
    (0..CARD_SIZE).all(|i| satisfied(card, i, LAST - i, called))
}

/// Decide whether `card` wins `pattern` against the call history.
///
/// Pure and deterministic. Marking state is ignored: the win condition
/// depends only on which numbers have been called.
#[must_use]
pub fn is_winner(card: &BingoCard, called_numbers: &[u8], pattern: BingoPattern) -> bool {
    match pattern {
        BingoPattern::AnyLine => {
            (0..CARD_SIZE).any(|row| row_satisfied(card, row, called_numbers))
                || (0..CARD_SIZE).any(|col| col_satisfied(card, col, called_numbers))
                || diag_down_satisfied(card, called_numbers)
                || diag_up_satisfied(card, called_numbers)
        }
        BingoPattern::FourCorners => [(0, 0), (0, LAST), (LAST, 0), (LAST, LAST)]
            .iter()
            .all(|&(row, col)| satisfied(card, row, col, called_numbers)),
        BingoPattern::Cross => {
            row_satisfied(card, CENTER, called_numbers)
                && col_satisfied(card, CENTER, called_numbers)
        }
        BingoPattern::LetterX => {
            diag_down_satisfied(card, called_numbers) && diag_up_satisfied(card, called_numbers)
        }
        BingoPattern::SmallSquare => [(0, 0), (0, 1), (1, 0), (1, 1)]
            .iter()
            .all(|&(row, col)| satisfied(card, row, col, called_numbers)),
        BingoPattern::TopRow => row_satisfied(card, 0, called_numbers),
        BingoPattern::MiddleRow => row_satisfied(card, CENTER, called_numbers),
        BingoPattern::BottomRow => row_satisfied(card, LAST, called_numbers),
        BingoPattern::LeftL => {
            col_satisfied(card, 0, called_numbers) && row_satisfied(card, LAST, called_numbers)
        }
        BingoPattern::RightL => {
            col_satisfied(card, LAST, called_numbers) && row_satisfied(card, 0, called_numbers)
        }
        BingoPattern::FullHouse => {
            (0..CARD_SIZE).all(|row| row_satisfied(card, row, called_numbers))
        }
    }
}

/// All patterns, for iteration in callers and tests.
pub const ALL_PATTERNS: [BingoPattern; 11] = [
    BingoPattern::AnyLine,
    BingoPattern::FourCorners,
    BingoPattern::Cross,
    BingoPattern::LetterX,
    BingoPattern::SmallSquare,
    BingoPattern::TopRow,
    BingoPattern::MiddleRow,
    BingoPattern::BottomRow,
    BingoPattern::LeftL,
    BingoPattern::RightL,
    BingoPattern::FullHouse,
];
