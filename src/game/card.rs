use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::{CARD_SIZE, COLUMN_RANGES, FREE_COL, FREE_ROW};

/// A single cell on a bingo card.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CardCell {
    /// The fixed center cell. Permanently marked.
    Free,
    Number { value: u8, marked: bool },
}

impl CardCell {
    /// The cell's number, if it has one.
    #[must_use]
    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Free => None,
            Self::Number { value, .. } => Some(*value),
        }
    }

    /// Whether the player has marked this cell. The free cell counts
    /// as marked from the moment the card is generated.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        match self {
            Self::Free => true,
            Self::Number { marked, .. } => *marked,
        }
    }

    /// Whether the cell counts toward a win given the call history.
    /// The player's own `marked` flag is deliberately not consulted.
    #[must_use]
    pub fn is_satisfied(&self, called_numbers: &[u8]) -> bool {
        match self {
            Self::Free => true,
            Self::Number { value, .. } => called_numbers.contains(value),
        }
    }
}

impl fmt::Display for CardCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "FREE"),
            Self::Number { value, .. } => write!(f, "{value:>4}"),
        }
    }
}

/// A 5x5 bingo card indexed `[row][col]`.
///
/// Every cell in column `col` holds a number from that column's range
/// (B 1-15, I 16-30, N 31-45, G 46-60, O 61-75), unique within the
/// column, except the free cell at the center.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BingoCard {
    cells: [[CardCell; CARD_SIZE]; CARD_SIZE],
}

impl BingoCard {
    /// Generate a randomized card.
    ///
    /// Numbers are drawn column-major (five unique values per column via
    /// a shuffled pool) and the grid is then transposed to row-major, so
    /// `cells[row][col]` always lands in column `col`'s range. The center
    /// cell is overridden with the free cell; the number drawn for that
    /// position is discarded.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut columns = [[CardCell::Free; CARD_SIZE]; CARD_SIZE];
        for (col, column) in columns.iter_mut().enumerate() {
            let (min, max) = COLUMN_RANGES[col];
            let mut pool: Vec<u8> = (min..=max).collect();
            pool.shuffle(&mut rng);
            for (row, cell) in column.iter_mut().enumerate() {
                *cell = CardCell::Number {
                    value: pool[row],
                    marked: false,
                };
            }
        }

        let mut cells = [[CardCell::Free; CARD_SIZE]; CARD_SIZE];
        for (row, row_cells) in cells.iter_mut().enumerate() {
            for (col, cell) in row_cells.iter_mut().enumerate() {
                *cell = columns[col][row];
            }
        }
        cells[FREE_ROW][FREE_COL] = CardCell::Free;

        Self { cells }
    }

    /// The cell at `(row, col)`, or `None` if the position is off the card.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<CardCell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// All rows of the card.
    #[must_use]
    pub fn rows(&self) -> &[[CardCell; CARD_SIZE]; CARD_SIZE] {
        &self.cells
    }

    /// Set the marked flag on a number cell. Callers validate the
    /// position and call history first; marking never unmarks.
    pub(crate) fn mark(&mut self, row: usize, col: usize) {
        if let Some(CardCell::Number { marked, .. }) =
            self.cells.get_mut(row).and_then(|r| r.get_mut(col))
        {
            *marked = true;
        }
    }
}

impl fmt::Display for BingoCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "{cell} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_card_has_free_center() {
        let card = BingoCard::generate();
        assert_eq!(card.cell(FREE_ROW, FREE_COL), Some(CardCell::Free));
    }

    #[test]
    fn test_generated_card_has_exactly_one_free_cell() {
        let card = BingoCard::generate();
        let free_count = card
            .rows()
            .iter()
            .flatten()
            .filter(|cell| matches!(cell, CardCell::Free))
            .count();
        assert_eq!(free_count, 1);
    }

    #[test]
    fn test_columns_respect_ranges() {
        let card = BingoCard::generate();
        for col in 0..CARD_SIZE {
            let (min, max) = COLUMN_RANGES[col];
            for row in 0..CARD_SIZE {
                if let Some(value) = card.cell(row, col).and_then(|c| c.value()) {
                    assert!(
                        (min..=max).contains(&value),
                        "cell ({row}, {col}) = {value} outside {min}..={max}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_columns_have_no_duplicates() {
        let card = BingoCard::generate();
        for col in 0..CARD_SIZE {
            let values: Vec<u8> = (0..CARD_SIZE)
                .filter_map(|row| card.cell(row, col).and_then(|c| c.value()))
                .collect();
            let unique: HashSet<u8> = values.iter().copied().collect();
            assert_eq!(values.len(), unique.len(), "duplicate in column {col}");
        }
    }

    #[test]
    fn test_fresh_number_cells_are_unmarked() {
        let card = BingoCard::generate();
        for (row, row_cells) in card.rows().iter().enumerate() {
            for (col, cell) in row_cells.iter().enumerate() {
                if (row, col) == (FREE_ROW, FREE_COL) {
                    assert!(cell.is_marked());
                } else {
                    assert!(!cell.is_marked());
                }
            }
        }
    }

    #[test]
    fn test_free_cell_always_satisfied() {
        assert!(CardCell::Free.is_satisfied(&[]));
    }

    #[test]
    fn test_number_cell_satisfied_only_when_called() {
        let cell = CardCell::Number {
            value: 7,
            marked: false,
        };
        assert!(!cell.is_satisfied(&[]));
        assert!(!cell.is_satisfied(&[6, 8]));
        assert!(cell.is_satisfied(&[6, 7, 8]));
    }

    #[test]
    fn test_satisfaction_ignores_marked_flag() {
        let marked = CardCell::Number {
            value: 12,
            marked: true,
        };
        assert!(!marked.is_satisfied(&[1, 2, 3]));
    }

    #[test]
    fn test_mark_flips_only_target_cell() {
        let mut card = BingoCard::generate();
        card.mark(0, 0);
        assert!(card.cell(0, 0).is_some_and(|c| c.is_marked()));
        assert!(card.cell(0, 1).is_some_and(|c| !c.is_marked()));
    }

    #[test]
    fn test_mark_free_cell_is_a_noop() {
        let mut card = BingoCard::generate();
        card.mark(FREE_ROW, FREE_COL);
        assert_eq!(card.cell(FREE_ROW, FREE_COL), Some(CardCell::Free));
    }

    #[test]
    fn test_out_of_bounds_cell_is_none() {
        let card = BingoCard::generate();
        assert!(card.cell(5, 0).is_none());
        assert!(card.cell(0, 5).is_none());
    }
}
