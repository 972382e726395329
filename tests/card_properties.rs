//! Property-based tests for card generation and pattern evaluation.
//!
//! These verify the structural invariants of generated cards and the
//! monotonicity of win evaluation across randomly chosen call sets.

use bingo_hall::game::{ALL_PATTERNS, BingoCard, BingoPattern, constants, is_winner};
use proptest::prelude::*;
use std::collections::HashSet;

// Strategy to pick one of the supported patterns
fn pattern_strategy() -> impl Strategy<Value = BingoPattern> {
    (0..ALL_PATTERNS.len()).prop_map(|i| ALL_PATTERNS[i])
}

/// All 24 numbers printed on a card, row-major.
fn card_numbers(card: &BingoCard) -> Vec<u8> {
    card.rows()
        .iter()
        .flatten()
        .filter_map(|c| c.value())
        .collect()
}

proptest! {
    #[test]
    fn prop_generated_columns_unique_and_in_range(_seed in any::<u32>()) {
        let card = BingoCard::generate();
        for col in 0..constants::CARD_SIZE {
            let (min, max) = constants::COLUMN_RANGES[col];
            let values: Vec<u8> = (0..constants::CARD_SIZE)
                .filter_map(|row| card.cell(row, col).and_then(|c| c.value()))
                .collect();

            let expected = if col == constants::FREE_COL {
                constants::CARD_SIZE - 1
            } else {
                constants::CARD_SIZE
            };
            prop_assert_eq!(values.len(), expected);

            let unique: HashSet<u8> = values.iter().copied().collect();
            prop_assert_eq!(unique.len(), values.len());
            for value in values {
                prop_assert!((min..=max).contains(&value));
            }
        }
    }

    #[test]
    fn prop_win_is_monotone_in_called_numbers(
        mask in any::<u32>(),
        extras in proptest::collection::vec(1u8..=75, 0..30),
        pattern in pattern_strategy(),
    ) {
        let card = BingoCard::generate();
        let base: Vec<u8> = card_numbers(&card)
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u32 << i) != 0)
            .map(|(_, n)| n)
            .collect();

        if is_winner(&card, &base, pattern) {
            let mut superset = base.clone();
            superset.extend(extras);
            prop_assert!(
                is_winner(&card, &superset, pattern),
                "superset revoked a {} win",
                pattern
            );
        }
    }

    #[test]
    fn prop_whole_card_called_wins_every_pattern(pattern in pattern_strategy()) {
        let card = BingoCard::generate();
        let called = card_numbers(&card);
        prop_assert!(is_winner(&card, &called, pattern));
    }

    #[test]
    fn prop_no_calls_never_wins(pattern in pattern_strategy()) {
        let card = BingoCard::generate();
        prop_assert!(!is_winner(&card, &[], pattern));
    }

    #[test]
    fn prop_numbers_off_the_card_never_win(pattern in pattern_strategy()) {
        let card = BingoCard::generate();
        let on_card: HashSet<u8> = card_numbers(&card).into_iter().collect();
        let called: Vec<u8> = (1..=75).filter(|n| !on_card.contains(n)).collect();
        prop_assert!(!is_winner(&card, &called, pattern));
    }
}
