//! # Settlement
//!
//! Derives a battle's winner from its vote counts once voting closes.
//!
//! Votes are the source of truth. The `winner` stored on a battle is only a cache of [`resolve`],
//! and [`settle`] overwrites it whenever the two disagree, including a winner written before the
//! deadline.
//!
//! ## Tie-break
//! - A > B: option A's name
//! - B > A: option B's name
//! - Equal, including 0-0: [`TIE`]
use chrono::{DateTime, Utc};

use crate::battle::{Battle, OptionKey, TIE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Winner(OptionKey),
    Tie,
}

pub fn tally(battle: &Battle) -> Outcome {
    let a = battle.option_a.vote_count;
    let b = battle.option_b.vote_count;

    if a > b {
        Outcome::Winner(OptionKey::A)
    } else if b > a {
        Outcome::Winner(OptionKey::B)
    } else {
        Outcome::Tie
    }
}

/// `None` while the battle is still open.
pub fn resolve(battle: &Battle, now: DateTime<Utc>) -> Option<String> {
    if battle.deadline.is_none() || battle.is_open(now) {
        return None;
    }

    let winner = match tally(battle) {
        Outcome::Winner(key) => battle.option(key).name.clone(),
        Outcome::Tie => TIE.to_string(),
    };

    Some(winner)
}

/// Brings the cached winner in line with [`resolve`]. Returns whether it changed.
pub fn settle(battle: &mut Battle, now: DateTime<Utc>) -> bool {
    let resolved = resolve(battle, now);

    if battle.winner == resolved {
        return false;
    }

    battle.winner = resolved;
    true
}
