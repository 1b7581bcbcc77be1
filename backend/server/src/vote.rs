//! # Voting
//!
//! Applies a single vote to a battle inside an already loaded event.
//!
//! Checks run in order and nothing is mutated until all of them pass:
//! 1. Battle exists, else [`AppError::NotFound`]
//! 2. Option key is `optionA` or `optionB`, else [`AppError::InvalidOption`]
//! 3. Voting is still open, else [`AppError::VotingClosed`]
//! 4. Voter has not voted on this battle, else [`AppError::DuplicateVote`]
//!
//! Callers are expected to hold the store lock for the whole load, apply, save sequence,
//! see [`crate::arena::Arena::cast_vote`].
//!
//! ## Voter Identity
//! The voter id is whatever the transport layer hands us, usually the client IP. Clients behind the
//! same NAT or proxy share one vote per battle. This is a coarse anti-abuse measure, not an
//! identity check.
use chrono::{DateTime, Utc};

use crate::{
    battle::{Battle, Event, OptionKey},
    error::AppError,
    settle::settle,
};

pub fn apply_vote<'a>(
    event: &'a mut Event,
    battle_id: u64,
    option: &str,
    voter: &str,
    now: DateTime<Utc>,
) -> Result<&'a Battle, AppError> {
    let battle = event.battle_mut(battle_id).ok_or(AppError::NotFound)?;
    let key: OptionKey = option.parse()?;

    if !battle.is_open(now) {
        return Err(AppError::VotingClosed);
    }

    if battle.has_voted(voter) {
        return Err(AppError::DuplicateVote);
    }

    battle.option_mut(key).vote_count += 1;
    battle.voted_voters.push(voter.to_string());

    settle(battle, now);

    Ok(battle)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::battle::Contender;

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 18, 0, 0).unwrap()
    }

    fn before() -> DateTime<Utc> {
        deadline() - Duration::minutes(5)
    }

    fn event() -> Event {
        let mut event = Event::new("Arena");
        event.battles.push(Battle::new(
            42,
            Contender::new("Cat", "cat.png"),
            Contender::new("Dog", "dog.png"),
            deadline(),
        ));
        event
    }

    fn counts(event: &Event) -> (u64, u64, usize) {
        let battle = event.battle(42).unwrap();
        (
            battle.option_a.vote_count,
            battle.option_b.vote_count,
            battle.voted_voters.len(),
        )
    }

    #[test]
    fn test_vote_counts_once() {
        let mut event = event();

        let battle = apply_vote(&mut event, 42, "optionA", "v1", before()).unwrap();

        assert_eq!(battle.option_a.vote_count, 1);
        assert_eq!(battle.option_b.vote_count, 0);
        assert_eq!(battle.voted_voters, vec!["v1".to_string()]);
        assert_eq!(battle.winner, None);
    }

    #[test]
    fn test_duplicate_voter_rejected() {
        let mut event = event();

        apply_vote(&mut event, 42, "optionA", "v1", before()).unwrap();
        let second = apply_vote(&mut event, 42, "optionA", "v1", before()).map(|_| ());
        let switch = apply_vote(&mut event, 42, "optionB", "v1", before());

        assert!(matches!(second, Err(AppError::DuplicateVote)));
        assert!(matches!(switch, Err(AppError::DuplicateVote)));
        assert_eq!(counts(&event), (1, 0, 1));

        apply_vote(&mut event, 42, "optionA", "v2", before()).unwrap();
        assert_eq!(counts(&event), (2, 0, 2));
    }

    #[test]
    fn test_closed_battle_rejected() {
        let mut event = event();

        let at_deadline = apply_vote(&mut event, 42, "optionA", "v1", deadline()).map(|_| ());
        let later = apply_vote(&mut event, 42, "optionB", "v2", deadline() + Duration::days(1));

        assert!(matches!(at_deadline, Err(AppError::VotingClosed)));
        assert!(matches!(later, Err(AppError::VotingClosed)));
        assert_eq!(counts(&event), (0, 0, 0));
    }

    #[test]
    fn test_closed_check_precedes_duplicate_check() {
        let mut event = event();
        apply_vote(&mut event, 42, "optionA", "v1", before()).unwrap();

        let result = apply_vote(&mut event, 42, "optionA", "v1", deadline());

        assert!(matches!(result, Err(AppError::VotingClosed)));
    }

    #[test]
    fn test_unknown_battle() {
        let mut event = event();

        let result = apply_vote(&mut event, 7, "optionA", "v1", before());

        assert!(matches!(result, Err(AppError::NotFound)));
        assert_eq!(counts(&event), (0, 0, 0));
    }

    #[test]
    fn test_invalid_option() {
        let mut event = event();

        let result = apply_vote(&mut event, 42, "optionC", "v1", before());

        assert!(matches!(result, Err(AppError::InvalidOption)));
        assert_eq!(counts(&event), (0, 0, 0));
    }

    #[test]
    fn test_counts_match_voters() {
        let mut event = event();

        for i in 0..25 {
            let option = if i % 3 == 0 { "optionB" } else { "optionA" };
            apply_vote(&mut event, 42, option, &format!("10.0.0.{i}"), before()).unwrap();
            let _ = apply_vote(&mut event, 42, option, &format!("10.0.0.{i}"), before());

            let (a, b, voters) = counts(&event);
            assert_eq!(a + b, voters as u64);
        }

        assert_eq!(counts(&event), (16, 9, 25));
    }

    #[test]
    fn test_no_deadline_stays_open() {
        let mut event = event();
        event.battle_mut(42).unwrap().deadline = None;

        let battle =
            apply_vote(&mut event, 42, "option2", "v1", deadline() + Duration::days(30)).unwrap();

        assert_eq!(battle.option_b.vote_count, 1);
    }
}
