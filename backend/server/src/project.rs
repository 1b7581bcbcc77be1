//! # Public Views
//!
//! What non-admin callers get to see.
//!
//! - Voter ids are never included
//! - Vote counts are live and public while voting is open
//! - Winner is null until the deadline, then the value from [`resolve`], never the stored cache
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    battle::{Battle, Contender, Event},
    settle::resolve,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleView {
    pub id: u64,
    pub option_a: Contender,
    pub option_b: Contender,
    pub deadline: Option<DateTime<Utc>>,
    pub winner: Option<String>,
    pub closed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventView {
    pub title: String,
    pub battles: Vec<BattleView>,
}

pub fn project(battle: &Battle, now: DateTime<Utc>) -> BattleView {
    BattleView {
        id: battle.id,
        option_a: battle.option_a.clone(),
        option_b: battle.option_b.clone(),
        deadline: battle.deadline,
        winner: resolve(battle, now),
        closed: !battle.is_open(now),
    }
}

pub fn project_event(event: &Event, now: DateTime<Utc>) -> EventView {
    EventView {
        title: event.title.clone(),
        battles: event
            .battles
            .iter()
            .map(|battle| project(battle, now))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::battle::TIE;

    fn deadline() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    fn battle() -> Battle {
        let mut battle = Battle::new(
            3,
            Contender::new("Cat", "cat.png"),
            Contender::new("Dog", "dog.png"),
            deadline(),
        );
        battle.option_a.vote_count = 2;
        battle.option_b.vote_count = 1;
        battle.voted_voters = vec!["a".into(), "b".into(), "c".into()];
        battle
    }

    #[test]
    fn test_voters_never_serialized() {
        let json = serde_json::to_value(project(&battle(), deadline())).unwrap();

        assert!(json.get("votedVoters").is_none());
        assert!(!json.to_string().contains("\"a\""));
    }

    #[test]
    fn test_cached_winner_hidden_while_open() {
        let mut battle = battle();
        battle.winner = Some("Cat".into());

        let view = project(&battle, deadline() - Duration::seconds(1));

        assert_eq!(view.winner, None);
        assert!(!view.closed);
        assert_eq!(view.option_a.vote_count, 2);
        assert_eq!(view.option_b.vote_count, 1);
    }

    #[test]
    fn test_winner_revealed_after_deadline() {
        let view = project(&battle(), deadline() + Duration::hours(2));

        assert_eq!(view.winner.as_deref(), Some("Cat"));
        assert!(view.closed);
    }

    #[test]
    fn test_counts_beat_stale_cache() {
        let mut battle = battle();
        battle.winner = Some(TIE.into());

        let view = project(&battle, deadline());

        assert_eq!(view.winner.as_deref(), Some("Cat"));
    }

    #[test]
    fn test_event_projection_covers_every_battle() {
        let mut event = Event::new("Finals");
        let mut open = battle();
        open.id = 4;
        open.deadline = Some(deadline() + Duration::days(1));
        event.battles.extend([battle(), open]);

        let view = project_event(&event, deadline() + Duration::minutes(1));

        assert_eq!(view.title, "Finals");
        assert_eq!(view.battles.len(), 2);
        assert_eq!(view.battles[0].winner.as_deref(), Some("Cat"));
        assert_eq!(view.battles[1].winner, None);
    }
}
