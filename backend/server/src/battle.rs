//! # Battles
//!
//! Data model for the event and its head-to-head contests.
//!
//! ## Schema
//! - Event: title (**string**), battles (**list**, creation order)
//! - Battle: id (**u64**, creation millis), two options, deadline (**RFC 3339**, optional for old
//!   records), winner (**string** or null), voted voters (**list of strings**, append-only)
//! - Option: name (**string**), image reference (**string**, opaque), vote count (**u64**)
//!
//! ## Invariants
//! - `option_a.vote_count + option_b.vote_count == voted_voters.len()`
//! - A voter appears at most once per battle
//! - Winner stays null until the deadline passes, see [`crate::settle`]
//!
//! ## Old Records
//! Files written by the first version of the service used `option1`/`option2`, `votes`, `image`
//! and `votedIPs`, with no deadline. Those names are still accepted on load.
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const TIE: &str = "tie";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub battles: Vec<Battle>,
}

impl Event {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            battles: Vec::new(),
        }
    }

    pub fn battle(&self, id: u64) -> Option<&Battle> {
        self.battles.iter().find(|battle| battle.id == id)
    }

    pub fn battle_mut(&mut self, id: u64) -> Option<&mut Battle> {
        self.battles.iter_mut().find(|battle| battle.id == id)
    }

    pub fn remove(&mut self, id: u64) -> Option<Battle> {
        let index = self.battles.iter().position(|battle| battle.id == id)?;

        Some(self.battles.remove(index))
    }

    /// Millisecond timestamp of `now`, bumped past the newest id when the clock has not moved.
    pub fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        match self.battles.iter().map(|battle| battle.id).max() {
            Some(last) if last >= millis => last + 1,
            _ => millis,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contender {
    pub name: String,
    #[serde(alias = "image")]
    pub image_reference: String,
    #[serde(default, alias = "votes")]
    pub vote_count: u64,
}

impl Contender {
    pub fn new(name: impl Into<String>, image_reference: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_reference: image_reference.into(),
            vote_count: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKey {
    A,
    B,
}

impl FromStr for OptionKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optionA" | "option1" => Ok(OptionKey::A),
            "optionB" | "option2" => Ok(OptionKey::B),
            _ => Err(AppError::InvalidOption),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub id: u64,
    #[serde(alias = "option1")]
    pub option_a: Contender,
    #[serde(alias = "option2")]
    pub option_b: Contender,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, alias = "votedIPs")]
    pub voted_voters: Vec<String>,
}

impl Battle {
    pub fn new(id: u64, option_a: Contender, option_b: Contender, deadline: DateTime<Utc>) -> Self {
        Self {
            id,
            option_a,
            option_b,
            deadline: Some(deadline),
            winner: None,
            voted_voters: Vec::new(),
        }
    }

    pub fn option(&self, key: OptionKey) -> &Contender {
        match key {
            OptionKey::A => &self.option_a,
            OptionKey::B => &self.option_b,
        }
    }

    pub fn option_mut(&mut self, key: OptionKey) -> &mut Contender {
        match key {
            OptionKey::A => &mut self.option_a,
            OptionKey::B => &mut self.option_b,
        }
    }

    /// Old records without a deadline never close.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_none_or(|deadline| now < deadline)
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.voted_voters.iter().any(|recorded| recorded == voter)
    }

    pub fn total_votes(&self) -> u64 {
        self.option_a.vote_count + self.option_b.vote_count
    }
}
