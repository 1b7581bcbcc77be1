//! # Arena
//!
//! The service every request goes through.
//!
//! Each operation is one transaction over the whole event: take the lock, load, run the operation,
//! save if anything changed, release. One coarse lock for the store keeps the duplicate-voter check
//! and the count increment atomic with the save, so concurrent votes can neither be lost nor double
//! counted.
//!
//! Everything here blocks (std mutex, file I/O). Async callers go through
//! [`crate::routes`], which runs each call on tokio's blocking pool.
//!
//! Reads settle lazily. Any battle whose cached winner is out of date gets corrected and saved
//! under the same lock before the projection is returned.
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    battle::{Battle, Contender, Event},
    clock::Clock,
    error::AppError,
    project::{BattleView, EventView, project, project_event},
    settle::settle,
    store::Store,
    vote::apply_vote,
};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBattle {
    pub option_a_name: String,
    pub option_b_name: String,
    pub image_reference_a: String,
    pub image_reference_b: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

pub struct Arena {
    store: Mutex<Box<dyn Store>>,
    clock: Arc<dyn Clock>,
}

impl Arena {
    pub fn new(store: Box<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
        }
    }

    fn transact<T>(
        &self,
        operation: impl FnOnce(&mut Event, DateTime<Utc>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);

        let mut event = store.load()?;
        let before = event.clone();
        let now = self.clock.now();

        let output = operation(&mut event, now)?;

        if event != before {
            store.save(&event)?;
        }

        Ok(output)
    }

    pub fn event(&self) -> Result<EventView, AppError> {
        self.transact(|event, now| {
            settle_all(event, now);
            Ok(project_event(event, now))
        })
    }

    pub fn battle(&self, id: u64) -> Result<BattleView, AppError> {
        self.transact(|event, now| {
            let battle = event.battle_mut(id).ok_or(AppError::NotFound)?;
            settle(battle, now);
            Ok(project(battle, now))
        })
    }

    pub fn cast_vote(
        &self,
        battle_id: u64,
        option: &str,
        voter: &str,
    ) -> Result<BattleView, AppError> {
        let result = self.transact(|event, now| {
            let battle = apply_vote(event, battle_id, option, voter, now)?;
            Ok(project(battle, now))
        });

        match &result {
            Ok(view) => {
                info!(
                    "Vote on battle {battle_id}: {} {} - {} {}",
                    view.option_a.name,
                    view.option_a.vote_count,
                    view.option_b.vote_count,
                    view.option_b.name
                );

                #[cfg(feature = "verbose")]
                info!("Voter {voter} voted {option} on battle {battle_id}");
            }
            Err(AppError::StorageUnavailable(_)) => {}
            Err(e) => debug!("Vote on battle {battle_id} rejected: {e}"),
        }

        result
    }

    pub fn create_battle(&self, request: NewBattle) -> Result<Battle, AppError> {
        let deadline = request
            .deadline
            .ok_or_else(|| AppError::InvalidRequest("deadline is required".to_string()))?;

        let option_a_name = request.option_a_name.trim();
        let option_b_name = request.option_b_name.trim();
        if option_a_name.is_empty() || option_b_name.is_empty() {
            return Err(AppError::InvalidRequest("both options need a name".to_string()));
        }

        let battle = self.transact(|event, now| {
            let battle = Battle::new(
                event.next_id(now),
                Contender::new(option_a_name, request.image_reference_a),
                Contender::new(option_b_name, request.image_reference_b),
                deadline,
            );
            event.battles.push(battle.clone());

            Ok(battle)
        })?;

        info!(
            "Created battle {}: {} vs {}, closes {}",
            battle.id, battle.option_a.name, battle.option_b.name, deadline
        );

        Ok(battle)
    }

    pub fn remove_battle(&self, id: u64) -> Result<(), AppError> {
        self.transact(|event, _| event.remove(id).map(|_| ()).ok_or(AppError::NotFound))?;

        info!("Removed battle {id}");
        Ok(())
    }

    pub fn update_title(&self, title: &str) -> Result<String, AppError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::InvalidRequest("title cannot be empty".to_string()));
        }

        let title = self.transact(|event, _| {
            event.title = title.to_string();
            Ok(event.title.clone())
        })?;

        info!("Event title set to {title:?}");
        Ok(title)
    }
}

fn settle_all(event: &mut Event, now: DateTime<Utc>) {
    for battle in &mut event.battles {
        if settle(battle, now) {
            debug!("Battle {} settled: {:?}", battle.id, battle.winner);
        }
    }
}
