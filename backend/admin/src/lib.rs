//! # Arena Admin
//!
//! Operator CLI for a running arena server. Talks to the admin endpoints over HTTP, the server
//! stays the only thing touching the store.
//!
//! ## Commands
//! - `show`: title plus every battle with counts and winner
//! - `create`: new battle, deadline either absolute or minutes from now
//! - `remove`: delete a battle for good
//! - `title`: rename the event
use anyhow::{Error, bail};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub mod models;

use models::{ADMIN_HEADER, Battle, ErrorBody, Event, NewBattle, Title};

pub struct Admin {
    client: Client,
    url: String,
    password: String,
}

impl Admin {
    pub fn new(url: &str, password: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            password: password.to_string(),
        }
    }

    fn admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(ADMIN_HEADER, &self.password)
    }

    pub async fn show(&self) -> Result<(), Error> {
        let response = self.client.get(format!("{}/api/event", self.url)).send().await?;
        let event: Event = json(response).await?;

        println!("{}", event.title);
        println!("Battles: {}\n", event.battles.len());

        for battle in &event.battles {
            println!("{}", describe(battle));
        }

        Ok(())
    }

    pub async fn create(&self, battle: NewBattle) -> Result<(), Error> {
        let request = self.client.post(format!("{}/api/admin/battles", self.url)).json(&battle);
        let created: Battle = json(self.admin(request).send().await?).await?;

        println!("Created battle {}", created.id);
        println!("{}", describe(&created));

        Ok(())
    }

    pub async fn remove(&self, id: u64) -> Result<(), Error> {
        let request = self.client.delete(format!("{}/api/admin/battles/{id}", self.url));
        check(self.admin(request).send().await?).await?;

        println!("Removed battle {id}");
        Ok(())
    }

    pub async fn title(&self, title: &str) -> Result<(), Error> {
        let request = self
            .client
            .post(format!("{}/api/admin/title", self.url))
            .json(&serde_json::json!({ "newTitle": title }));
        let updated: Title = json(self.admin(request).send().await?).await?;

        println!("Title: {}", updated.title);
        Ok(())
    }
}

pub fn deadline(
    at: Option<DateTime<Utc>>,
    closes_in: Option<i64>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, Error> {
    match (at, closes_in) {
        (Some(at), None) => Ok(at),
        (None, Some(minutes)) if minutes > 0 => Ok(now + Duration::minutes(minutes)),
        (None, Some(_)) => bail!("--closes-in must be a positive number of minutes"),
        _ => bail!("give exactly one of --deadline or --closes-in"),
    }
}

fn describe(battle: &Battle) -> String {
    let status = match (&battle.winner, battle.deadline) {
        (Some(winner), _) => format!("winner: {winner}"),
        (None, Some(deadline)) => format!("open until {deadline}"),
        (None, None) => "open".to_string(),
    };

    format!(
        "[{}] {} {} - {} {} ({status})",
        battle.id,
        battle.option_a.name,
        battle.option_a.vote_count,
        battle.option_b.vote_count,
        battle.option_b.name
    )
}

async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    bail!("{status}: {message}")
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    Ok(check(response).await?.json().await?)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use models::Contender;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_deadline_from_minutes() {
        assert_eq!(deadline(None, Some(90), now()).unwrap(), now() + Duration::minutes(90));
    }

    #[test]
    fn test_deadline_absolute() {
        let at = now() + Duration::days(3);
        assert_eq!(deadline(Some(at), None, now()).unwrap(), at);
    }

    #[test]
    fn test_deadline_needs_exactly_one() {
        assert!(deadline(None, None, now()).is_err());
        assert!(deadline(Some(now()), Some(5), now()).is_err());
        assert!(deadline(None, Some(0), now()).is_err());
    }

    #[test]
    fn test_describe() {
        let battle = Battle {
            id: 9,
            option_a: Contender {
                name: "Cat".into(),
                vote_count: 2,
            },
            option_b: Contender {
                name: "Dog".into(),
                vote_count: 1,
            },
            deadline: Some(now()),
            winner: Some("Cat".into()),
        };

        assert_eq!(describe(&battle), "[9] Cat 2 - 1 Dog (winner: Cat)");
    }
}
