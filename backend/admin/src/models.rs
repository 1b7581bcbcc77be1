use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "http://localhost:3000";
pub const ADMIN_HEADER: &str = "x-admin-password";

#[derive(Deserialize)]
pub struct Event {
    pub title: String,
    pub battles: Vec<Battle>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub id: u64,
    pub option_a: Contender,
    pub option_b: Contender,
    pub deadline: Option<DateTime<Utc>>,
    pub winner: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contender {
    pub name: String,
    pub vote_count: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBattle {
    pub option_a_name: String,
    pub option_b_name: String,
    pub image_reference_a: String,
    pub image_reference_b: String,
    pub deadline: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct Title {
    pub title: String,
}

#[derive(Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
