use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::card::Card;

/// A column on a board. Lists are shown by `(order, id)` ascending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct List {
    pub id: i32,
    pub board_id: i32,
    pub title: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(range(min = 0))]
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(range(min = 0))]
    pub order: Option<i32>,
}
