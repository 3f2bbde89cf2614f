use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Checklist {
    pub id: i32,
    pub card_id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChecklistItem {
    pub id: i32,
    pub checklist_id: i32,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A checklist with its items in creation order.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChecklistWithItems {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChecklistInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChecklistItemInput {
    #[validate(length(min = 1, max = 255))]
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChecklistItemUpdate {
    #[validate(length(min = 1, max = 255))]
    pub text: Option<String>,
    pub completed: Option<bool>,
}
