use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A card inside a list, with its assignee and label ids inlined.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i32,
    pub list_id: i32,
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    /// Sorted ascending.
    pub assignee_ids: Vec<i32>,
    /// Sorted ascending.
    pub label_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CardInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub order: Option<i32>,
    pub assignee_ids: Option<Vec<i32>>,
    pub label_ids: Option<Vec<i32>>,
}

/// Partial card update. `list_id` moves the card to another list of the same board;
/// `assignee_ids` and `label_ids` replace the whole set when present.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CardUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub order: Option<i32>,
    pub list_id: Option<i32>,
    pub assignee_ids: Option<Vec<i32>>,
    pub label_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_input_validation() {
        let valid = CardInput {
            title: "Write release notes".to_string(),
            description: Some("@alice please review".to_string()),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            order: Some(3),
            assignee_ids: Some(vec![1, 2]),
            label_ids: None,
        };
        assert!(valid.validate().is_ok());

        let long_title = CardInput {
            title: "a".repeat(256),
            description: None,
            due_date: None,
            order: None,
            assignee_ids: None,
            label_ids: None,
        };
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_card_update_accepts_partial_payload() {
        let update: CardUpdate = serde_json::from_str(r#"{"assignee_ids": [4, 2]}"#).unwrap();
        assert!(update.title.is_none());
        assert_eq!(update.assignee_ids, Some(vec![4, 2]));
        assert!(update.validate().is_ok());

        let update: CardUpdate = serde_json::from_str(r#"{"order": -5}"#).unwrap();
        assert!(update.validate().is_err());
    }
}
