use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::list::ListWithCards;
use super::membership::MemberDetail;

pub const DEFAULT_BOARD_COLOR: &str = "bg-blue-500";
pub const DEFAULT_BOARD_ICON: &str = "📋";

/// Top-level collaborative workspace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Presentation class, e.g. `bg-blue-500`.
    pub color: String,
    pub icon: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

/// A board with everything the board page renders: ordered lists with their
/// ordered cards, and the member roster.
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub lists: Vec<ListWithCards>,
    pub memberships: Vec<MemberDetail>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BoardInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub icon: Option<String>,
}

/// Partial board update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct BoardUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_input_validation() {
        let valid = BoardInput {
            title: "Roadmap".to_string(),
            description: None,
            color: None,
            icon: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = BoardInput {
            title: "".to_string(),
            description: None,
            color: None,
            icon: None,
        };
        assert!(empty_title.validate().is_err());

        let long_color = BoardInput {
            title: "Roadmap".to_string(),
            description: None,
            color: Some("c".repeat(31)),
            icon: None,
        };
        assert!(long_color.validate().is_err());
    }
}
