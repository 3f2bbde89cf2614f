use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const DEFAULT_LABEL_COLOR: &str = "bg-blue-500";
pub const DEFAULT_LABEL_TEXT_COLOR: &str = "text-white";

/// A board-scoped tag that cards of the same board can carry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Label {
    pub id: i32,
    pub board_id: i32,
    pub name: String,
    pub color: String,
    pub text_color: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LabelInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 30))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub text_color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LabelUpdate {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub color: Option<String>,
    #[validate(length(min = 1, max = 30))]
    pub text_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_input_validation() {
        let valid = LabelInput {
            name: "bug".to_string(),
            color: Some("bg-red-500".to_string()),
            text_color: None,
        };
        assert!(valid.validate().is_ok());

        let too_long = LabelInput {
            name: "x".repeat(51),
            color: None,
            text_color: None,
        };
        assert!(too_long.validate().is_err());
    }
}
