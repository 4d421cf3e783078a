use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppResult, FieldErrors},
    models::Category,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        let name = self.name.trim();
        let mut errors = FieldErrors::new();
        errors
            .check(!name.is_empty(), "name", "Category name is required")
            .check(
                name.chars().count() <= 50,
                "name",
                "Category name must be at most 50 characters",
            );
        errors.into_result()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_length_is_bounded() {
        let ok = CategoryRequest {
            name: "x".repeat(50),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = CategoryRequest {
            name: "x".repeat(51),
            description: None,
        };
        assert!(too_long.validate().is_err());

        let blank = CategoryRequest {
            name: "   ".into(),
            description: Some("desc".into()),
        };
        assert!(blank.validate().is_err());
    }
}
