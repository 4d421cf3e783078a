use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppResult, FieldErrors},
    models::{Product, is_service_type},
};

/// Upper bound for a price in minor units.
pub const MAX_PRICE: i64 = 100_000_000;

fn default_product_type() -> String {
    "product".to_string()
}

fn default_active() -> bool {
    true
}

/// Body for both creating and replacing a product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units.
    pub price: i64,
    pub category_id: Option<Uuid>,
    /// `"service"` for a service, anything else for a physical good.
    #[serde(default = "default_product_type")]
    pub product_type: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        let name = self.name.trim();
        let mut errors = FieldErrors::new();
        errors
            .check(!name.is_empty(), "name", "Name is required")
            .check(
                name.chars().count() <= 100,
                "name",
                "Name must be at most 100 characters",
            )
            .check(self.price > 0, "price", "Price must be greater than 0")
            .check(
                self.price <= MAX_PRICE,
                "price",
                "Price exceeds the allowed maximum",
            );
        errors.into_result()
    }

    pub fn is_service(&self) -> bool {
        is_service_type(&self.product_type)
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn request(price: i64) -> ProductRequest {
        ProductRequest {
            name: "Landing page template".into(),
            description: None,
            price,
            category_id: None,
            product_type: "product".into(),
            is_active: true,
        }
    }

    #[test]
    fn price_must_be_positive() {
        assert!(request(1).validate().is_ok());
        let Err(AppError::Validation(fields)) = request(0).validate() else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].field, "price");
        assert!(request(-5).validate().is_err());
        assert!(request(MAX_PRICE + 1).validate().is_err());
    }

    #[test]
    fn missing_type_defaults_to_product() {
        let req: ProductRequest =
            serde_json::from_str(r#"{"name":"Logo","price":300000}"#).unwrap();
        assert_eq!(req.product_type, "product");
        assert!(!req.is_service());
        assert!(req.is_active);
    }
}
