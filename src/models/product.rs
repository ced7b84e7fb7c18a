use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub in_stock: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /product` and `PUT /product/{id}`. Every field is optional
/// here so that missing values surface as validation messages.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// A product that passed validation and is ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub in_stock: bool,
    pub tags: Vec<String>,
}

/// Fields to overwrite on an existing product; `None` leaves the stored value.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.in_stock.is_none()
            && self.tags.is_none()
    }
}

#[derive(Debug, Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn required(&mut self, field: &str) {
        self.0.push(format!("{field}: Path `{field}` is required."));
    }

    fn check_price(&mut self, price: Decimal) {
        if price < Decimal::ZERO {
            self.0.push(format!(
                "price: Path `price` ({price}) is less than minimum allowed value (0)."
            ));
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_error(self) -> AppError {
        AppError::Validation(format!("Product validation failed: {}", self.0.join(", ")))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn non_blank(value: Option<String>, field: &str, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.required(field);
            None
        }
    }
}

impl TryFrom<ProductRequest> for NewProduct {
    type Error = AppError;

    fn try_from(request: ProductRequest) -> Result<Self> {
        let mut errors = FieldErrors::default();

        let name = non_blank(trimmed(request.name), "name", &mut errors);
        let description = non_blank(trimmed(request.description), "description", &mut errors);
        let price = match request.price {
            Some(price) => {
                errors.check_price(price);
                Some(price)
            }
            None => {
                errors.required("price");
                None
            }
        };
        let category = non_blank(request.category, "category", &mut errors);

        match (name, description, price, category) {
            (Some(name), Some(description), Some(price), Some(category)) if errors.is_empty() => {
                Ok(Self {
                    name,
                    description,
                    price,
                    category,
                    in_stock: request.in_stock.unwrap_or(true),
                    tags: request.tags.unwrap_or_default(),
                })
            }
            _ => Err(errors.into_error()),
        }
    }
}

impl TryFrom<ProductRequest> for ProductPatch {
    type Error = AppError;

    /// Only the fields present in the request are checked.
    fn try_from(request: ProductRequest) -> Result<Self> {
        let mut errors = FieldErrors::default();

        let name = trimmed(request.name);
        if name.as_deref().is_some_and(str::is_empty) {
            errors.required("name");
        }
        let description = trimmed(request.description);
        if description.as_deref().is_some_and(str::is_empty) {
            errors.required("description");
        }
        if request
            .category
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            errors.required("category");
        }
        if let Some(price) = request.price {
            errors.check_price(price);
        }

        if !errors.is_empty() {
            return Err(errors.into_error());
        }

        Ok(Self {
            name,
            description,
            price: request.price,
            category: request.category,
            in_stock: request.in_stock,
            tags: request.tags,
        })
    }
}

/// Product fields addressable from `sort` and `select`, by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Id,
    Name,
    Description,
    Price,
    Category,
    InStock,
    Tags,
    CreatedAt,
    UpdatedAt,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        ProductField::Id,
        ProductField::Name,
        ProductField::Description,
        ProductField::Price,
        ProductField::Category,
        ProductField::InStock,
        ProductField::Tags,
        ProductField::CreatedAt,
        ProductField::UpdatedAt,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProductField::Id => "_id",
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Category => "category",
            ProductField::InStock => "inStock",
            ProductField::Tags => "tags",
            ProductField::CreatedAt => "createdAt",
            ProductField::UpdatedAt => "updatedAt",
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Category => "category",
            ProductField::InStock => "in_stock",
            ProductField::Tags => "tags",
            ProductField::CreatedAt => "created_at",
            ProductField::UpdatedAt => "updated_at",
        }
    }
}

impl ProductField {
    /// Text columns sort bytewise, independent of the database collation.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            ProductField::Name | ProductField::Description | ProductField::Category
        )
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProductField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        ProductField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown product field '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::dec;

    use super::*;

    fn request() -> ProductRequest {
        ProductRequest {
            name: Some("  iPhone 12 ".to_string()),
            description: Some(" A phone. ".to_string()),
            price: Some(dec!(799.99)),
            category: Some("Electronics".to_string()),
            in_stock: None,
            tags: None,
        }
    }

    #[test]
    fn trims_text_and_applies_defaults() {
        let product = NewProduct::try_from(request()).expect("valid product");

        assert_eq!(product.name, "iPhone 12");
        assert_eq!(product.description, "A phone.");
        assert_eq!(product.price, dec!(799.99));
        assert_eq!(product.category, "Electronics");
        assert!(product.in_stock);
        assert!(product.tags.is_empty());
    }

    #[test]
    fn zero_price_is_allowed() {
        let product = NewProduct::try_from(ProductRequest {
            price: Some(Decimal::ZERO),
            ..request()
        })
        .expect("free products are valid");

        assert_eq!(product.price, Decimal::ZERO);
    }

    #[test]
    fn negative_price_fails_validation() {
        let err = NewProduct::try_from(ProductRequest {
            price: Some(dec!(-1)),
            ..request()
        })
        .expect_err("negative price");

        match err {
            AppError::Validation(msg) => {
                assert!(msg.starts_with("Product validation failed: "));
                assert!(msg.contains("price: Path `price` (-1) is less than minimum allowed value (0)."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case::missing_name(ProductRequest { name: None, ..request() }, "name")]
    #[case::blank_name(ProductRequest { name: Some("   ".to_string()), ..request() }, "name")]
    #[case::blank_description(ProductRequest { description: Some(String::new()), ..request() }, "description")]
    #[case::missing_price(ProductRequest { price: None, ..request() }, "price")]
    #[case::blank_category(ProductRequest { category: Some(" ".to_string()), ..request() }, "category")]
    fn required_fields_are_reported(#[case] input: ProductRequest, #[case] field: &str) {
        let err = NewProduct::try_from(input).expect_err("invalid product");

        let expected = format!("{field}: Path `{field}` is required.");
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains(&expected)));
    }

    #[test]
    fn reports_every_failing_field() {
        let err = NewProduct::try_from(ProductRequest::default()).expect_err("empty product");

        let AppError::Validation(msg) = err else {
            panic!("expected a validation error");
        };
        for field in ["name", "description", "price", "category"] {
            assert!(msg.contains(&format!("Path `{field}` is required.")), "{msg}");
        }
    }

    #[test]
    fn patch_keeps_only_present_fields() {
        let patch = ProductPatch::try_from(ProductRequest {
            name: Some(" Pixel 8 ".to_string()),
            in_stock: Some(false),
            ..ProductRequest::default()
        })
        .expect("valid patch");

        assert_eq!(patch.name.as_deref(), Some("Pixel 8"));
        assert_eq!(patch.in_stock, Some(false));
        assert!(patch.price.is_none());
        assert!(patch.description.is_none());
    }

    #[test]
    fn patch_rejects_blank_and_negative_values() {
        let err = ProductPatch::try_from(ProductRequest {
            name: Some("  ".to_string()),
            price: Some(dec!(-0.5)),
            ..ProductRequest::default()
        })
        .expect_err("invalid patch");

        let AppError::Validation(msg) = err else {
            panic!("expected a validation error");
        };
        assert!(msg.contains("name: Path `name` is required."));
        assert!(msg.contains("(-0.5) is less than minimum allowed value (0)."));
    }

    #[test]
    fn empty_patch_is_allowed() {
        let patch = ProductPatch::try_from(ProductRequest::default()).expect("empty patch");
        assert!(patch.is_empty());
    }

    #[test]
    fn serializes_with_wire_names() {
        let product = Product {
            id: Uuid::nil(),
            name: "Desk".to_string(),
            description: "Oak desk".to_string(),
            price: dec!(120.5),
            category: "Furniture".to_string(),
            in_stock: true,
            tags: vec!["wood".to_string()],
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };

        let value = serde_json::to_value(&product).expect("serializes");

        assert_eq!(value["_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["inStock"], true);
        assert_eq!(value["price"], 120.5);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("in_stock").is_none());
    }

    #[test]
    fn request_reads_camel_case_and_ignores_unknown_keys() {
        let request: ProductRequest = serde_json::from_str(
            r#"{"name":"Lamp","price":15,"inStock":false,"tags":["home"],"colour":"red"}"#,
        )
        .expect("deserializes");

        assert_eq!(request.price, Some(dec!(15)));
        assert_eq!(request.in_stock, Some(false));
        assert_eq!(request.tags, Some(vec!["home".to_string()]));
    }

    #[rstest]
    #[case("_id", ProductField::Id)]
    #[case("inStock", ProductField::InStock)]
    #[case("updatedAt", ProductField::UpdatedAt)]
    #[case("price", ProductField::Price)]
    fn parses_wire_names(#[case] input: &str, #[case] expected: ProductField) {
        assert_eq!(input.parse::<ProductField>().expect("known field"), expected);
    }

    #[test]
    fn rejects_unknown_and_column_names() {
        assert!("in_stock".parse::<ProductField>().is_err());
        assert!("price; DROP TABLE products".parse::<ProductField>().is_err());
    }
}
