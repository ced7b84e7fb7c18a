use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    error::{AppError, Result},
    models::{Product, ProductField, ProductListOptions, Projection, SortKey},
};

/// Ordering used when the request does not override it.
pub const BASE_ORDERING: [SortKey; 2] = [
    SortKey::asc(ProductField::Name),
    SortKey::asc(ProductField::Price),
];

/// Field constraints every listed product must satisfy. Empty matches all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub price: Option<Decimal>,
    /// Case-insensitive regular expression matched anywhere in `name`.
    pub name_pattern: Option<String>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.price.is_none() && self.name_pattern.is_none()
    }
}

/// Offset pagination window derived from a 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: i64,
    pub limit: i64,
}

impl PageWindow {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            skip: page.saturating_sub(1).saturating_mul(limit),
            limit,
        }
    }
}

/// One `GET /product` request, fully resolved and ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub filter: ProductFilter,
    pub sort: Vec<SortKey>,
    pub projection: Option<Projection>,
    pub window: PageWindow,
}

impl From<ProductListOptions> for ProductListing {
    fn from(options: ProductListOptions) -> Self {
        Self {
            filter: ProductFilter {
                category: options.category,
                price: options.price,
                name_pattern: options.name,
            },
            sort: options.sort.unwrap_or_else(|| BASE_ORDERING.to_vec()),
            projection: options.select,
            window: PageWindow::new(options.page, options.limit),
        }
    }
}

impl ProductListing {
    pub fn build_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM products WHERE 1=1");

        if let Some(ref category) = self.filter.category {
            query.push(" AND category = ");
            query.push_bind(category.clone());
        }

        if let Some(price) = self.filter.price {
            query.push(" AND price = ");
            query.push_bind(price);
        }

        if let Some(ref pattern) = self.filter.name_pattern {
            query.push(" AND name ~* ");
            query.push_bind(pattern.clone());
        }

        query.push(" ORDER BY ");
        {
            let mut order = query.separated(", ");
            for key in &self.sort {
                let collation = if key.field.is_text() { " COLLATE \"C\"" } else { "" };
                order.push(format!(
                    "{}{} {}",
                    key.field.column(),
                    collation,
                    key.direction.as_sql()
                ));
            }
            // stable pages when every requested key ties
            if !self.sort.iter().any(|key| key.field == ProductField::Id) {
                order.push("id ASC");
            }
        }

        query.push(" LIMIT ");
        query.push_bind(self.window.limit);
        query.push(" OFFSET ");
        query.push_bind(self.window.skip);

        query
    }

    /// Applies the `select` projection, or returns every field when nothing
    /// was selected.
    pub fn project(&self, products: Vec<Product>) -> Result<Vec<Value>> {
        products
            .into_iter()
            .map(|product| -> Result<Value> {
                let value = serde_json::to_value(product)
                    .map_err(|e| AppError::InternalError(e.to_string()))?;

                let Some(ref projection) = self.projection else {
                    return Ok(value);
                };

                match value {
                    Value::Object(mut record) => {
                        record.retain(|key, _| {
                            ProductField::ALL
                                .into_iter()
                                .find(|field| field.key() == key)
                                .is_some_and(|field| projection.keeps(field))
                        });
                        Ok(Value::Object(record))
                    }
                    other => Ok(other),
                }
            })
            .collect()
    }
}
