use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AppError, Result},
    models::ProductField,
};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// Raw query string of `GET /product`. Unrecognised keys are dropped.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub price: Option<String>,
    pub name: Option<String>,
    pub sort: Option<String>,
    pub select: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: ProductField,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn asc(field: ProductField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(field: ProductField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    /// `price` sorts ascending, `-price` descending.
    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix('-') {
            Some(field) => Ok(SortKey::desc(field.parse()?)),
            None => Ok(SortKey::asc(s.parse()?)),
        }
    }
}

/// One `select` entry: `price` keeps the field, `-price` drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectKey {
    pub field: ProductField,
    pub excluded: bool,
}

impl FromStr for SelectKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.strip_prefix('-') {
            Some(field) => Ok(SelectKey {
                field: field.parse()?,
                excluded: true,
            }),
            None => Ok(SelectKey {
                field: s.parse()?,
                excluded: false,
            }),
        }
    }
}

/// Fields returned per product. Inclusion keeps `_id` unless `-_id` is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    Include {
        fields: Vec<ProductField>,
        with_id: bool,
    },
    Exclude(Vec<ProductField>),
}

impl Projection {
    pub fn keeps(&self, field: ProductField) -> bool {
        match self {
            Projection::Include { fields, with_id } => {
                fields.contains(&field) || (field == ProductField::Id && *with_id)
            }
            Projection::Exclude(fields) => !fields.contains(&field),
        }
    }
}

impl TryFrom<Vec<SelectKey>> for Projection {
    type Error = AppError;

    /// Inclusion and exclusion cannot be mixed, except for dropping `_id`.
    fn try_from(keys: Vec<SelectKey>) -> Result<Self> {
        let (excluded, included): (Vec<SelectKey>, Vec<SelectKey>) =
            keys.into_iter().partition(|key| key.excluded);
        let excluded: Vec<ProductField> = excluded.into_iter().map(|key| key.field).collect();

        if included.is_empty() {
            return Ok(Projection::Exclude(excluded));
        }

        if excluded.iter().any(|field| *field != ProductField::Id) {
            return Err(AppError::BadRequest(
                "Projection cannot have a mix of inclusion and exclusion.".to_string(),
            ));
        }

        Ok(Projection::Include {
            fields: included.into_iter().map(|key| key.field).collect(),
            with_id: excluded.is_empty(),
        })
    }
}

/// Typed view of [`ProductQuery`]. Empty strings count as absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListOptions {
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub name: Option<String>,
    pub sort: Option<Vec<SortKey>>,
    pub select: Option<Projection>,
    pub page: i64,
    pub limit: i64,
}

impl Default for ProductListOptions {
    fn default() -> Self {
        Self {
            category: None,
            price: None,
            name: None,
            sort: None,
            select: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Comma-separated list with empty segments skipped; `None` when nothing is left.
fn parse_list<T: FromStr<Err = AppError>>(value: Option<String>) -> Result<Option<Vec<T>>> {
    let Some(value) = present(value) else {
        return Ok(None);
    };

    let items = value
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::parse::<T>)
        .collect::<Result<Vec<T>>>()?;

    Ok(if items.is_empty() { None } else { Some(items) })
}

fn parse_price(value: Option<String>) -> Result<Option<Decimal>> {
    present(value)
        .map(|raw| {
            Decimal::from_str(raw.trim()).map_err(|_| {
                AppError::BadRequest(format!(
                    "Cast to Number failed for value \"{raw}\" (type string) at path \"price\" for model \"Product\""
                ))
            })
        })
        .transpose()
}

/// Zero or anything that is not an integer falls back to `default`.
fn parse_count(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|n| *n != 0)
        .unwrap_or(default)
}

impl TryFrom<ProductQuery> for ProductListOptions {
    type Error = AppError;

    fn try_from(query: ProductQuery) -> Result<Self> {
        Ok(Self {
            category: present(query.category),
            price: parse_price(query.price)?,
            name: present(query.name),
            sort: parse_list(query.sort)?,
            select: parse_list::<SelectKey>(query.select)?
                .map(Projection::try_from)
                .transpose()?,
            page: parse_count(query.page, DEFAULT_PAGE),
            limit: parse_count(query.limit, DEFAULT_LIMIT),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub product: Vec<Value>,
    /// Size of the returned page, not the number of matching records.
    pub nb_hits: usize,
}

impl ProductListResponse {
    pub fn new(product: Vec<Value>) -> Self {
        Self {
            nb_hits: product.len(),
            product,
        }
    }
}
