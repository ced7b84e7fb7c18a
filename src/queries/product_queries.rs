use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{NewProduct, Product, ProductPatch},
    queries::ProductListing,
};

pub async fn create(pool: &PgPool, product: &NewProduct) -> Result<Product> {
    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, description, price, category, in_stock, tags)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(&product.category)
    .bind(product.in_stock)
    .bind(&product.tags)
    .fetch_one(pool)
    .await?;

    Ok(product)
}

pub async fn list(pool: &PgPool, listing: &ProductListing) -> Result<Vec<Product>> {
    tracing::debug!(
        filter = ?listing.filter,
        sort = ?listing.sort,
        skip = listing.window.skip,
        limit = listing.window.limit,
        "Listing products"
    );

    let mut query = listing.build_query();
    let products = query.build_query_as::<Product>().fetch_all(pool).await?;

    Ok(products)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub fn build_update(id: Uuid, patch: &ProductPatch) -> QueryBuilder<'static, Postgres> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE products SET ");

    {
        let mut assignments = query.separated(", ");

        if let Some(ref name) = patch.name {
            assignments.push("name = ");
            assignments.push_bind_unseparated(name.clone());
        }
        if let Some(ref description) = patch.description {
            assignments.push("description = ");
            assignments.push_bind_unseparated(description.clone());
        }
        if let Some(price) = patch.price {
            assignments.push("price = ");
            assignments.push_bind_unseparated(price);
        }
        if let Some(ref category) = patch.category {
            assignments.push("category = ");
            assignments.push_bind_unseparated(category.clone());
        }
        if let Some(in_stock) = patch.in_stock {
            assignments.push("in_stock = ");
            assignments.push_bind_unseparated(in_stock);
        }
        if let Some(ref tags) = patch.tags {
            assignments.push("tags = ");
            assignments.push_bind_unseparated(tags.clone());
        }

        assignments.push("updated_at = now()");
    }

    query.push(" WHERE id = ");
    query.push_bind(id);
    query.push(" RETURNING *");

    query
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &ProductPatch) -> Result<Option<Product>> {
    let mut query = build_update(id, patch);
    let product = query
        .build_query_as::<Product>()
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn delete_by_id(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn delete_all(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products").execute(pool).await?;

    tracing::info!("Deleted {} products", result.rows_affected());

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn update_sets_only_present_fields() {
        let patch = ProductPatch {
            name: Some("Pixel 8".to_string()),
            price: Some(dec!(599)),
            ..ProductPatch::default()
        };

        let query = build_update(Uuid::nil(), &patch);

        assert_eq!(
            query.sql(),
            "UPDATE products SET name = $1, price = $2, updated_at = now() WHERE id = $3 RETURNING *"
        );
    }

    #[test]
    fn empty_update_only_touches_timestamp() {
        let query = build_update(Uuid::nil(), &ProductPatch::default());

        assert_eq!(
            query.sql(),
            "UPDATE products SET updated_at = now() WHERE id = $1 RETURNING *"
        );
    }

    #[test]
    fn full_update_covers_every_column() {
        let patch = ProductPatch {
            name: Some("Desk".to_string()),
            description: Some("Oak".to_string()),
            price: Some(dec!(1)),
            category: Some("Furniture".to_string()),
            in_stock: Some(false),
            tags: Some(vec![]),
        };

        let query = build_update(Uuid::nil(), &patch);

        assert_eq!(
            query.sql(),
            "UPDATE products SET name = $1, description = $2, price = $3, category = $4, \
             in_stock = $5, tags = $6, updated_at = now() WHERE id = $7 RETURNING *"
        );
    }
}
