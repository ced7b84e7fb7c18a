use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        NewProduct, Product, ProductListOptions, ProductListResponse, ProductPatch, ProductQuery,
        ProductRequest,
    },
    queries::{ProductListing, product_queries},
    utils::extractors::parse_record_id,
};

pub async fn list_products(
    State(state): State<AppState>,
    params: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ProductListResponse>> {
    let Query(params) = params?;
    let listing = ProductListing::from(ProductListOptions::try_from(params)?);

    let products = product_queries::list(&state.db, &listing).await?;

    Ok(Json(ProductListResponse::new(listing.project(products)?)))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let Json(payload) = payload?;
    let product = NewProduct::try_from(payload)?;

    let product = product_queries::create(&state.db, &product).await?;
    tracing::info!(id = %product.id, "Product created");

    Ok(Json(product))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_record_id(&id).map_err(AppError::into_lookup_failure)?;

    let product = product_queries::find_by_id(&state.db, id)
        .await
        .map_err(AppError::into_lookup_failure)?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Product>> {
    let id = parse_record_id(&id)?;
    let Json(payload) = payload?;
    let patch = ProductPatch::try_from(payload)?;

    let product = product_queries::update(&state.db, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_record_id(&id)?;

    let deleted = product_queries::delete_by_id(&state.db, id).await?;
    tracing::info!(%id, deleted, "Product delete requested");

    Ok(Json(json!({ "message": "Product deleted" })))
}

pub async fn delete_all_products(State(state): State<AppState>) -> Result<Json<Value>> {
    product_queries::delete_all(&state.db).await?;

    Ok(Json(json!({ "message": "Product deleted" })))
}
