//! Product route handlers.
//!
//! Create and update take `multipart/form-data` with the text fields `name`
//! and `price` and a file field `image`. A PATCH that carries an image swaps
//! the stored file before the row is touched.

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use shop_core::{Price, ProductId};

use super::{MessageResponse, parse_id};
use crate::db::ensure_affected;
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product};
use crate::planner::{ProductPatch, plan_product_update};
use crate::state::AppState;

/// Body of a successful create or update.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub message: &'static str,
    pub product: Product,
}

/// An uploaded file part.
#[derive(Debug)]
struct ImageUpload {
    file_name: String,
    bytes: Bytes,
}

/// Raw product form fields, each absent unless the client sent it.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<String>,
    image: Option<ImageUpload>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(field_name) = field.name().map(str::to_owned) else {
                continue;
            };

            match field_name.as_str() {
                "name" => form.name = Some(field.text().await?),
                "price" => form.price = Some(field.text().await?),
                "image" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was picked
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.image = Some(ImageUpload { file_name, bytes });
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Parse the price field. Blank or missing means not provided.
    fn price(&self) -> Result<Option<i64>> {
        match self.price.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("invalid price: {raw:?}"))),
        }
    }
}

fn product_not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("Product {id}"))
}

/// List all products.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list().await?))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id: ProductId = parse_id(&id)?;
    let product = state
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(product))
}

/// Create a product. Name, a positive price, and an image are all required.
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    let form = ProductForm::read(multipart?).await?;

    let price = form
        .price()?
        .ok_or_else(|| AppError::BadRequest("price is required".to_owned()))?;
    let price = Price::new(price).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let name = form
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_owned()))?;

    let upload = form
        .image
        .ok_or_else(|| AppError::BadRequest("image is required".to_owned()))?;
    let image = state
        .images()
        .store(&upload.file_name, &upload.bytes)
        .await?;

    let product = state
        .products()
        .create(&NewProduct { name, price, image })
        .await?;
    tracing::info!(product_id = %product.id, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            message: "Product created",
            product,
        }),
    ))
}

/// Apply a partial update to a product.
///
/// Only fields that differ from the stored row are written. A price of 0 means
/// "not provided"; a negative price is rejected before any file is touched.
#[instrument(skip(state, multipart))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ProductResponse>> {
    let id: ProductId = parse_id(&id)?;
    let form = ProductForm::read(multipart?).await?;

    let price = form.price()?;
    if let Some(amount) = price
        && amount < 0
    {
        return Err(AppError::BadRequest(format!(
            "price must be greater than zero, got {amount}"
        )));
    }

    let repo = state.products();
    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    let mut patch = ProductPatch {
        name: form.name,
        price,
        image: None,
    };
    if let Some(upload) = form.image {
        let reference = state
            .images()
            .replace(&current.image, &upload.file_name, &upload.bytes)
            .await?;
        patch.image = Some(reference);
    }

    let plan = plan_product_update(&current, &patch)?;
    ensure_affected(repo.apply_update(&plan).await?)?;
    tracing::info!(
        product_id = %id,
        columns = ?plan.columns().collect::<Vec<_>>(),
        "Product updated"
    );

    let product = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;

    Ok(Json(ProductResponse {
        message: "Product updated",
        product,
    }))
}

/// Delete a product, then its image file (best effort).
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: ProductId = parse_id(&id)?;
    let repo = state.products();

    let current = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    ensure_affected(repo.delete(id).await?)?;

    let outcome = state.images().discard(&current.image).await;
    tracing::info!(product_id = %id, image = ?outcome, "Product deleted");

    Ok(Json(MessageResponse {
        message: "Product deleted",
    }))
}
