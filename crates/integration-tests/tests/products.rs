//! Product endpoint tests: multipart create, partial update, image lifecycle.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::Value;

use shop_core::{Price, ProductId};
use shop_integration_tests::{MultipartForm, TestApp};
use shop_server::AppError;
use shop_server::db::{ProductRepository, ensure_affected};
use shop_server::models::NewProduct;
use shop_server::planner::{ProductPatch, plan_product_update};

const PNG: &[u8] = b"\x89PNG fake image bytes";

async fn create_mug(app: &TestApp) -> Value {
    let form = MultipartForm::new()
        .text("name", "Mug")
        .text("price", "450")
        .file("image", "mug.png", PNG);
    let response = app.send_form(Method::POST, "/product", form).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.bytes);
    response.json()["product"].clone()
}

fn image_of(product: &Value) -> String {
    product["image"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn create_stores_image_and_row() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;

    assert_eq!(product["name"], "Mug");
    assert_eq!(product["price"], 450);

    let image = image_of(&product);
    assert!(image.starts_with("/uploads/images/"), "{image}");
    assert!(image.ends_with("-mug.png"), "{image}");
    assert_eq!(std::fs::read(app.image_path(&image)).unwrap(), PNG);

    let id = product["id"].as_i64().unwrap();
    let shown = app.get(&format!("/product/{id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.json(), product);
}

#[tokio::test]
async fn stored_image_is_served() {
    let app = TestApp::new().await;
    let image = image_of(&create_mug(&app).await);

    let served = app.get(&image).await;
    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(&served.bytes[..], PNG);
}

#[tokio::test]
async fn list_returns_products_in_id_order() {
    let app = TestApp::new().await;
    create_mug(&app).await;
    let form = MultipartForm::new()
        .text("name", "Kettle")
        .text("price", "3900")
        .file("image", "kettle.jpg", b"jpg");
    app.send_form(Method::POST, "/product", form).await;

    let listed = app.get("/products").await.json();
    let names: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["Mug", "Kettle"]);
}

#[tokio::test]
async fn create_rejects_missing_or_invalid_fields() {
    let app = TestApp::new().await;

    let no_image = MultipartForm::new().text("name", "Mug").text("price", "450");
    let response = app.send_form(Method::POST, "/product", no_image).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "image is required");

    let zero_price = MultipartForm::new()
        .text("name", "Mug")
        .text("price", "0")
        .file("image", "mug.png", PNG);
    let response = app.send_form(Method::POST, "/product", zero_price).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let bad_price = MultipartForm::new()
        .text("name", "Mug")
        .text("price", "cheap")
        .file("image", "mug.png", PNG);
    let response = app.send_form(Method::POST, "/product", bad_price).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let no_name = MultipartForm::new()
        .text("price", "450")
        .file("image", "mug.png", PNG);
    let response = app.send_form(Method::POST, "/product", no_name).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "name is required");

    assert_eq!(app.get("/products").await.json(), serde_json::json!([]));
}

#[tokio::test]
async fn create_rejects_non_multipart_body() {
    let app = TestApp::new().await;
    let response = app
        .send_json(Method::POST, "/product", &serde_json::json!({"name": "Mug"}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!response.error().is_empty());
}

#[tokio::test]
async fn patch_updates_only_changed_fields() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();

    let form = MultipartForm::new().text("name", "Cup").text("price", "0");
    let response = app
        .send_form(Method::PATCH, &format!("/product/{id}"), form)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let updated = &response.json()["product"];
    assert_eq!(updated["name"], "Cup");
    assert_eq!(updated["price"], 450);
    assert_eq!(updated["image"], product["image"]);
}

#[tokio::test]
async fn patch_with_nothing_new_is_rejected() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await["id"].as_i64().unwrap();
    let uri = format!("/product/{id}");

    let zero_only = MultipartForm::new().text("price", "0");
    let response = app.send_form(Method::PATCH, &uri, zero_only).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "no data to update");

    let same_values = MultipartForm::new().text("name", "Mug").text("price", "450");
    let response = app.send_form(Method::PATCH, &uri, same_values).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let empty = MultipartForm::new().text("name", "");
    let response = app.send_form(Method::PATCH, &uri, empty).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn patch_image_replaces_file() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();
    let old_image = image_of(&product);

    let form = MultipartForm::new().file("image", "mug-v2.png", b"new bytes");
    let response = app
        .send_form(Method::PATCH, &format!("/product/{id}"), form)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let new_image = image_of(&response.json()["product"]);
    assert_ne!(new_image, old_image);
    assert!(new_image.ends_with("-mug-v2.png"));
    assert!(!app.image_path(&old_image).exists());
    assert_eq!(
        std::fs::read(app.image_path(&new_image)).unwrap(),
        b"new bytes"
    );
}

#[tokio::test]
async fn patch_with_negative_price_touches_nothing() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();
    let old_image = image_of(&product);

    let form = MultipartForm::new()
        .text("price", "-5")
        .file("image", "other.png", b"other");
    let response = app
        .send_form(Method::PATCH, &format!("/product/{id}"), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(app.image_path(&old_image).exists());
    let shown = app.get(&format!("/product/{id}")).await.json();
    assert_eq!(shown, product);
}

#[tokio::test]
async fn patch_and_delete_missing_product_are_not_found() {
    let app = TestApp::new().await;

    let form = MultipartForm::new().text("name", "Ghost");
    let response = app.send_form(Method::PATCH, "/product/99", form).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error(), "Product 99 not found");

    assert_eq!(app.delete("/product/99").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/product/99").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/product/abc").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        app.delete("/product/abc").await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn delete_removes_row_and_image() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();
    let image = image_of(&product);

    let response = app.delete(&format!("/product/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Product deleted");

    assert!(!app.image_path(&image).exists());
    assert_eq!(
        app.get(&format!("/product/{id}")).await.status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn delete_never_removes_files_outside_upload_root() {
    let app = TestApp::new().await;
    let outside = app.upload_root().parent().unwrap().join("secret.txt");
    std::fs::write(&outside, b"keep me").unwrap();

    let product = ProductRepository::new(app.pool())
        .create(&NewProduct {
            name: "Sneaky".to_owned(),
            price: Price::new(1).unwrap(),
            image: "/uploads/../secret.txt".to_owned(),
        })
        .await
        .unwrap();

    let response = app.delete(&format!("/product/{}", product.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(std::fs::read(&outside).unwrap(), b"keep me");
}

#[tokio::test]
async fn delete_product_without_image() {
    let app = TestApp::new().await;
    let product = ProductRepository::new(app.pool())
        .create(&NewProduct {
            name: "Plain".to_owned(),
            price: Price::new(1).unwrap(),
            image: "/".to_owned(),
        })
        .await
        .unwrap();

    let response = app.delete(&format!("/product/{}", product.id)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(app.upload_root().exists());
}

#[tokio::test]
async fn patch_with_unusable_file_name_keeps_current_image() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();
    let old_image = image_of(&product);

    for bad_name in ["dir/", "..", ""] {
        let form = MultipartForm::new().file("image", bad_name, b"new bytes");
        let response = app
            .send_form(Method::PATCH, &format!("/product/{id}"), form)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{bad_name:?}");
    }

    assert_eq!(std::fs::read(app.image_path(&old_image)).unwrap(), PNG);
    assert_eq!(app.get(&format!("/product/{id}")).await.json(), product);
}

#[tokio::test]
async fn patch_image_write_failure_leaves_row_unchanged() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();

    let images_dir = app.upload_root().join("images");
    std::fs::remove_dir_all(&images_dir).unwrap();
    std::fs::write(&images_dir, b"not a directory").unwrap();

    let form = MultipartForm::new()
        .text("name", "Cup")
        .file("image", "cup.png", b"cup");
    let response = app
        .send_form(Method::PATCH, &format!("/product/{id}"), form)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error(), "Failed to store image");

    assert_eq!(app.get(&format!("/product/{id}")).await.json(), product);
}

#[tokio::test]
async fn patch_with_blank_name_is_rejected() {
    let app = TestApp::new().await;
    let product = create_mug(&app).await;
    let id = product["id"].as_i64().unwrap();

    let form = MultipartForm::new().text("name", "   ");
    let response = app
        .send_form(Method::PATCH, &format!("/product/{id}"), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&format!("/product/{id}")).await.json()["name"], "Mug");
}

#[tokio::test]
async fn update_after_concurrent_delete_is_not_found() {
    let app = TestApp::new().await;
    let id = create_mug(&app).await["id"].as_i64().unwrap();
    let repo = ProductRepository::new(app.pool());

    let current = repo.get_by_id(ProductId::new(id)).await.unwrap().unwrap();
    let patch = ProductPatch {
        name: Some("Cup".to_owned()),
        ..ProductPatch::default()
    };
    let plan = plan_product_update(&current, &patch).unwrap();

    assert_eq!(
        app.delete(&format!("/product/{id}")).await.status,
        StatusCode::OK
    );

    let rows = repo.apply_update(&plan).await.unwrap();
    let err = AppError::from(ensure_affected(rows).unwrap_err());
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}
