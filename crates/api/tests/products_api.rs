//! HTTP-level integration tests for product roots and products.

mod common;

use std::io::Cursor;

use axum::http::StatusCode;
use base64::Engine;
use common::{
    body_json, build_test_app, build_test_app_with_bus, create_shirt, delete, get, head,
    patch_json, post_json, shirt_body,
};
use serde_json::json;
use sqlx::PgPool;

fn png_base64(width: u32, height: u32) -> String {
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(width, height)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(bytes.into_inner())
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_expands_every_combination(pool: PgPool) {
    let json = create_shirt(&pool, "shirt").await;

    assert_eq!(json["sku_prefix"], "shirt");
    assert_eq!(json["quantity_per_package"], 1);

    let products = json["products"].as_array().unwrap();
    let skus: Vec<&str> = products.iter().map(|p| p["sku"].as_str().unwrap()).collect();
    assert_eq!(
        skus,
        ["shirt_red_s", "shirt_red_m", "shirt_blue_s", "shirt_blue_m"]
    );
    assert_eq!(products[0]["option_summary"], "color: red, size: S");
    assert_eq!(products[3]["option_summary"], "color: blue, size: M");
    for product in products {
        assert_eq!(product["applicable_options"].as_array().unwrap().len(), 2);
        assert_eq!(product["price"], 19.99);
    }

    let options = json["options"].as_array().unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[1]["values"][1]["value"], "M");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_without_options_makes_one_product(pool: PgPool) {
    let app = build_test_app(pool);
    let response = post_json(app, "/v1/product", json!({"name": "Mug", "sku": "mug"})).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let products = json["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["sku"], "mug");
    assert_eq!(products[0]["option_summary"], "");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_empty_option_makes_no_products(pool: PgPool) {
    let app = build_test_app(pool);
    let body = json!({
        "name": "Poster",
        "sku": "poster",
        "options": [{"name": "size", "values": []}],
    });
    let response = post_json(app, "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["products"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_prefix_is_rejected_and_persists_nothing(pool: PgPool) {
    create_shirt(&pool, "shirt").await;

    let mut body = shirt_body("shirt");
    body["name"] = json!("Another shirt");
    let response = post_json(build_test_app(pool.clone()), "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
    assert_eq!(json["message"], "product with sku 'shirt' already exists");

    let roots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_roots")
        .fetch_one(&pool)
        .await
        .unwrap();
    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(roots, 1);
    assert_eq!(products, 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_bodies_are_bad_requests(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(app, "/v1/product", json!({"name": "Shirt", "sku": "has space"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "sku: the sku received (has space) is invalid");

    let app = build_test_app(pool.clone());
    let body = json!({
        "name": "Shirt",
        "sku": "shirt",
        "options": [
            {"name": "color", "values": ["red"]},
            {"name": "color", "values": ["blue"]},
        ],
    });
    let response = post_json(app, "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = build_test_app(pool);
    let response = post_json(app, "/v1/product", json!({"sku": "shirt"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], 400);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_images_sets_primary(pool: PgPool) {
    let app = build_test_app(pool);
    let body = json!({
        "name": "Hat",
        "sku": "hat-images",
        "options": [{"name": "color", "values": ["red", "blue"]}],
        "images": [
            {"type": "base64", "data": png_base64(8, 8)},
            {"type": "base64", "data": png_base64(4, 4), "is_primary": true},
        ],
    });
    let response = post_json(app, "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let images = json["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(
        images[0]["thumbnail_url"],
        "/product_images/hat-images/0/thumbnail.png"
    );
    assert_eq!(json["primary_image_id"], images[1]["id"]);
    assert_eq!(json["products"][0]["primary_image_id"], images[1]["id"]);
    assert!(json["products"][1]["primary_image_id"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_image_payload_rolls_nothing_in(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let body = json!({
        "name": "Hat",
        "sku": "hat",
        "images": [{"type": "base64", "data": "definitely not base64!"}],
    });
    let response = post_json(app, "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let roots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_roots")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(roots, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn oversized_option_set_is_rejected_and_persists_nothing(pool: PgPool) {
    let values: Vec<String> = (0..10).map(|i| format!("v{i}")).collect();
    let options: Vec<_> = (0..10)
        .map(|i| json!({"name": format!("axis{i}"), "values": values}))
        .collect();
    let body = json!({"name": "Everything", "sku": "everything", "options": options});

    let response = post_json(build_test_app(pool.clone()), "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "options would produce 10000000000 products; at most 1000 are allowed"
    );

    let roots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_roots")
        .fetch_one(&pool)
        .await
        .unwrap();
    let options: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product_options")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(roots, 0);
    assert_eq!(options, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn values_differing_only_by_case_are_rejected(pool: PgPool) {
    let body = json!({
        "name": "Shirt",
        "sku": "shirt",
        "options": [{"name": "color", "values": ["Red", "red"]}],
    });
    let response = post_json(build_test_app(pool.clone()), "/v1/product", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let message = json["message"].as_str().unwrap();
    assert_eq!(
        message,
        "options[0].values: option value 'red' was provided more than once"
    );
    assert!(!message.contains("uq_"));

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(products, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn creation_publishes_product_created(pool: PgPool) {
    let (app, bus) = build_test_app_with_bus(pool);
    let mut events = bus.subscribe();

    let response = post_json(app, "/v1/product", shirt_body("shirt")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, "product_created");
    assert_eq!(event.payload["sku_prefix"], "shirt");
    assert_eq!(event.payload["products"].as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn get_product_by_sku(pool: PgPool) {
    create_shirt(&pool, "shirt").await;

    let response = get(build_test_app(pool.clone()), "/v1/product/shirt_blue_m").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["option_summary"], "color: blue, size: M");
    let values: Vec<&str> = json["applicable_options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["value"].as_str().unwrap())
        .collect();
    assert_eq!(values, ["blue", "M"]);

    let response = get(build_test_app(pool), "/v1/product/shirt_green_m").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "The product you were looking for (sku 'shirt_green_m') does not exist"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn head_reports_existence(pool: PgPool) {
    create_shirt(&pool, "shirt").await;

    let response = head(build_test_app(pool.clone()), "/v1/product/shirt_red_s").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = head(build_test_app(pool), "/v1/product/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_products_is_paginated(pool: PgPool) {
    create_shirt(&pool, "shirt").await;

    let response = get(build_test_app(pool.clone()), "/v1/products?page=2&limit=3").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 4);
    assert_eq!(json["limit"], 3);
    assert_eq!(json["page"], 2);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["sku"], "shirt_blue_m");

    let response = get(build_test_app(pool), "/v1/products?limit=500").await;
    let json = body_json(response).await;
    assert_eq!(json["limit"], 50);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_updates_fields_and_publishes(pool: PgPool) {
    create_shirt(&pool, "shirt").await;
    let (app, bus) = build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();

    let response = patch_json(
        app,
        "/v1/product/shirt_red_s",
        json!({"name": "Red shirt", "price": 24.5, "sku": "shirt_red_small"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Red shirt");
    assert_eq!(json["price"], 24.5);
    assert_eq!(json["sku"], "shirt_red_small");
    assert!(json["updated_on"].is_string());
    assert_eq!(json["applicable_options"].as_array().unwrap().len(), 2);

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, "product_updated");
    assert_eq!(event.payload["sku"], "shirt_red_small");

    let response = get(build_test_app(pool), "/v1/product/shirt_red_small").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn patch_rejects_taken_or_invalid_sku(pool: PgPool) {
    create_shirt(&pool, "shirt").await;

    let response = patch_json(
        build_test_app(pool.clone()),
        "/v1/product/shirt_red_s",
        json!({"sku": "shirt_red_m"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(
        build_test_app(pool.clone()),
        "/v1/product/shirt_red_s",
        json!({"sku": "bad sku!"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json(
        build_test_app(pool),
        "/v1/product/missing",
        json!({"name": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_archives_product_and_bridges(pool: PgPool) {
    create_shirt(&pool, "shirt").await;
    let (app, bus) = build_test_app_with_bus(pool.clone());
    let mut events = bus.subscribe();

    let response = delete(app, "/v1/product/shirt_red_s").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["archived_on"].is_string());

    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, "product_archived");

    let response = get(build_test_app(pool.clone()), "/v1/product/shirt_red_s").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let live_bridges: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_variant_bridge b
         JOIN products p ON p.id = b.product_id
         WHERE p.sku = 'shirt_red_s' AND b.archived_on IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(live_bridges, 0);

    let response = delete(build_test_app(pool), "/v1/product/shirt_red_s").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn get_and_list_roots(pool: PgPool) {
    let created = create_shirt(&pool, "shirt").await;
    create_shirt(&pool, "tee").await;
    let id = created["id"].as_i64().unwrap();

    let response = get(build_test_app(pool.clone()), &format!("/v1/product_root/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["sku_prefix"], "shirt");
    assert_eq!(json["products"].as_array().unwrap().len(), 4);
    assert_eq!(json["options"][0]["values"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["products"][0]["applicable_options"]
            .as_array()
            .unwrap()
            .len(),
        2
    );

    let response = get(build_test_app(pool.clone()), "/v1/product_roots").await;
    let json = body_json(response).await;
    assert_eq!(json["count"], 2);
    let data = json["data"].as_array().unwrap();
    assert_eq!(data[0]["sku_prefix"], "shirt");
    assert_eq!(data[1]["products"][0]["sku"], "tee_red_s");

    let response = get(build_test_app(pool), "/v1/product_root/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_root_archives_everything_it_owns(pool: PgPool) {
    let created = create_shirt(&pool, "shirt").await;
    let id = created["id"].as_i64().unwrap();

    let response = delete(build_test_app(pool.clone()), &format!("/v1/product_root/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(pool.clone()), &format!("/v1/product_root/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(build_test_app(pool.clone()), "/v1/products").await;
    assert_eq!(body_json(response).await["count"], 0);

    for table in ["product_options", "product_option_values", "product_variant_bridge"] {
        let live: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE archived_on IS NULL"
        ))
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(live, 0, "{table} should have no live rows");
    }

    // The prefix is free again once archived.
    create_shirt(&pool, "shirt").await;
}
