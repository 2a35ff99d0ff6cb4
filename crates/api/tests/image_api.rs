//! Image uploads, slot validation and the custom-image progress unit.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, png, seed_admin, seed_client, upload};
use serde_json::json;
use sqlx::PgPool;

/// One valid upload for every required key.
const REQUIRED_UPLOADS: [((&str, &str, &str), (u32, u32)); 8] = [
    (("driver", "playstore", "logo_1024"), (1024, 1024)),
    (("driver", "playstore", "logo_352"), (352, 68)),
    (("driver", "playstore", "feature"), (1243, 2486)),
    (("driver", "appstore", "feature"), (1242, 2688)),
    (("passenger", "playstore", "logo_1024"), (1024, 1024)),
    (("passenger", "playstore", "logo_352"), (352, 68)),
    (("passenger", "playstore", "feature"), (1243, 2486)),
    (("passenger", "appstore", "feature"), (1242, 2688)),
];

async fn use_custom_images(app: &common::TestApp, token: &str) {
    let response = patch_json(
        app.app(),
        "/api/v1/me/form",
        token,
        json!({ "image_source": "custom" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_records_image_and_blob(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;
    use_custom_images(&app, &client.token).await;

    let response = upload(
        app.app(),
        &client.token,
        ("driver", "playstore", "logo_1024"),
        "logo.png",
        &png(1024, 1024),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = &body_json(response).await["data"];
    let image = &data["image"];
    assert_eq!(image["dimensions"], "1024x1024");
    assert_eq!(image["file_name"], "logo.png");
    assert_eq!(image["form_id"], client.form_id());
    assert!(image["file_url"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:3000/files/"));

    let storage_path = image["storage_path"].as_str().unwrap();
    assert!(app.storage.path().join(storage_path).exists());

    // A single upload does not complete the catalog.
    assert_eq!(data["form"]["images_uploaded"], false);
    assert!(data["form"]["last_activity_date"].is_string());

    let response = get(app.app(), "/api/v1/me/form/images", Some(&client.token)).await;
    let images = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(images.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_uploads_are_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let response = upload(
        app.app(),
        &client.token,
        ("driver", "playstore", "logo_1024"),
        "logo.png",
        &png(512, 512),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("1024x1024"));

    // App Store listings have no banner slot.
    let response = upload(
        app.app(),
        &client.token,
        ("driver", "appstore", "banner_1024"),
        "banner.png",
        &png(1024, 500),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(
        app.app(),
        &client.token,
        ("driver", "playstore", "logo_1024"),
        "logo.jpg",
        b"definitely not a png",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = upload(
        app.app(),
        &client.token,
        ("rider", "playstore", "logo_1024"),
        "logo.png",
        &png(1024, 1024),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(app.app(), "/api/v1/me/form/images", Some(&client.token)).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_slot_maximum_is_enforced(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let key = ("passenger", "playstore", "logo_352");
    let first = upload(app.app(), &client.token, key, "a.png", &png(352, 68)).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = upload(app.app(), &client.token, key, "b.png", &png(352, 68)).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert!(json["error"].as_str().unwrap().contains("maximum"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_multipart_field_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let boundary = "intake-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"app_type\"\r\n\r\ndriver\r\n--{boundary}--\r\n"
    );
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/me/form/images")
        .header("authorization", format!("Bearer {}", client.token))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(axum::body::Body::from(body))
        .unwrap();

    let response = common::send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_removes_row_and_blob(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;

    let response = upload(
        app.app(),
        &client.token,
        ("driver", "playstore", "banner_1024"),
        "banner.png",
        &png(1024, 500),
    )
    .await;
    let image = body_json(response).await["data"]["image"].clone();
    let id = image["id"].as_i64().unwrap();
    let blob = app.storage.path().join(image["storage_path"].as_str().unwrap());
    assert!(blob.exists());

    let response = delete(
        app.app(),
        &format!("/api/v1/me/form/images/{id}"),
        &client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!blob.exists());

    let response = delete(
        app.app(),
        &format!("/api/v1/me/form/images/{id}"),
        &client.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clients_cannot_delete_each_others_images(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let owner = seed_client(&app, &admin, "Acme Rides").await;
    let other = seed_client(&app, &admin, "Zoom Cabs").await;

    let response = upload(
        app.app(),
        &owner.token,
        ("driver", "playstore", "logo_1024"),
        "logo.png",
        &png(1024, 1024),
    )
    .await;
    let id = body_json(response).await["data"]["image"]["id"]
        .as_i64()
        .unwrap();

    let response = delete(
        app.app(),
        &format!("/api/v1/me/form/images/{id}"),
        &other.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_catalog_earns_image_unit(pool: PgPool) {
    let app = common::build_test_app(pool);
    let admin = seed_admin(&app, "admin@intake.test").await;
    let client = seed_client(&app, &admin, "Acme Rides").await;
    use_custom_images(&app, &client.token).await;

    let mut last_form = json!(null);
    for (key, (w, h)) in REQUIRED_UPLOADS {
        let response = upload(app.app(), &client.token, key, "shot.png", &png(w, h)).await;
        assert_eq!(response.status(), StatusCode::CREATED, "upload {key:?}");
        last_form = body_json(response).await["data"]["form"].clone();
    }

    assert_eq!(last_form["images_uploaded"], true);
    // 1 of 12 units.
    assert_eq!(last_form["progress_percentage"], 8);

    let response = get(app.app(), "/api/v1/me/form/image-slots", Some(&client.token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let slots = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(slots.len(), 10);

    let driver_logo = slots
        .iter()
        .find(|s| s["category"] == "driver_playstore_logo_1024")
        .unwrap();
    assert_eq!(driver_logo["uploaded"], 1);
    assert_eq!(driver_logo["required"], true);
    assert_eq!(driver_logo["dimensions"], json!(["1024x1024"]));

    let banner = slots
        .iter()
        .find(|s| s["category"] == "passenger_playstore_banner_1024")
        .unwrap();
    assert_eq!(banner["required"], false);
    assert_eq!(banner["uploaded"], 0);
}
