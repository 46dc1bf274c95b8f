use axum::http::StatusCode;
use dealership::{
    config::Environment,
    domain::{Classification, ClassificationId, InventoryId, Vehicle},
    storage::memory::MemoryInventoryRepository,
};

use crate::support::{setup_test_app, setup_test_app_with};

/// Attribute values are HTML-escaped, which includes `/`.
fn has_src(body: &str, path: &str) -> bool {
    body.contains(&format!("src=\"{}\"", path.replace('/', "&#x2f;")))
        || body.contains(&format!("src=\"{}\"", path))
}

#[tokio::test]
async fn classification_page_lists_its_vehicles() {
    let app = setup_test_app();

    let response = app.get("/inv/type/2").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Sport vehicles"));
    assert!(response.body.contains("Camaro"));
    assert!(response.body.contains("Adventador"));
    assert!(!response.body.contains("Wrangler"));
}

#[tokio::test]
async fn navigation_is_built_from_classifications() {
    let app = setup_test_app();

    let response = app.get("/").await;
    assert_eq!(response.status, StatusCode::OK);
    for id in 1..=5 {
        assert!(response.body.contains(&format!("href=\"/inv/type/{}\"", id)));
    }
}

#[tokio::test]
async fn classification_ids_must_be_numeric() {
    let app = setup_test_app();

    let response = app.get("/inv/type/sport").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("Invalid classification ID"));
}

#[tokio::test]
async fn empty_classification_is_not_found() {
    let app = setup_test_app();

    let response = app.get("/inv/type/99").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("No vehicles found for this classification"));
}

#[tokio::test]
async fn vehicle_detail_renders_with_root_relative_image() {
    let sedan = Classification {
        classification_id: ClassificationId::new(5),
        classification_name: "Sedan".into(),
    };
    let vehicle = Vehicle {
        inv_id: InventoryId::new(9),
        inv_make: "Ford".into(),
        inv_model: "Crown Victoria".into(),
        inv_year: 2013,
        inv_description: "Spacious.".into(),
        inv_image: "public/images/vehicles/crwn-vic.jpg".into(),
        inv_thumbnail: "images/vehicles/crwn-vic-tn.jpg".into(),
        inv_price: 10_000,
        inv_miles: 108_247,
        inv_color: "White".into(),
        classification_id: sedan.classification_id,
        classification_name: sedan.classification_name.clone(),
    };
    let app = setup_test_app_with(
        Environment::Development,
        MemoryInventoryRepository::new(vec![sedan], vec![vehicle]),
    );

    let response = app.get("/inv/detail/9").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<title>Ford Crown Victoria"));
    assert!(has_src(&response.body, "/images/vehicles/crwn-vic.jpg"));
    assert!(!response.body.contains("public"));
    assert!(response.body.contains("$10,000"));
    assert!(response.body.contains("108,247"));

    let listing = app.get("/inv/type/5").await;
    assert!(has_src(&listing.body, "/images/vehicles/crwn-vic-tn.jpg"));
}

#[tokio::test]
async fn vehicle_detail_validates_and_reports_missing() {
    let app = setup_test_app();

    let invalid = app.get("/inv/detail/abc").await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert!(invalid.body.contains("Invalid inventory ID"));

    let missing = app.get("/inv/detail/404").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert!(missing.body.contains("Vehicle not found"));
}
