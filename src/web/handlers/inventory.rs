//! Vehicle browsing and the inventory management landing page.

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde_json::{json, Value};

use crate::domain::{ClassificationId, InventoryId, Vehicle};
use crate::web::error::WebError;
use crate::web::state::AppState;
use crate::web::views::{Chrome, Page};

fn vehicle_view(vehicle: &Vehicle) -> Value {
    let mut value = json!(vehicle);
    if let Value::Object(map) = &mut value {
        map.insert("title".into(), json!(vehicle.title()));
        map.insert("price".into(), json!(vehicle.display_price()));
        map.insert("miles".into(), json!(vehicle.display_miles()));
    }
    value
}

/// GET /inv/type/{classification_id}
pub async fn by_classification(
    State(state): State<AppState>,
    chrome: Chrome,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let classification_id: ClassificationId =
        raw_id.parse().map_err(|_| WebError::bad_request("Invalid classification ID"))?;

    let mut vehicles = state.inventory.list_by_classification(classification_id).await?;
    let Some(first) = vehicles.first() else {
        return Err(WebError::not_found("No vehicles found for this classification"));
    };
    let title = format!("{} vehicles", first.classification_name);

    for vehicle in &mut vehicles {
        vehicle.normalize_image_paths();
    }
    let grid: Vec<Value> = vehicles.iter().map(vehicle_view).collect();

    state
        .render(&chrome, Page::new("inventory/classification", title).with("vehicles", json!(grid)))
        .await
}

/// GET /inv/detail/{inv_id}
pub async fn detail(
    State(state): State<AppState>,
    chrome: Chrome,
    Path(raw_id): Path<String>,
) -> Result<Response, WebError> {
    let inv_id: InventoryId =
        raw_id.parse().map_err(|_| WebError::bad_request("Invalid inventory ID"))?;

    let mut vehicle = state
        .inventory
        .get_vehicle(inv_id)
        .await?
        .ok_or_else(|| WebError::not_found("Vehicle not found"))?;
    vehicle.normalize_image_paths();

    let title = format!("{} {}", vehicle.inv_make, vehicle.inv_model);
    state
        .render(&chrome, Page::new("inventory/detail", title).with("vehicle", vehicle_view(&vehicle)))
        .await
}

/// GET /inv/ for employees and admins.
pub async fn management(State(state): State<AppState>, chrome: Chrome) -> Result<Response, WebError> {
    let classifications = state.inventory.list_classifications().await?;
    state
        .render(
            &chrome,
            Page::new("inventory/management", "Vehicle Management")
                .with("classifications", json!(classifications)),
        )
        .await
}

/// GET /inv/test/error
pub async fn trigger_error() -> WebError {
    WebError::internal("Intentional test error")
}
