//! Inventory repository
//!
//! Read-only queries behind the vehicle browsing pages and the navigation bar.

use crate::domain::{Classification, ClassificationId, InventoryId, Vehicle};
use crate::errors::{DealershipError, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use tracing::instrument;

const VEHICLE_SELECT: &str = r#"
    SELECT i.inv_id, i.inv_make, i.inv_model, i.inv_year, i.inv_description,
           i.inv_image, i.inv_thumbnail, i.inv_price, i.inv_miles, i.inv_color,
           i.classification_id, c.classification_name
    FROM inventory AS i
    JOIN classification AS c ON i.classification_id = c.classification_id
"#;

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// All classifications ordered by name
    async fn list_classifications(&self) -> Result<Vec<Classification>>;

    /// Vehicles in one classification
    async fn list_by_classification(&self, id: ClassificationId) -> Result<Vec<Vehicle>>;

    /// A single vehicle with its classification name
    async fn get_vehicle(&self, id: InventoryId) -> Result<Option<Vehicle>>;
}

#[derive(Debug, Clone)]
pub struct SqlxInventoryRepository {
    pool: DbPool,
}

impl SqlxInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryRepository for SqlxInventoryRepository {
    #[instrument(skip(self), name = "db_list_classifications")]
    async fn list_classifications(&self) -> Result<Vec<Classification>> {
        sqlx::query_as::<_, Classification>(
            "SELECT classification_id, classification_name FROM classification ORDER BY classification_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to list classifications"))
    }

    #[instrument(skip(self), fields(classification_id = %id), name = "db_list_vehicles_by_classification")]
    async fn list_by_classification(&self, id: ClassificationId) -> Result<Vec<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "{} WHERE i.classification_id = $1 ORDER BY i.inv_make, i.inv_model",
            VEHICLE_SELECT
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| DealershipError::database(err, "Failed to list vehicles by classification"))
    }

    #[instrument(skip(self), fields(inv_id = %id), name = "db_get_vehicle")]
    async fn get_vehicle(&self, id: InventoryId) -> Result<Option<Vehicle>> {
        sqlx::query_as::<_, Vehicle>(&format!("{} WHERE i.inv_id = $1", VEHICLE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| DealershipError::database(err, "Failed to fetch vehicle"))
    }
}
