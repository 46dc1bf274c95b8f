//! In-memory repositories.
//!
//! Selected with the `memory://` database URL for local development and used
//! by the test suites. Behaviour matches the PostgreSQL repositories,
//! including the email uniqueness rule.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::auth::account::{Account, AccountRole, NewAccount, ProfileUpdate};
use crate::auth::session::SessionRecord;
use crate::domain::{AccountId, Classification, ClassificationId, InventoryId, Vehicle};
use crate::errors::{DealershipError, Result};
use crate::storage::repositories::{AccountRepository, InventoryRepository, SessionRepository};

#[derive(Debug, Default)]
struct AccountTable {
    rows: Vec<Account>,
    next_id: i32,
}

#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    table: RwLock<AccountTable>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change an account's role. Roles are otherwise only assigned by operators.
    pub async fn set_role(&self, id: AccountId, role: AccountRole) -> Result<()> {
        let mut table = self.table.write().await;
        let account = table
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DealershipError::not_found("Account", id))?;
        account.role = role;
        Ok(())
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create_account(&self, account: NewAccount) -> Result<Account> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|a| same_email(&a.email, &account.email)) {
            return Err(DealershipError::DuplicateEmail);
        }

        table.next_id += 1;
        let created = Account::new(
            AccountId::new(table.next_id),
            account.first_name,
            account.last_name,
            account.email,
            AccountRole::Client,
            account.password_hash,
        );
        table.rows.push(created.clone());
        Ok(created)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.table.read().await.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.table.read().await.rows.iter().find(|a| same_email(&a.email, email)).cloned())
    }

    async fn update_profile(&self, id: AccountId, update: ProfileUpdate) -> Result<Account> {
        let mut table = self.table.write().await;
        if table.rows.iter().any(|a| a.id != id && same_email(&a.email, &update.email)) {
            return Err(DealershipError::DuplicateEmail);
        }

        let account = table
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DealershipError::not_found("Account", id))?;
        account.first_name = update.first_name;
        account.last_name = update.last_name;
        account.email = update.email;
        Ok(account.clone())
    }

    async fn update_password(&self, id: AccountId, password_hash: String) -> Result<()> {
        let mut table = self.table.write().await;
        let account = table
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DealershipError::not_found("Account", id))?;
        account.password_hash = password_hash;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionRepository {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionRepository for MemorySessionRepository {
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &SessionRecord) -> Result<()> {
        self.records.write().await.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at >= now);
        Ok((before - records.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryInventoryRepository {
    classifications: Vec<Classification>,
    vehicles: Vec<Vehicle>,
}

impl MemoryInventoryRepository {
    pub fn new(classifications: Vec<Classification>, vehicles: Vec<Vehicle>) -> Self {
        Self { classifications, vehicles }
    }

    /// A small showroom so a `memory://` instance has something to browse.
    pub fn with_sample_data() -> Self {
        let classification = |id: i32, name: &str| Classification {
            classification_id: ClassificationId::new(id),
            classification_name: name.to_string(),
        };
        let classifications = vec![
            classification(1, "Custom"),
            classification(2, "Sport"),
            classification(3, "SUV"),
            classification(4, "Truck"),
            classification(5, "Sedan"),
        ];

        let vehicle = |id: i32, make: &str, model: &str, year: i32, price: i64, miles: i32, color: &str, class: &Classification| {
            let slug = model.to_lowercase().replace(' ', "-");
            Vehicle {
                inv_id: InventoryId::new(id),
                inv_make: make.to_string(),
                inv_model: model.to_string(),
                inv_year: year,
                inv_description: format!("A {} {} {} in {}.", year, make, model, color.to_lowercase()),
                inv_image: format!("/images/vehicles/{}.jpg", slug),
                inv_thumbnail: format!("/images/vehicles/{}-tn.jpg", slug),
                inv_price: price,
                inv_miles: miles,
                inv_color: color.to_string(),
                classification_id: class.classification_id,
                classification_name: class.classification_name.clone(),
            }
        };
        let vehicles = vec![
            vehicle(1, "DMC", "Delorean", 1981, 65_000, 56_000, "Silver", &classifications[0]),
            vehicle(2, "Chevy", "Camaro", 2018, 25_000, 101_222, "Silver", &classifications[1]),
            vehicle(3, "Lamborghini", "Adventador", 2016, 417_650, 71_632, "Blue", &classifications[1]),
            vehicle(4, "Jeep", "Wrangler", 2019, 28_045, 41_205, "Yellow", &classifications[2]),
            vehicle(5, "Ford", "F-150", 2017, 30_000, 62_000, "Black", &classifications[3]),
            vehicle(6, "Ford", "Crown Victoria", 2013, 10_000, 108_247, "White", &classifications[4]),
        ];

        Self::new(classifications, vehicles)
    }
}

#[async_trait]
impl InventoryRepository for MemoryInventoryRepository {
    async fn list_classifications(&self) -> Result<Vec<Classification>> {
        let mut classifications = self.classifications.clone();
        classifications.sort_by(|a, b| a.classification_name.cmp(&b.classification_name));
        Ok(classifications)
    }

    async fn list_by_classification(&self, id: ClassificationId) -> Result<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> =
            self.vehicles.iter().filter(|v| v.classification_id == id).cloned().collect();
        vehicles.sort_by(|a, b| (&a.inv_make, &a.inv_model).cmp(&(&b.inv_make, &b.inv_model)));
        Ok(vehicles)
    }

    async fn get_vehicle(&self, id: InventoryId) -> Result<Option<Vehicle>> {
        Ok(self.vehicles.iter().find(|v| v.inv_id == id).cloned())
    }
}
