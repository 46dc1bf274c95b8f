//! Vehicle inventory and classification entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{ClassificationId, InventoryId};

/// A vehicle category shown in the site navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Classification {
    pub classification_id: ClassificationId,
    pub classification_name: String,
}

/// A vehicle joined with the name of its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub inv_id: InventoryId,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: i32,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    /// Whole US dollars
    pub inv_price: i64,
    pub inv_miles: i32,
    pub inv_color: String,
    pub classification_id: ClassificationId,
    pub classification_name: String,
}

impl Vehicle {
    /// Display title, e.g. "2019 Ford Mustang".
    pub fn title(&self) -> String {
        format!("{} {} {}", self.inv_year, self.inv_make, self.inv_model)
    }

    /// Rewrite stored image paths (`public/images/...` or `images/...`) into
    /// root-relative URLs served from the public directory.
    pub fn normalize_image_paths(&mut self) {
        self.inv_image = root_relative(&self.inv_image);
        self.inv_thumbnail = root_relative(&self.inv_thumbnail);
    }

    pub fn display_price(&self) -> String {
        format!("${}", group_thousands(self.inv_price))
    }

    pub fn display_miles(&self) -> String {
        group_thousands(i64::from(self.inv_miles))
    }
}

fn root_relative(path: &str) -> String {
    if path.is_empty() || path.starts_with('/') || path.contains("://") {
        return path.to_string();
    }
    format!("/{}", path.trim_start_matches("public/"))
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
