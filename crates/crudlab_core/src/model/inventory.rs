//! Inventory records: suppliers, product categories and products.
//!
//! # Invariants
//! - `stock_quantity` is never negative.
//! - A product always references an existing supplier.
//! - A product/category link exists at most once.

use super::{empty_patch_error, RowId};
use crate::validation::{self, ValidationResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const NAME_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: RowId,
    pub name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
}

impl NewSupplier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn contact_email(mut self, email: impl Into<String>) -> Self {
        self.contact_email = email.into();
        self
    }

    pub fn validate(&self) -> ValidationResult {
        validation::required_text(&self.name, "Supplier name", NAME_MAX_CHARS)?;
        validate_optional_email(&self.contact_email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SupplierPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl SupplierPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact_name.is_none()
            && self.contact_email.is_none()
            && self.contact_phone.is_none()
            && self.address.is_none()
    }

    pub fn validate(&self) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(name) = &self.name {
            validation::required_text(name, "Supplier name", NAME_MAX_CHARS)?;
        }
        if let Some(email) = &self.contact_email {
            validate_optional_email(email)?;
        }
        Ok(())
    }
}

/// Product category (unrelated to task categories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RowId,
    pub name: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::required_text(&self.name, "Category name", NAME_MAX_CHARS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn validate(&self) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(name) = &self.name {
            validation::required_text(name, "Category name", NAME_MAX_CHARS)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RowId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub supplier_id: RowId,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock_quantity: i64,
    pub supplier_id: RowId,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, stock_quantity: i64, supplier_id: RowId) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            stock_quantity,
            supplier_id,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> ValidationResult {
        validation::required_text(&self.name, "Product name", NAME_MAX_CHARS)?;
        validation::price(self.price)?;
        validation::non_negative(self.stock_quantity, "Stock quantity")
    }
}

/// Partial product update. Stock moves through `update_stock` only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub supplier_id: Option<RowId>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.supplier_id.is_none()
    }

    pub fn validate(&self) -> ValidationResult {
        if self.is_empty() {
            return Err(empty_patch_error());
        }
        if let Some(name) = &self.name {
            validation::required_text(name, "Product name", NAME_MAX_CHARS)?;
        }
        if let Some(price) = self.price {
            validation::price(price)?;
        }
        Ok(())
    }
}

/// Product row joined with its supplier's contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowStockProduct {
    #[serde(flatten)]
    pub product: Product,
    pub supplier_name: String,
    pub supplier_email: String,
}

/// Filters for `ProductRepository::get_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProductQuery {
    pub category_id: Option<RowId>,
    pub in_stock_only: bool,
}

fn validate_optional_email(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Ok(());
    }
    validation::email(value)
}
