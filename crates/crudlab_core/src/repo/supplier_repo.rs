//! Supplier repository contract and SQLite implementation.
//!
//! # Invariants
//! - A supplier that still has products cannot be deleted.

use crate::db::Database;
use crate::model::inventory::{NewSupplier, Product, Supplier, SupplierPatch};
use crate::model::RowId;
use crate::repo::product_repo::products_for_supplier;
use crate::repo::{map_write_error, Assignments, RepoResult};
use log::info;
use rusqlite::{params, params_from_iter, Row};

const SUPPLIER_SELECT_SQL: &str = "SELECT
    id,
    name,
    contact_name,
    contact_email,
    contact_phone,
    address,
    created_at
FROM suppliers";

/// Repository interface for supplier CRUD operations.
pub trait SupplierRepository {
    fn create(&self, supplier: &NewSupplier) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Supplier>>;
    fn get_all(&self) -> RepoResult<Vec<Supplier>>;
    fn get_products(&self, supplier_id: RowId) -> RepoResult<Vec<Product>>;
    fn update(&self, id: RowId, patch: &SupplierPatch) -> RepoResult<bool>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

pub struct SqliteSupplierRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteSupplierRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl SupplierRepository for SqliteSupplierRepository<'_> {
    fn create(&self, supplier: &NewSupplier) -> RepoResult<RowId> {
        supplier.validate()?;

        let id = self
            .db
            .insert(
                "INSERT INTO suppliers (name, contact_name, contact_email, contact_phone, address)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    supplier.name.as_str(),
                    supplier.contact_name.as_str(),
                    supplier.contact_email.as_str(),
                    supplier.contact_phone.as_str(),
                    supplier.address.as_str(),
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Supplier already exists".to_string(),
                    || "Invalid reference while creating supplier".to_string(),
                )
            })?;

        info!("event=supplier_create module=inventory status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Supplier>> {
        Ok(self.db.query_optional(
            &format!("{SUPPLIER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            supplier_from_row,
        )?)
    }

    fn get_all(&self) -> RepoResult<Vec<Supplier>> {
        Ok(self.db.query_map(
            &format!("{SUPPLIER_SELECT_SQL} ORDER BY name ASC, id ASC;"),
            [],
            supplier_from_row,
        )?)
    }

    fn get_products(&self, supplier_id: RowId) -> RepoResult<Vec<Product>> {
        products_for_supplier(self.db, supplier_id)
    }

    fn update(&self, id: RowId, patch: &SupplierPatch) -> RepoResult<bool> {
        patch.validate()?;

        let mut assignments = Assignments::default();
        assignments.set_some("name", patch.name.clone());
        assignments.set_some("contact_name", patch.contact_name.clone());
        assignments.set_some("contact_email", patch.contact_email.clone());
        assignments.set_some("contact_phone", patch.contact_phone.clone());
        assignments.set_some("address", patch.address.clone());
        let (sql, values) = assignments.into_statement("suppliers", id);

        let changed = self.db.update(&sql, params_from_iter(values))?;
        Ok(changed > 0)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM suppliers WHERE id = ?1;", [id])
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("Cannot delete supplier {id}"),
                    || {
                        "Cannot delete supplier: It still has products. \
                         Reassign or delete those products first."
                            .to_string()
                    },
                )
            })?;
        Ok(changed > 0)
    }
}

fn supplier_from_row(row: &Row<'_>) -> rusqlite::Result<Supplier> {
    Ok(Supplier {
        id: row.get("id")?,
        name: row.get("name")?,
        contact_name: row.get("contact_name")?,
        contact_email: row.get("contact_email")?,
        contact_phone: row.get("contact_phone")?,
        address: row.get("address")?,
        created_at: row.get("created_at")?,
    })
}
