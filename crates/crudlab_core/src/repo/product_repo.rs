//! Product repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `products`, stock movements and category links.
//!
//! # Invariants
//! - Stock changes read and write inside one transaction, so a concurrent
//!   movement can never drive the quantity below zero.
//! - A product/category link is created at most once.

use crate::db::{statement_error, Database};
use crate::model::inventory::{
    Category, LowStockProduct, NewProduct, Product, ProductPatch, ProductQuery,
};
use crate::model::RowId;
use crate::repo::category_repo::{category_from_row, CATEGORY_SELECT_SQL};
use crate::repo::{map_write_error, Assignments, RepoError, RepoResult};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

pub(crate) const PRODUCT_SELECT_SQL: &str = "SELECT
    products.id AS id,
    products.name AS name,
    products.description AS description,
    products.price AS price,
    products.stock_quantity AS stock_quantity,
    products.supplier_id AS supplier_id,
    products.created_at AS created_at
FROM products";

/// Repository interface for product CRUD, stock and category links.
pub trait ProductRepository {
    fn create(&self, product: &NewProduct) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Product>>;
    fn get_all(&self, query: &ProductQuery) -> RepoResult<Vec<Product>>;
    fn get_by_supplier(&self, supplier_id: RowId) -> RepoResult<Vec<Product>>;
    /// Products with stock strictly below `threshold`, lowest stock first.
    fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<LowStockProduct>>;
    fn update(&self, id: RowId, patch: &ProductPatch) -> RepoResult<bool>;
    /// Adds `delta` (may be negative) to the stock quantity.
    fn update_stock(&self, id: RowId, delta: i64) -> RepoResult<bool>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
    fn add_category(&self, product_id: RowId, category_id: RowId) -> RepoResult<bool>;
    fn remove_category(&self, product_id: RowId, category_id: RowId) -> RepoResult<bool>;
    fn get_categories(&self, product_id: RowId) -> RepoResult<Vec<Category>>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteProductRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn create(&self, product: &NewProduct) -> RepoResult<RowId> {
        product.validate()?;

        let id = self
            .db
            .insert(
                "INSERT INTO products (name, description, price, stock_quantity, supplier_id)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    product.name.as_str(),
                    product.description.as_str(),
                    product.price,
                    product.stock_quantity,
                    product.supplier_id,
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Product already exists".to_string(),
                    || format!("Supplier with ID {} does not exist", product.supplier_id),
                )
            })?;

        info!("event=product_create module=inventory status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Product>> {
        Ok(self.db.query_optional(
            &format!("{PRODUCT_SELECT_SQL} WHERE products.id = ?1;"),
            [id],
            product_from_row,
        )?)
    }

    fn get_all(&self, query: &ProductQuery) -> RepoResult<Vec<Product>> {
        let mut sql = String::from(PRODUCT_SELECT_SQL);
        let mut clauses = Vec::new();
        let mut binds = Vec::new();

        if let Some(category_id) = query.category_id {
            sql.push_str(
                " INNER JOIN product_categories
                    ON product_categories.product_id = products.id",
            );
            clauses.push("product_categories.category_id = ?");
            binds.push(Value::Integer(category_id));
        }
        if query.in_stock_only {
            clauses.push("products.stock_quantity > 0");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY products.name ASC, products.id ASC;");

        Ok(self
            .db
            .query_map(&sql, params_from_iter(binds), product_from_row)?)
    }

    fn get_by_supplier(&self, supplier_id: RowId) -> RepoResult<Vec<Product>> {
        products_for_supplier(self.db, supplier_id)
    }

    fn get_low_stock(&self, threshold: i64) -> RepoResult<Vec<LowStockProduct>> {
        Ok(self.db.query_map(
            "SELECT
                products.id AS id,
                products.name AS name,
                products.description AS description,
                products.price AS price,
                products.stock_quantity AS stock_quantity,
                products.supplier_id AS supplier_id,
                products.created_at AS created_at,
                suppliers.name AS supplier_name,
                suppliers.contact_email AS supplier_email
             FROM products
             INNER JOIN suppliers ON products.supplier_id = suppliers.id
             WHERE products.stock_quantity < ?1
             ORDER BY products.stock_quantity ASC, products.id ASC;",
            [threshold],
            |row| {
                Ok(LowStockProduct {
                    product: product_from_row(row)?,
                    supplier_name: row.get("supplier_name")?,
                    supplier_email: row.get("supplier_email")?,
                })
            },
        )?)
    }

    fn update(&self, id: RowId, patch: &ProductPatch) -> RepoResult<bool> {
        patch.validate()?;

        let mut assignments = Assignments::default();
        assignments.set_some("name", patch.name.clone());
        assignments.set_some("description", patch.description.clone());
        assignments.set_some("price", patch.price);
        assignments.set_some("supplier_id", patch.supplier_id);
        let (sql, values) = assignments.into_statement("products", id);

        let changed = self
            .db
            .update(&sql, params_from_iter(values))
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Product already exists".to_string(),
                    || match patch.supplier_id {
                        Some(supplier_id) => format!("Supplier with ID {supplier_id} does not exist"),
                        None => "Invalid reference while updating product".to_string(),
                    },
                )
            })?;
        Ok(changed > 0)
    }

    fn update_stock(&self, id: RowId, delta: i64) -> RepoResult<bool> {
        self.db.transaction(|tx| {
            let current: Option<i64> = tx
                .query_row(
                    "SELECT stock_quantity FROM products WHERE id = ?1;",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };

            let next = current
                .checked_add(delta)
                .filter(|quantity| *quantity >= 0)
                .ok_or_else(|| {
                    RepoError::validation(
                        "Stock quantity",
                        format!("Insufficient stock. Current: {current}, requested change: {delta}"),
                    )
                })?;

            tx.execute(
                "UPDATE products SET stock_quantity = ?1 WHERE id = ?2;",
                params![next, id],
            )?;
            info!(
                "event=product_stock module=inventory status=ok id={id} delta={delta} stock={next}"
            );
            Ok(true)
        })
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM products WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }

    fn add_category(&self, product_id: RowId, category_id: RowId) -> RepoResult<bool> {
        self.db.transaction(|tx| {
            let product_exists: Option<i64> = tx
                .query_row("SELECT 1 FROM products WHERE id = ?1;", [product_id], |row| {
                    row.get(0)
                })
                .optional()?;
            if product_exists.is_none() {
                return Err(RepoError::NotFound {
                    entity: "Product",
                    id: product_id,
                });
            }

            let category_exists: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM categories WHERE id = ?1;",
                    [category_id],
                    |row| row.get(0),
                )
                .optional()?;
            if category_exists.is_none() {
                return Err(RepoError::NotFound {
                    entity: "Category",
                    id: category_id,
                });
            }

            tx.execute(
                "INSERT INTO product_categories (product_id, category_id) VALUES (?1, ?2);",
                [product_id, category_id],
            )
            .map_err(|err| {
                map_write_error(
                    statement_error(err),
                    || format!("Product {product_id} is already in category {category_id}"),
                    || "Invalid reference while linking product to category".to_string(),
                )
            })?;
            Ok(true)
        })
    }

    fn remove_category(&self, product_id: RowId, category_id: RowId) -> RepoResult<bool> {
        let changed = self.db.update(
            "DELETE FROM product_categories WHERE product_id = ?1 AND category_id = ?2;",
            [product_id, category_id],
        )?;
        Ok(changed > 0)
    }

    fn get_categories(&self, product_id: RowId) -> RepoResult<Vec<Category>> {
        Ok(self.db.query_map(
            &format!(
                "{CATEGORY_SELECT_SQL}
                 INNER JOIN product_categories
                    ON product_categories.category_id = categories.id
                 WHERE product_categories.product_id = ?1
                 ORDER BY categories.name ASC, categories.id ASC;"
            ),
            [product_id],
            category_from_row,
        )?)
    }
}

pub(crate) fn products_for_supplier(db: &Database, supplier_id: RowId) -> RepoResult<Vec<Product>> {
    Ok(db.query_map(
        &format!(
            "{PRODUCT_SELECT_SQL}
             WHERE products.supplier_id = ?1
             ORDER BY products.name ASC, products.id ASC;"
        ),
        [supplier_id],
        product_from_row,
    )?)
}

pub(crate) fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
        stock_quantity: row.get("stock_quantity")?,
        supplier_id: row.get("supplier_id")?,
        created_at: row.get("created_at")?,
    })
}
