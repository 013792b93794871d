//! Product category repository.

use crate::db::Database;
use crate::model::inventory::{Category, CategoryPatch, NewCategory, Product};
use crate::model::RowId;
use crate::repo::product_repo::{product_from_row, PRODUCT_SELECT_SQL};
use crate::repo::{map_write_error, Assignments, RepoResult};
use rusqlite::{params, params_from_iter, Row};

pub(crate) const CATEGORY_SELECT_SQL: &str = "SELECT
    categories.id AS id,
    categories.name AS name,
    categories.description AS description,
    categories.created_at AS created_at
FROM categories";

pub trait CategoryRepository {
    fn create(&self, category: &NewCategory) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Category>>;
    fn get_all(&self) -> RepoResult<Vec<Category>>;
    /// Products linked to the category, by name.
    fn get_products(&self, category_id: RowId) -> RepoResult<Vec<Product>>;
    fn update(&self, id: RowId, patch: &CategoryPatch) -> RepoResult<bool>;
    /// Removes the category and its product links; products stay.
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

pub struct SqliteCategoryRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteCategoryRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn create(&self, category: &NewCategory) -> RepoResult<RowId> {
        category.validate()?;

        Ok(self
            .db
            .insert(
                "INSERT INTO categories (name, description) VALUES (?1, ?2);",
                params![category.name.as_str(), category.description.as_str()],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("A category named '{}' already exists", category.name),
                    || "Invalid reference while creating category".to_string(),
                )
            })?)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Category>> {
        Ok(self.db.query_optional(
            &format!("{CATEGORY_SELECT_SQL} WHERE categories.id = ?1;"),
            [id],
            category_from_row,
        )?)
    }

    fn get_all(&self) -> RepoResult<Vec<Category>> {
        Ok(self.db.query_map(
            &format!("{CATEGORY_SELECT_SQL} ORDER BY categories.name ASC, categories.id ASC;"),
            [],
            category_from_row,
        )?)
    }

    fn get_products(&self, category_id: RowId) -> RepoResult<Vec<Product>> {
        Ok(self.db.query_map(
            &format!(
                "{PRODUCT_SELECT_SQL}
                 INNER JOIN product_categories
                    ON product_categories.product_id = products.id
                 WHERE product_categories.category_id = ?1
                 ORDER BY products.name ASC, products.id ASC;"
            ),
            [category_id],
            product_from_row,
        )?)
    }

    fn update(&self, id: RowId, patch: &CategoryPatch) -> RepoResult<bool> {
        patch.validate()?;

        let mut assignments = Assignments::default();
        assignments.set_some("name", patch.name.clone());
        assignments.set_some("description", patch.description.clone());
        let (sql, values) = assignments.into_statement("categories", id);

        let changed = self
            .db
            .update(&sql, params_from_iter(values))
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Cannot update: Another category already has this name".to_string(),
                    || "Invalid reference while updating category".to_string(),
                )
            })?;
        Ok(changed > 0)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM categories WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

pub(crate) fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}
