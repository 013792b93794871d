//! Task and task-category repositories.
//!
//! # Responsibility
//! - CRUD over `tasks` with status/priority filters and an overdue view.
//! - CRUD over `task_categories`.
//!
//! # Invariants
//! - Status and priority columns are read back through their enum
//!   parsers; an unknown stored value surfaces as a conversion fault.
//! - Deleting a category keeps its tasks (their `category_id` becomes null).

use crate::db::Database;
use crate::model::task::{NewTask, Task, TaskCategory, TaskPatch, TaskPriority, TaskStatus};
use crate::model::RowId;
use crate::repo::{date_value, map_write_error, parse_column, Assignments, RepoResult};
use crate::validation;
use chrono::NaiveDate;
use log::info;
use rusqlite::{params, params_from_iter, Row};

const TASK_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    status,
    priority,
    due_date,
    category_id,
    created_at
FROM tasks";

const CATEGORY_NAME_MAX_CHARS: usize = 100;

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create(&self, task: &NewTask) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Task>>;
    /// Newest first, optionally limited to one status.
    fn get_all(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>>;
    fn get_by_priority(&self, priority: TaskPriority) -> RepoResult<Vec<Task>>;
    /// Unfinished tasks due before `today`.
    fn get_overdue(&self, today: NaiveDate) -> RepoResult<Vec<Task>>;
    fn update_status(&self, id: RowId, status: TaskStatus) -> RepoResult<bool>;
    fn update(&self, id: RowId, patch: &TaskPatch) -> RepoResult<bool>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

/// Repository interface for task categories.
pub trait TaskCategoryRepository {
    fn create(&self, name: &str) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<TaskCategory>>;
    fn get_all(&self) -> RepoResult<Vec<TaskCategory>>;
    fn get_tasks(&self, category_id: RowId) -> RepoResult<Vec<Task>>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteTaskRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create(&self, task: &NewTask) -> RepoResult<RowId> {
        task.validate()?;

        let id = self
            .db
            .insert(
                "INSERT INTO tasks (title, description, status, priority, due_date, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    task.title.as_str(),
                    task.description.as_deref(),
                    task.status.as_str(),
                    task.priority.as_str(),
                    task.due_date,
                    task.category_id,
                ],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Task already exists".to_string(),
                    || match task.category_id {
                        Some(category_id) => {
                            format!("Task category with ID {category_id} does not exist")
                        }
                        None => "Invalid reference while creating task".to_string(),
                    },
                )
            })?;

        info!(
            "event=task_create module=todo status=ok id={id} task_status={} priority={}",
            task.status, task.priority
        );
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Task>> {
        Ok(self.db.query_optional(
            &format!("{TASK_SELECT_SQL} WHERE id = ?1;"),
            [id],
            task_from_row,
        )?)
    }

    fn get_all(&self, status: Option<TaskStatus>) -> RepoResult<Vec<Task>> {
        let tasks = match status {
            Some(status) => self.db.query_map(
                &format!("{TASK_SELECT_SQL} WHERE status = ?1 ORDER BY created_at DESC, id DESC;"),
                [status.as_str()],
                task_from_row,
            )?,
            None => self.db.query_map(
                &format!("{TASK_SELECT_SQL} ORDER BY created_at DESC, id DESC;"),
                [],
                task_from_row,
            )?,
        };
        Ok(tasks)
    }

    fn get_by_priority(&self, priority: TaskPriority) -> RepoResult<Vec<Task>> {
        Ok(self.db.query_map(
            &format!("{TASK_SELECT_SQL} WHERE priority = ?1 ORDER BY created_at DESC, id DESC;"),
            [priority.as_str()],
            task_from_row,
        )?)
    }

    fn get_overdue(&self, today: NaiveDate) -> RepoResult<Vec<Task>> {
        Ok(self.db.query_map(
            &format!(
                "{TASK_SELECT_SQL}
                 WHERE due_date IS NOT NULL
                   AND due_date < ?1
                   AND status != ?2
                 ORDER BY due_date ASC, id ASC;"
            ),
            params![date_value(today), TaskStatus::Completed.as_str()],
            task_from_row,
        )?)
    }

    fn update_status(&self, id: RowId, status: TaskStatus) -> RepoResult<bool> {
        let changed = self.db.update(
            "UPDATE tasks SET status = ?1 WHERE id = ?2;",
            params![status.as_str(), id],
        )?;
        if changed > 0 {
            info!("event=task_status module=todo status=ok id={id} task_status={status}");
        }
        Ok(changed > 0)
    }

    fn update(&self, id: RowId, patch: &TaskPatch) -> RepoResult<bool> {
        patch.validate()?;

        let mut assignments = Assignments::default();
        assignments.set_some("title", patch.title.clone());
        assignments.set_some("description", patch.description.clone());
        assignments.set_some("status", patch.status.map(|s| s.as_str().to_string()));
        assignments.set_some("priority", patch.priority.map(|p| p.as_str().to_string()));
        assignments.set_some("due_date", patch.due_date.map(date_value));
        assignments.set_some("category_id", patch.category_id);
        let (sql, values) = assignments.into_statement("tasks", id);

        let changed = self
            .db
            .update(&sql, params_from_iter(values))
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Task already exists".to_string(),
                    || match patch.category_id {
                        Some(category_id) => {
                            format!("Task category with ID {category_id} does not exist")
                        }
                        None => "Invalid reference while updating task".to_string(),
                    },
                )
            })?;
        Ok(changed > 0)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self.db.update("DELETE FROM tasks WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

/// SQLite-backed task category repository.
pub struct SqliteTaskCategoryRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteTaskCategoryRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl TaskCategoryRepository for SqliteTaskCategoryRepository<'_> {
    fn create(&self, name: &str) -> RepoResult<RowId> {
        validation::required_text(name, "Category name", CATEGORY_NAME_MAX_CHARS)?;

        let id = self
            .db
            .insert("INSERT INTO task_categories (name) VALUES (?1);", [name])
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("A task category named '{name}' already exists"),
                    || "Invalid reference while creating task category".to_string(),
                )
            })?;
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<TaskCategory>> {
        Ok(self.db.query_optional(
            "SELECT id, name, created_at FROM task_categories WHERE id = ?1;",
            [id],
            task_category_from_row,
        )?)
    }

    fn get_all(&self) -> RepoResult<Vec<TaskCategory>> {
        Ok(self.db.query_map(
            "SELECT id, name, created_at FROM task_categories ORDER BY name ASC, id ASC;",
            [],
            task_category_from_row,
        )?)
    }

    fn get_tasks(&self, category_id: RowId) -> RepoResult<Vec<Task>> {
        Ok(self.db.query_map(
            &format!("{TASK_SELECT_SQL} WHERE category_id = ?1 ORDER BY created_at DESC, id DESC;"),
            [category_id],
            task_from_row,
        )?)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM task_categories WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_column(row, "status")?,
        priority: parse_column(row, "priority")?,
        due_date: row.get("due_date")?,
        category_id: row.get("category_id")?,
        created_at: row.get("created_at")?,
    })
}

fn task_category_from_row(row: &Row<'_>) -> rusqlite::Result<TaskCategory> {
    Ok(TaskCategory {
        id: row.get("id")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
    })
}
