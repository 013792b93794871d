//! Member repository contract and SQLite implementation.

use crate::db::Database;
use crate::model::member::{Member, MemberPatch, MemberSort, NewMember};
use crate::model::RowId;
use crate::repo::{map_write_error, Assignments, RepoResult};
use log::info;
use rusqlite::{params, params_from_iter, Row};

const MEMBER_SELECT_SQL: &str = "SELECT id, name, email, join_date FROM members";

/// Repository interface for member CRUD operations.
pub trait MemberRepository {
    fn create(&self, member: &NewMember) -> RepoResult<RowId>;
    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Member>>;
    fn get_by_email(&self, email: &str) -> RepoResult<Option<Member>>;
    fn get_all(&self, sort: MemberSort) -> RepoResult<Vec<Member>>;
    fn update(&self, id: RowId, patch: &MemberPatch) -> RepoResult<bool>;
    fn delete(&self, id: RowId) -> RepoResult<bool>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteMemberRepository<'db> {
    pub fn new(db: &'db Database) -> Self {
        Self { db }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn create(&self, member: &NewMember) -> RepoResult<RowId> {
        member.validate()?;

        let id = self
            .db
            .insert(
                "INSERT INTO members (name, email) VALUES (?1, ?2);",
                params![member.name.as_str(), member.email.as_str()],
            )
            .map_err(|err| {
                map_write_error(
                    err,
                    || {
                        format!(
                            "A member with email '{}' already exists. Each member must have a unique email address.",
                            member.email
                        )
                    },
                    || "Invalid reference while creating member".to_string(),
                )
            })?;

        info!("event=member_create module=library status=ok id={id}");
        Ok(id)
    }

    fn get_by_id(&self, id: RowId) -> RepoResult<Option<Member>> {
        Ok(self.db.query_optional(
            &format!("{MEMBER_SELECT_SQL} WHERE id = ?1;"),
            [id],
            member_from_row,
        )?)
    }

    fn get_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        Ok(self.db.query_optional(
            &format!("{MEMBER_SELECT_SQL} WHERE email = ?1;"),
            [email],
            member_from_row,
        )?)
    }

    fn get_all(&self, sort: MemberSort) -> RepoResult<Vec<Member>> {
        let sql = format!("{MEMBER_SELECT_SQL} ORDER BY {} ASC, id ASC;", sort.column());
        Ok(self.db.query_map(&sql, [], member_from_row)?)
    }

    fn update(&self, id: RowId, patch: &MemberPatch) -> RepoResult<bool> {
        patch.validate()?;

        let mut assignments = Assignments::default();
        assignments.set_some("name", patch.name.clone());
        assignments.set_some("email", patch.email.clone());
        let (sql, values) = assignments.into_statement("members", id);

        let changed = self
            .db
            .update(&sql, params_from_iter(values))
            .map_err(|err| {
                map_write_error(
                    err,
                    || "Cannot update: Another member already has this email".to_string(),
                    || "Invalid reference while updating member".to_string(),
                )
            })?;
        Ok(changed > 0)
    }

    fn delete(&self, id: RowId) -> RepoResult<bool> {
        let changed = self
            .db
            .update("DELETE FROM members WHERE id = ?1;", [id])
            .map_err(|err| {
                map_write_error(
                    err,
                    || format!("Cannot delete member {id}"),
                    || {
                        "Cannot delete member: They have loan records. \
                         You must delete or update related loans first."
                            .to_string()
                    },
                )
            })?;
        Ok(changed > 0)
    }
}

pub(crate) fn member_from_row(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        join_date: row.get("join_date")?,
    })
}
