use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::postgres::{WhereClause, where_clause};
use query_filter::Predicate;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::filter::column_type;
use crate::models::User;
use crate::pagination::{Page, PageRequest};
use crate::repository::UserRepository;

const COLUMNS: &str = "id, name, email, email_verified_at, password_hash, two_factor_confirmed_at, \
     current_team_id, profile_photo_path, fb_id, profile_photo_url, is_admin, created_at, updated_at";

/// PostgreSQL implementation of [`UserRepository`] over raw statements
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    password_hash: String,
    two_factor_confirmed_at: Option<DateTime<Utc>>,
    current_team_id: Option<i64>,
    profile_photo_path: Option<String>,
    fb_id: Option<String>,
    profile_photo_url: Option<String>,
    is_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            email_verified_at: row.email_verified_at,
            password_hash: row.password_hash,
            two_factor_confirmed_at: row.two_factor_confirmed_at,
            current_team_id: row.current_team_id,
            profile_photo_path: row.profile_photo_path,
            fb_id: row.fb_id,
            profile_photo_url: row.profile_photo_url,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    exists: bool,
}

fn is_unique_violation(e: &DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("duplicate key") || msg.contains("unique constraint")
}

/// Map query errors, treating values Postgres cannot cast as bad input.
///
/// The driver text stays in the logs; clients only learn which filters
/// were involved.
fn map_query_error(e: DbErr, predicates: &[Predicate]) -> UserError {
    let msg = e.to_string();
    if msg.contains("invalid input syntax") || msg.contains("out of range") {
        tracing::debug!(error = %msg, "Filter value rejected by PostgreSQL");

        let mut columns: Vec<&str> = predicates.iter().map(|p| p.column.as_str()).collect();
        columns.sort_unstable();
        columns.dedup();

        UserError::Validation(format!(
            "Invalid filter value for: {}",
            columns.join(", ")
        ))
    } else {
        UserError::Internal(format!("Database error: {}", e))
    }
}

/// Rendered SELECT and COUNT statements for one listing request.
pub fn list_statements(predicates: &[Predicate], page: PageRequest) -> (Statement, Statement) {
    let clause = where_clause(predicates, 1, column_type);
    let next = clause.next_placeholder(1);
    let WhereClause { sql, values } = clause;

    let select = format!(
        "SELECT {COLUMNS} FROM users {sql} ORDER BY created_at DESC, id ASC LIMIT ${} OFFSET ${}",
        next,
        next + 1
    );
    let mut select_values = values.clone();
    select_values.push(i64::try_from(page.limit()).unwrap_or(i64::MAX).into());
    select_values.push(i64::try_from(page.offset()).unwrap_or(i64::MAX).into());

    let count = format!("SELECT COUNT(*) AS count FROM users {sql}");

    (
        Statement::from_sql_and_values(DbBackend::Postgres, select, select_values),
        Statement::from_sql_and_values(DbBackend::Postgres, count, values),
    )
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users ({COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.clone().into(),
                user.email.clone().into(),
                user.email_verified_at.into(),
                user.password_hash.clone().into(),
                user.two_factor_confirmed_at.into(),
                user.current_team_id.into(),
                user.profile_photo_path.clone().into(),
                user.fb_id.clone().into(),
                user.profile_photo_url.clone().into(),
                user.is_admin.into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::DuplicateEmail(user.email.clone())
                } else {
                    UserError::Internal(format!("Database error: {}", e))
                }
            })?
            .ok_or_else(|| UserError::Internal("Failed to create user".to_string()))?;

        tracing::info!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(row.map(User::from))
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let sql = "SELECT EXISTS(SELECT 1 FROM users WHERE lower(email) = lower($1)) AS exists";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = ExistsRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(row.is_some_and(|r| r.exists))
    }

    async fn query(&self, predicates: Vec<Predicate>, page: PageRequest) -> UserResult<Page<User>> {
        let (select, count) = list_statements(&predicates, page);

        let total = CountRow::find_by_statement(count)
            .one(&self.db)
            .await
            .map_err(|e| map_query_error(e, &predicates))?
            .map_or(0, |r| r.count.max(0) as u64);

        let rows = UserRow::find_by_statement(select)
            .all(&self.db)
            .await
            .map_err(|e| map_query_error(e, &predicates))?;

        tracing::debug!(
            predicates = predicates.len(),
            total,
            page = page.page,
            "Queried users"
        );

        Ok(Page::new(
            rows.into_iter().map(User::from).collect(),
            total,
            page,
        ))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, email_verified_at = $4, password_hash = $5,
                two_factor_confirmed_at = $6, current_team_id = $7, profile_photo_path = $8,
                fb_id = $9, profile_photo_url = $10, is_admin = $11, updated_at = $12
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.clone().into(),
                user.email.clone().into(),
                user.email_verified_at.into(),
                user.password_hash.clone().into(),
                user.two_factor_confirmed_at.into(),
                user.current_team_id.into(),
                user.profile_photo_path.clone().into(),
                user.fb_id.clone().into(),
                user.profile_photo_url.clone().into(),
                user.is_admin.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    UserError::DuplicateEmail(user.email.clone())
                } else {
                    UserError::Internal(format!("Database error: {}", e))
                }
            })?;

        row.map(User::from).ok_or(UserError::NotFound(user.id))
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self
            .db
            .execute_raw(stmt)
            .await
            .map_err(|e| UserError::Internal(format!("Database error: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
