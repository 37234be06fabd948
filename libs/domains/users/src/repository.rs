use async_trait::async_trait;
use chrono::DateTime;
use query_filter::Predicate;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::pagination::{Page, PageRequest};

/// Persistence for user records.
///
/// `query` combines predicates with AND and orders by `created_at`
/// descending, then by `id`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Case-insensitive
    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    async fn query(&self, predicates: Vec<Predicate>, page: PageRequest) -> UserResult<Page<User>>;

    async fn update(&self, user: User) -> UserResult<User>;

    /// `false` when no such user existed
    async fn delete(&self, id: Uuid) -> UserResult<bool>;
}

/// In-memory implementation for tests and local runs
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether `user` satisfies a single predicate.
///
/// NULL columns never match. Values compare as integers when both sides
/// parse as integers, as instants when both parse as RFC 3339, else as
/// strings; `email` compares case-insensitively.
pub fn matches(user: &User, predicate: &Predicate) -> bool {
    let Some(stored) = user.column_value(&predicate.column) else {
        return false;
    };

    let ordering = if predicate.column == "email" {
        compare_values(&fold_email(&stored), &fold_email(&predicate.value))
    } else {
        compare_values(&stored, &predicate.value)
    };

    predicate.operator.matches(ordering)
}

/// Case folding applied wherever emails are compared, mirroring `lower()`
fn fold_email(email: &str) -> String {
    email.to_lowercase()
}

fn same_email(a: &str, b: &str) -> bool {
    fold_email(a) == fold_email(b)
}

fn compare_values(stored: &str, wanted: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (stored.parse::<i64>(), wanted.parse::<i64>()) {
        return a.cmp(&b);
    }

    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(stored),
        DateTime::parse_from_rfc3339(wanted),
    ) {
        return a.cmp(&b);
    }

    stored.cmp(wanted)
}

fn newest_first(a: &User, b: &User) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| same_email(&u.email, &user.email))
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| same_email(&u.email, email)))
    }

    async fn query(&self, predicates: Vec<Predicate>, page: PageRequest) -> UserResult<Page<User>> {
        let users = self.users.read().await;

        let mut matched: Vec<&User> = users
            .values()
            .filter(|u| predicates.iter().all(|p| matches(u, p)))
            .collect();
        matched.sort_by(|a, b| newest_first(a, b));

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(Page::new(items, total, page))
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        if users
            .values()
            .any(|u| u.id != user.id && same_email(&u.email, &user.email))
        {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let removed = self.users.write().await.remove(&id).is_some();

        if removed {
            tracing::info!(user_id = %id, "Deleted user");
        }

        Ok(removed)
    }
}
