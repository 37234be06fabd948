use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::filter::user_filter;
use crate::models::{CreateUser, UpdateUser, User, UserResponse};
use crate::pagination::{Page, PageRequest};
use crate::password::{PasswordHasher, validate_password};
use crate::policy::{Actor, UserAction, UserPolicy};
use crate::repository::UserRepository;

/// User business logic: authorization, password handling and filtering
/// on top of a [`UserRepository`].
pub struct UserService<R, H, P>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    repository: R,
    hasher: H,
    policy: P,
}

impl<R, H, P> UserService<R, H, P>
where
    R: UserRepository,
    H: PasswordHasher,
    P: UserPolicy,
{
    pub fn new(repository: R, hasher: H, policy: P) -> Self {
        Self {
            repository,
            hasher,
            policy,
        }
    }

    fn authorize(&self, actor: &Actor, action: UserAction, target: Option<&User>) -> UserResult<()> {
        if self.policy.authorize(actor, action, target) {
            return Ok(());
        }

        tracing::info!(
            actor_id = %actor.id,
            action = %action,
            target_id = ?target.map(|u| u.id),
            "Authorization denied"
        );
        Err(UserError::Forbidden(format!(
            "Not allowed to {} this user",
            action
        )))
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// List users matching the whitelisted filters in `params`.
    ///
    /// Unknown parameters and disallowed operators are ignored.
    pub async fn list_users<K, V>(
        &self,
        actor: &Actor,
        params: &[(K, V)],
        page: PageRequest,
    ) -> UserResult<Page<UserResponse>>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.authorize(actor, UserAction::ViewAny, None)?;

        let predicates =
            user_filter().translate(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
        tracing::debug!(count = predicates.len(), "Translated user filters");

        let page = self.repository.query(predicates, page).await?;
        Ok(page.map(UserResponse::from))
    }

    pub async fn create_user(&self, actor: &Actor, input: CreateUser) -> UserResult<UserResponse> {
        self.authorize(actor, UserAction::Create, None)?;
        validate_password(&input.password)?;

        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let mut user = User::new(input.name, input.email, password_hash);
        user.current_team_id = input.current_team_id;
        user.profile_photo_path = input.profile_photo_path;
        user.fb_id = input.fb_id;
        user.profile_photo_url = input.profile_photo_url;
        user.is_admin = input.is_admin;

        let created = self.repository.create(user).await?;
        tracing::info!(user_id = %created.id, actor_id = %actor.id, "User created");

        Ok(created.into())
    }

    pub async fn get_user(&self, actor: &Actor, id: Uuid) -> UserResult<UserResponse> {
        let user = self.find(id).await?;
        self.authorize(actor, UserAction::View, Some(&user))?;
        Ok(user.into())
    }

    pub async fn update_user(
        &self,
        actor: &Actor,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<UserResponse> {
        let mut user = self.find(id).await?;
        self.authorize(actor, UserAction::Update, Some(&user))?;

        if !actor.is_admin && input.is_admin.is_some_and(|flag| flag != user.is_admin) {
            return Err(UserError::Forbidden(
                "Only administrators may change admin status".to_string(),
            ));
        }

        if let Some(ref new_email) = input.email
            && !new_email.eq_ignore_ascii_case(&user.email)
            && self.repository.email_exists(new_email).await?
        {
            return Err(UserError::DuplicateEmail(new_email.clone()));
        }

        let new_password_hash = match input.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(self.hasher.hash(password)?)
            }
            None => None,
        };

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await?;
        tracing::info!(user_id = %updated.id, actor_id = %actor.id, "User updated");

        Ok(updated.into())
    }

    pub async fn delete_user(&self, actor: &Actor, id: Uuid) -> UserResult<()> {
        let user = self.find(id).await?;
        self.authorize(actor, UserAction::Delete, Some(&user))?;

        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, actor_id = %actor.id, "User deleted");
        Ok(())
    }
}
