//! Panel users: the [`Users`] manager and the [`User`] entity wrapper.

use chrono::{DateTime, Utc};
use ptero_core::entity::{EntityCell, EntityState, Identified};
use ptero_core::types::ListParams;
use ptero_core::{ErrorContext, PanelClient, Queued, RateLimitedQueue, Result};

use crate::collection::{self, BulkResult, BulkSettled, Collection};
use crate::filter::{FieldValue, Filter, Filterable};
use crate::models::{CreateUserRequest, UpdateUserRequest, UserAttributes};

const RESOURCE: &str = "User";

fn user_path(id: u64) -> String {
    format!("/users/{id}")
}

impl Identified for UserAttributes {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Collection manager for `/users`.
#[derive(Debug, Clone)]
pub struct Users {
    inner: Collection,
}

impl Users {
    /// Create a manager with its own request queue.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            inner: Collection::new(client, "users", "/users", RESOURCE),
        }
    }

    /// Queue used for create and delete.
    #[must_use]
    pub fn queue(&self) -> &RateLimitedQueue {
        self.inner.queue()
    }

    /// Fetch one page of users.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<User>> {
        let page = self.inner.list::<UserAttributes>(params).await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Fetch every page of users.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<User>> {
        let users = self.inner.list_all(params).await?;
        Ok(self.wrap_all(users))
    }

    /// Fetch a user by panel id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get(&self, id: u64) -> Result<User> {
        let attributes = self.inner.get(id).await?;
        Ok(User::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Fetch a user by external id.
    ///
    /// # Errors
    ///
    /// Returns [`ptero_core::Error::NotFound`] for unknown ids.
    pub async fn get_external(&self, external_id: &str) -> Result<User> {
        let path = format!("/users/external/{external_id}");
        let context = ErrorContext::new(RESOURCE).identifier(external_id);
        let attributes = self.inner.get_at(&path, context).await?;
        Ok(User::from_attributes(self.inner.client().clone(), attributes))
    }

    /// Search users with the panel's `filter` parameter.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error.
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        let params = [("filter".to_string(), query.to_string())];
        let context = ErrorContext::new("Users")
            .identifier(query)
            .action("searching users");
        let page: ptero_core::ListResponse<UserAttributes> = self
            .inner
            .client()
            .get_json("/users", params.to_vec(), &context)
            .await?;
        Ok(self.wrap_all(page.into_attributes()))
    }

    /// Queue the creation of a user.
    pub fn create(&self, request: CreateUserRequest) -> Queued<User> {
        self.inner.create(request, User::from_attributes)
    }

    /// Queue the deletion of a user.
    pub fn delete(&self, id: u64) -> Queued<()> {
        self.inner.delete(id)
    }

    /// Queue several creations; fails on the first rejected one.
    pub fn bulk_create(&self, requests: Vec<CreateUserRequest>) -> BulkResult<User> {
        self.inner.bulk_create(requests, User::from_attributes)
    }

    /// Queue several creations and report every outcome in input order.
    pub fn bulk_create_settled(&self, requests: Vec<CreateUserRequest>) -> BulkSettled<User> {
        self.inner.bulk_create_settled(requests, User::from_attributes)
    }

    /// Queue several deletions; fails on the first rejected one.
    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = u64>) -> BulkResult<()> {
        self.inner.bulk_delete(ids)
    }

    /// Queue several deletions and report every outcome in input order.
    pub fn bulk_delete_settled(&self, ids: impl IntoIterator<Item = u64>) -> BulkSettled<()> {
        self.inner.bulk_delete_settled(ids)
    }

    /// Start an in-memory filter over `users`.
    #[must_use]
    pub fn filter(&self, users: &[User]) -> Filter<User> {
        Filter::new(users)
    }

    fn wrap_all(&self, users: Vec<UserAttributes>) -> Vec<User> {
        users
            .into_iter()
            .map(|attributes| User::from_attributes(self.inner.client().clone(), attributes))
            .collect()
    }
}

/// A single panel user.
#[derive(Debug, Clone)]
pub struct User {
    client: PanelClient,
    state: EntityCell<UserAttributes>,
}

impl User {
    /// Unloaded wrapper; call [`User::fetch`] to populate it.
    #[must_use]
    pub fn new(client: PanelClient) -> Self {
        Self {
            client,
            state: EntityCell::unloaded(),
        }
    }

    /// Wrapper around attributes received from the panel.
    #[must_use]
    pub fn from_attributes(client: PanelClient, attributes: UserAttributes) -> Self {
        Self {
            client,
            state: EntityCell::loaded(attributes),
        }
    }

    /// Load user `id` into this wrapper.
    ///
    /// # Errors
    ///
    /// Returns the translated panel error; the wrapper is unchanged on failure.
    pub async fn fetch(&self, id: u64) -> Result<()> {
        let context = ErrorContext::new(RESOURCE).identifier(id);
        collection::load(&self.client, &self.state, &user_path(id), &context).await
    }

    /// Reload the current user.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn refresh(&self) -> Result<()> {
        collection::refresh(&self.client, &self.state, RESOURCE, user_path).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded or when `changes` is empty.
    pub async fn update(&self, changes: &UpdateUserRequest) -> Result<()> {
        collection::patch(&self.client, &self.state, RESOURCE, user_path, changes).await
    }

    /// Delete the user and unload the wrapper.
    ///
    /// # Errors
    ///
    /// Returns a validation error when unloaded, else the translated panel error.
    pub async fn delete(&self) -> Result<()> {
        collection::remove(&self.client, &self.state, RESOURCE, user_path).await
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> EntityState<UserAttributes> {
        self.state.snapshot()
    }

    /// Copy of the loaded attributes.
    #[must_use]
    pub fn attributes(&self) -> Option<UserAttributes> {
        self.state.attributes()
    }

    /// Panel id.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.state.read(|a| a.id)
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.state.read(|a| a.username.clone())
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.state.read(|a| a.email.clone())
    }

    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.state
            .read(|a| format!("{} {}", a.first_name, a.last_name).trim().to_string())
    }

    /// Whether the user is a panel administrator.
    #[must_use]
    pub fn is_root_admin(&self) -> bool {
        self.state.read(|a| a.root_admin).unwrap_or(false)
    }

    /// Whether two-factor authentication is enabled.
    #[must_use]
    pub fn has_two_factor(&self) -> bool {
        self.state.read(|a| a.two_factor).unwrap_or(false)
    }
}

/// Filterable user attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    /// `id`
    Id,
    /// `external_id`
    ExternalId,
    /// `uuid`
    Uuid,
    /// `username`
    Username,
    /// `email`
    Email,
    /// `first_name`
    FirstName,
    /// `last_name`
    LastName,
    /// `language`
    Language,
    /// `root_admin`
    RootAdmin,
    /// `2fa`
    TwoFactor,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl Filterable for User {
    type Field = UserField;

    fn field(&self, field: UserField) -> FieldValue {
        self.state
            .read(|a| match field {
                UserField::Id => a.id.into(),
                UserField::ExternalId => a.external_id.clone().into(),
                UserField::Uuid => a.uuid.to_string().into(),
                UserField::Username => a.username.clone().into(),
                UserField::Email => a.email.clone().into(),
                UserField::FirstName => a.first_name.clone().into(),
                UserField::LastName => a.last_name.clone().into(),
                UserField::Language => a.language.clone().into(),
                UserField::RootAdmin => a.root_admin.into(),
                UserField::TwoFactor => a.two_factor.into(),
                UserField::CreatedAt => a.created_at.into(),
                UserField::UpdatedAt => a.updated_at.into(),
            })
            .unwrap_or(FieldValue::Null)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.state.read(|a| a.created_at)
    }
}

impl Filter<User> {
    /// Administrators only.
    #[must_use]
    pub fn root_admins(self) -> Self {
        self.where_eq(UserField::RootAdmin, true)
    }

    /// Non-administrators only.
    #[must_use]
    pub fn normal_users(self) -> Self {
        self.where_eq(UserField::RootAdmin, false)
    }

    /// Users with two-factor authentication enabled.
    #[must_use]
    pub fn with_two_factor(self) -> Self {
        self.where_eq(UserField::TwoFactor, true)
    }

    /// Users without two-factor authentication.
    #[must_use]
    pub fn without_two_factor(self) -> Self {
        self.where_eq(UserField::TwoFactor, false)
    }
}
