//! Client side of the marketplace REST backend.
//!
//! Handlers only see the object-safe [`Backend`] trait; the typed helpers
//! below decode its JSON into the records in [`crate::models`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{BackendUser, NotificationSettings};

mod http;
#[cfg(test)]
pub mod memory;

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("backend answered {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

/// Requests address resources by path segments (`["vendors", id]`); each
/// segment is a single opaque component, never re-split or interpreted.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, segments: &[&str]) -> Result<Value, BackendError>;

    async fn patch(&self, segments: &[&str], body: Value) -> Result<Value, BackendError>;
}

/// Readable form of a segment list for errors and logs.
pub fn display_path(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Customers,
    Vendors,
    Repairers,
    Companies,
    Products,
    Orders,
    Invoices,
    Transactions,
    Content,
    Notifications,
    Onboarding,
}

impl Resource {
    pub const fn collection(self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Customers => "customers",
            Resource::Vendors => "vendors",
            Resource::Repairers => "repairers",
            Resource::Companies => "companies",
            Resource::Products => "products",
            Resource::Orders => "orders",
            Resource::Invoices => "invoices",
            Resource::Transactions => "transactions",
            Resource::Content => "content",
            Resource::Notifications => "notifications",
            Resource::Onboarding => "onboarding",
        }
    }
}

const SETTINGS: &str = "notificationSettings";

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, BackendError> {
    serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
}

pub async fn fetch_all<T: DeserializeOwned>(
    backend: &dyn Backend,
    resource: Resource,
) -> Result<Vec<T>, BackendError> {
    decode(backend.get(&[resource.collection()]).await?)
}

pub async fn fetch_one<T: DeserializeOwned>(
    backend: &dyn Backend,
    resource: Resource,
    id: &str,
) -> Result<T, BackendError> {
    decode(backend.get(&[resource.collection(), id]).await?)
}

/// PATCHes a handful of fields on one record and returns the updated record.
pub async fn patch_record(
    backend: &dyn Backend,
    resource: Resource,
    id: &str,
    fields: Value,
) -> Result<Value, BackendError> {
    backend.patch(&[resource.collection(), id], fields).await
}

/// Looks up the backend user profile matching a dashboard login.
pub async fn find_user_by_email(
    backend: &dyn Backend,
    email: &str,
) -> Result<Option<BackendUser>, BackendError> {
    let users: Vec<BackendUser> = fetch_all(backend, Resource::Users).await?;
    Ok(users
        .into_iter()
        .find(|user| user.email.eq_ignore_ascii_case(email)))
}

pub async fn fetch_notification_settings(
    backend: &dyn Backend,
) -> Result<NotificationSettings, BackendError> {
    decode(backend.get(&[SETTINGS]).await?)
}

pub async fn update_notification_settings(
    backend: &dyn Backend,
    settings: &NotificationSettings,
) -> Result<NotificationSettings, BackendError> {
    let body = serde_json::to_value(settings).map_err(|e| BackendError::Decode(e.to_string()))?;
    decode(backend.patch(&[SETTINGS], body).await?)
}

pub async fn mark_notification_read(backend: &dyn Backend, id: &str) -> Result<(), BackendError> {
    patch_record(backend, Resource::Notifications, id, json!({ "read": true })).await?;
    Ok(())
}
