//! Generic CRUD resource built from a base path.
//!
//! `Resource<Single>` offers list/get/create/update/delete. `Resource<Bulk>`
//! additionally offers the batch variants, which address the collection
//! endpoint itself with an array body. Resource kinds that need more than
//! CRUD get their own type or trait (see [`crate::endpoints`]).
//!
//! Batch operations do not exist on a plain resource:
//!
//! ```compile_fail
//! # use directus_mcp_runtime::resource::Resource;
//! # async fn demo(client: &directus_mcp_runtime::DirectusClient) {
//! let collections = Resource::new("/collections");
//! collections.bulk_delete(client, &[]).await;
//! # }
//! ```

use std::fmt;
use std::marker::PhantomData;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::DirectusClient;
use crate::error::{Error, Result};
use crate::query::QueryParams;

/// Marker: CRUD only.
#[derive(Clone, Copy, Debug)]
pub struct Single;

/// Marker: CRUD plus batch create/update/delete.
#[derive(Clone, Copy, Debug)]
pub struct Bulk;

/// Primary key of a remote entity. Directus keys are integers or strings
/// (uuids, collection names, slugs).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Str(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Int(id) => write!(f, "{id}"),
            ItemId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        ItemId::Int(id)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        ItemId::Str(id.to_string())
    }
}

/// Percent-encode a caller-supplied value for use as one path segment.
///
/// Empty, `.` and `..` are rejected: URL normalization would resolve them to
/// a different endpoint.
pub fn path_segment(value: &impl fmt::Display) -> Result<String> {
    let raw = value.to_string();
    if raw.is_empty() || raw == "." || raw == ".." {
        return Err(Error::validation(format!(
            "'{raw}' is not a valid path segment"
        )));
    }
    Ok(urlencoding::encode(&raw).into_owned())
}

#[derive(Clone, Debug)]
pub struct Resource<K = Single> {
    base_path: String,
    _kind: PhantomData<K>,
}

impl Resource<Single> {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self::at(base_path)
    }
}

impl Resource<Bulk> {
    pub fn with_bulk(base_path: impl Into<String>) -> Self {
        Self::at(base_path)
    }

    /// `POST base` with the array of new entities.
    pub async fn bulk_create(&self, client: &DirectusClient, items: &[Value]) -> Result<Value> {
        let body = Value::Array(items.to_vec());
        client
            .request(Method::POST, &self.base_path, Some(&body))
            .await
    }

    /// `PATCH base` with the array of partial entities (each carrying its key).
    pub async fn bulk_update(&self, client: &DirectusClient, items: &[Value]) -> Result<Value> {
        let body = Value::Array(items.to_vec());
        client
            .request(Method::PATCH, &self.base_path, Some(&body))
            .await
    }

    /// `DELETE base` with the array of keys.
    pub async fn bulk_delete(&self, client: &DirectusClient, ids: &[ItemId]) -> Result<Value> {
        let body = serde_json::to_value(ids)?;
        client
            .request(Method::DELETE, &self.base_path, Some(&body))
            .await
    }
}

impl<K> Resource<K> {
    fn at(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            _kind: PhantomData,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn item_path(&self, id: &impl fmt::Display) -> Result<String> {
        Ok(format!("{}/{}", self.base_path, path_segment(id)?))
    }

    pub async fn list(&self, client: &DirectusClient, params: &QueryParams) -> Result<Value> {
        client
            .request(Method::GET, &params.apply(&self.base_path), None)
            .await
    }

    pub async fn get(
        &self,
        client: &DirectusClient,
        id: &impl fmt::Display,
        params: &QueryParams,
    ) -> Result<Value> {
        client
            .request(Method::GET, &params.apply(&self.item_path(id)?), None)
            .await
    }

    pub async fn create(&self, client: &DirectusClient, data: &Value) -> Result<Value> {
        client
            .request(Method::POST, &self.base_path, Some(data))
            .await
    }

    pub async fn update(
        &self,
        client: &DirectusClient,
        id: &impl fmt::Display,
        data: &Value,
    ) -> Result<Value> {
        client
            .request(Method::PATCH, &self.item_path(id)?, Some(data))
            .await
    }

    pub async fn delete(&self, client: &DirectusClient, id: &impl fmt::Display) -> Result<Value> {
        client
            .request(Method::DELETE, &self.item_path(id)?, None)
            .await
    }
}
