//! Directus resource kinds.
//!
//! Most kinds are plain [`Resource`] values. Fields and relations are keyed
//! by `(collection, field)` and get dedicated types; flows add triggering.

use std::ops::Deref;

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::DirectusClient;
use crate::error::Result;
use crate::query::QueryParams;
use crate::resource::{Bulk, ItemId, Resource, Single, path_segment};

pub fn collections() -> Resource<Single> {
    Resource::new("/collections")
}

pub fn items(collection: &str) -> Result<Resource<Bulk>> {
    Ok(Resource::with_bulk(format!(
        "/items/{}",
        path_segment(&collection)?
    )))
}

pub fn operations() -> Resource<Bulk> {
    Resource::with_bulk("/operations")
}

pub fn dashboards() -> Resource<Bulk> {
    Resource::with_bulk("/dashboards")
}

pub fn panels() -> Resource<Bulk> {
    Resource::with_bulk("/panels")
}

pub fn flows() -> Flows {
    Flows(Resource::with_bulk("/flows"))
}

// =============================================================================
// Fields
// =============================================================================

/// Field definitions live under `/fields/{collection}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fields;

impl Fields {
    fn scoped(collection: &str) -> Result<Resource<Single>> {
        Ok(Resource::new(format!("/fields/{}", path_segment(&collection)?)))
    }

    /// Every field of every collection.
    pub async fn list_all(&self, client: &DirectusClient, params: &QueryParams) -> Result<Value> {
        Resource::new("/fields").list(client, params).await
    }

    pub async fn list(
        &self,
        client: &DirectusClient,
        collection: &str,
        params: &QueryParams,
    ) -> Result<Value> {
        Self::scoped(collection)?.list(client, params).await
    }

    pub async fn get(
        &self,
        client: &DirectusClient,
        collection: &str,
        field: &str,
        params: &QueryParams,
    ) -> Result<Value> {
        Self::scoped(collection)?.get(client, &field, params).await
    }

    pub async fn create(
        &self,
        client: &DirectusClient,
        collection: &str,
        data: &Value,
    ) -> Result<Value> {
        Self::scoped(collection)?.create(client, data).await
    }

    pub async fn update(
        &self,
        client: &DirectusClient,
        collection: &str,
        field: &str,
        data: &Value,
    ) -> Result<Value> {
        Self::scoped(collection)?.update(client, &field, data).await
    }

    pub async fn delete(&self, client: &DirectusClient, collection: &str, field: &str) -> Result<Value> {
        Self::scoped(collection)?.delete(client, &field).await
    }
}

// =============================================================================
// Relations
// =============================================================================

/// Relations are created at `/relations` but addressed by
/// `/relations/{collection}/{field}`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Relations;

impl Relations {
    fn root() -> Resource<Single> {
        Resource::new("/relations")
    }

    fn scoped(collection: &str) -> Result<Resource<Single>> {
        Ok(Resource::new(format!(
            "/relations/{}",
            path_segment(&collection)?
        )))
    }

    pub async fn list(&self, client: &DirectusClient, params: &QueryParams) -> Result<Value> {
        Self::root().list(client, params).await
    }

    pub async fn list_for_collection(
        &self,
        client: &DirectusClient,
        collection: &str,
        params: &QueryParams,
    ) -> Result<Value> {
        Self::scoped(collection)?.list(client, params).await
    }

    pub async fn get(
        &self,
        client: &DirectusClient,
        collection: &str,
        field: &str,
        params: &QueryParams,
    ) -> Result<Value> {
        Self::scoped(collection)?.get(client, &field, params).await
    }

    pub async fn create(&self, client: &DirectusClient, data: &Value) -> Result<Value> {
        Self::root().create(client, data).await
    }

    pub async fn update(
        &self,
        client: &DirectusClient,
        collection: &str,
        field: &str,
        data: &Value,
    ) -> Result<Value> {
        Self::scoped(collection)?.update(client, &field, data).await
    }

    pub async fn delete(&self, client: &DirectusClient, collection: &str, field: &str) -> Result<Value> {
        Self::scoped(collection)?.delete(client, &field).await
    }
}

// =============================================================================
// Flows
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerMethod {
    Get,
    #[default]
    Post,
}

impl TriggerMethod {
    pub const ALL: [&'static str; 2] = ["GET", "POST"];

    fn http(self) -> Method {
        match self {
            TriggerMethod::Get => Method::GET,
            TriggerMethod::Post => Method::POST,
        }
    }
}

/// Resources that can be started on demand through a webhook-style endpoint.
#[async_trait]
pub trait Triggerable: Send + Sync {
    /// Start `id`. `data` becomes the trigger payload for POST and is ignored
    /// for GET.
    async fn trigger(
        &self,
        client: &DirectusClient,
        id: &ItemId,
        method: TriggerMethod,
        data: Option<&Value>,
    ) -> Result<Value>;
}

/// Flow CRUD plus webhook triggering.
#[derive(Clone, Debug)]
pub struct Flows(Resource<Bulk>);

impl Deref for Flows {
    type Target = Resource<Bulk>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl Triggerable for Flows {
    async fn trigger(
        &self,
        client: &DirectusClient,
        id: &ItemId,
        method: TriggerMethod,
        data: Option<&Value>,
    ) -> Result<Value> {
        let path = format!("{}/trigger/{}", self.0.base_path(), path_segment(id)?);
        client.request(method.http(), &path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectusConfig;
    use httpmock::Method::{DELETE, GET, PATCH, POST};
    use httpmock::MockServer;
    use serde_json::json;

    async fn client_for(server: &MockServer) -> DirectusClient {
        let config = DirectusConfig::with_token(&server.base_url(), "tok").unwrap();
        DirectusClient::connect(&config).await.unwrap()
    }

    #[test]
    fn item_resources_are_rooted_under_their_collection() {
        let articles = items("articles").unwrap();
        assert_eq!(articles.base_path(), "/items/articles");
        assert_eq!(
            articles.item_path(&ItemId::Int(3)).unwrap(),
            "/items/articles/3"
        );
        assert_eq!(
            collections().item_path(&"articles").unwrap(),
            "/collections/articles"
        );
    }

    #[test]
    fn collection_names_are_encoded_as_one_segment() {
        assert_eq!(
            items("../collections").unwrap().base_path(),
            "/items/..%2Fcollections"
        );
        assert!(items("..").is_err());
        assert!(items("").is_err());
    }

    #[tokio::test]
    async fn fields_are_addressed_by_collection_and_name() {
        let server = MockServer::start_async().await;
        let all = server
            .mock_async(|when, then| {
                when.method(GET).path("/fields");
                then.status(200).json_body(json!({ "data": [] }));
            })
            .await;
        let one = server
            .mock_async(|when, then| {
                when.method(GET).path("/fields/articles/title");
                then.status(200).json_body(json!({ "data": { "field": "title" } }));
            })
            .await;
        let update = server
            .mock_async(|when, then| {
                when.method(PATCH)
                    .path("/fields/articles/title")
                    .json_body(json!({ "meta": { "note": "Headline" } }));
                then.status(200).json_body(json!({ "data": { "field": "title" } }));
            })
            .await;

        let client = client_for(&server).await;
        Fields.list_all(&client, &QueryParams::default()).await.unwrap();
        Fields
            .get(&client, "articles", "title", &QueryParams::default())
            .await
            .unwrap();
        Fields
            .update(
                &client,
                "articles",
                "title",
                &json!({ "meta": { "note": "Headline" } }),
            )
            .await
            .unwrap();

        all.assert_async().await;
        one.assert_async().await;
        update.assert_async().await;
    }

    #[tokio::test]
    async fn relations_create_at_root_and_delete_by_pair() {
        let server = MockServer::start_async().await;
        let create = server
            .mock_async(|when, then| {
                when.method(POST).path("/relations");
                then.status(200).json_body(json!({ "data": {} }));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE).path("/relations/articles/author");
                then.status(204);
            })
            .await;

        let client = client_for(&server).await;
        Relations
            .create(
                &client,
                &json!({ "collection": "articles", "field": "author", "related_collection": "users" }),
            )
            .await
            .unwrap();
        Relations.delete(&client, "articles", "author").await.unwrap();

        create.assert_async().await;
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn flows_trigger_with_chosen_method() {
        let server = MockServer::start_async().await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/flows/trigger/f-1")
                    .json_body(json!({ "article": 4 }));
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;
        let get = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/flows/trigger/f-2")
                    .matches(|req| req.body.as_deref().map_or(true, <[u8]>::is_empty));
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let client = client_for(&server).await;
        let flows = flows();
        flows
            .trigger(
                &client,
                &ItemId::from("f-1"),
                TriggerMethod::Post,
                Some(&json!({ "article": 4 })),
            )
            .await
            .unwrap();
        flows
            .trigger(
                &client,
                &ItemId::from("f-2"),
                TriggerMethod::Get,
                Some(&json!({ "dropped": true })),
            )
            .await
            .unwrap();

        post.assert_async().await;
        get.assert_async().await;
        assert_eq!(flows.base_path(), "/flows");
    }

    #[test]
    fn trigger_method_parses_uppercase() {
        let method: TriggerMethod = serde_json::from_value(json!("GET")).unwrap();
        assert_eq!(method, TriggerMethod::Get);
        assert_eq!(TriggerMethod::default(), TriggerMethod::Post);
    }
}
