//! HTTP routes for a resource
//!
//! [`resource_router`] mounts a list endpoint at `/` and a detail endpoint at
//! `/{id}`. Nest the returned router under the resource's path:
//!
//! ```rust
//! use acton_restless::handlers::{DetailEndpoint, ListEndpoint};
//! use acton_restless::repository::{MemoryStore, Resource};
//! use acton_restless::routes::resource_router;
//! use axum::Router;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct City {
//!     id: String,
//!     population: u64,
//! }
//!
//! impl Resource for City {
//!     type Id = String;
//!     const NAME: &'static str = "City";
//!     const FIELDS: &'static [&'static str] = &["id", "population"];
//!
//!     fn id(&self) -> String {
//!         self.id.clone()
//!     }
//! }
//!
//! let store = MemoryStore::<City>::new();
//! let app: Router = Router::new().nest(
//!     "/cities",
//!     resource_router(
//!         ListEndpoint::builder(store.clone()).filtering().ordering().build(),
//!         DetailEndpoint::builder(store).build(),
//!     ),
//! );
//! ```

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::Result;
use crate::handlers::{DeleteStrategy, DetailEndpoint, ListEndpoint};
use crate::pagination::ResultEnvelope;
use crate::params::RequestParams;
use crate::repository::{Payload, RecordStore, Resource};

/// Both endpoints of one resource, shared by its routes
struct Endpoints<R: Resource, S: RecordStore<R>, D: DeleteStrategy<R>> {
    list: ListEndpoint<R, S>,
    detail: DetailEndpoint<R, S, D>,
}

type Shared<R, S, D> = State<Arc<Endpoints<R, S, D>>>;

/// Router serving `GET`/`POST` on `/` and `GET`/`PUT`/`PATCH`/`DELETE` on `/{id}`
pub fn resource_router<R, S, D>(
    list: ListEndpoint<R, S>,
    detail: DetailEndpoint<R, S, D>,
) -> Router
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    let endpoints = Arc::new(Endpoints { list, detail });

    Router::new()
        .route(
            "/",
            get(list_records::<R, S, D>).post(create_record::<R, S, D>),
        )
        .route(
            "/{id}",
            get(read_record::<R, S, D>)
                .put(replace_record::<R, S, D>)
                .patch(update_record::<R, S, D>)
                .delete(delete_record::<R, S, D>),
        )
        .with_state(endpoints)
}

async fn list_records<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Query(params): Query<RequestParams>,
) -> Result<ResultEnvelope>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    endpoints.list.get(&params).await
}

async fn create_record<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Json(payload): Json<Payload>,
) -> Result<(StatusCode, Json<Value>)>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    let created = endpoints.list.post(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn read_record<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Path(id): Path<R::Id>,
) -> Result<Json<Value>>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    endpoints.detail.get(&id).await.map(Json)
}

async fn replace_record<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Path(id): Path<R::Id>,
    Json(payload): Json<Payload>,
) -> Result<Json<Value>>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    endpoints.detail.put(&id, payload).await.map(Json)
}

async fn update_record<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Path(id): Path<R::Id>,
    Json(payload): Json<Payload>,
) -> Result<Json<Value>>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    endpoints.detail.patch(&id, payload).await.map(Json)
}

async fn delete_record<R, S, D>(
    State(endpoints): Shared<R, S, D>,
    Path(id): Path<R::Id>,
) -> Result<Json<Value>>
where
    R: Resource,
    S: RecordStore<R>,
    D: DeleteStrategy<R>,
{
    endpoints.detail.delete(&id).await.map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::SoftDelete;
    use crate::repository::MemoryStore;
    use crate::stages::fixtures::{store, Note};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn app(store: MemoryStore<Note>) -> Router {
        let list = ListEndpoint::builder(store.clone())
            .soft_delete()
            .filtering()
            .ordering()
            .build();
        let detail: DetailEndpoint<Note, MemoryStore<Note>, SoftDelete> =
            DetailEndpoint::builder(store).soft_delete().build();
        Router::new().nest("/notes", resource_router(list, detail))
    }

    async fn send(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_list_with_window() {
        let (status, body) =
            send(app(store()), Method::GET, "/notes?_limit=2&_offset=1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 6);
        assert_eq!(body["count"], 2);
        assert_eq!(body["results"][0]["id"], 2);
        assert_eq!(body["results"][1]["id"], 3);
    }

    #[tokio::test]
    async fn test_list_filters_with_in() {
        let uri = "/notes?id__in=1,3,5&_orderby=-id";
        let (status, body) = send(app(store()), Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<u64> = body["results"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|r| r["id"].as_u64())
            .collect();
        assert_eq!(ids, vec![5, 3, 1]);
    }

    #[tokio::test]
    async fn test_invalid_limit_is_bad_request() {
        let (status, body) = send(app(store()), Method::GET, "/notes?_limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_invalid_order_is_bad_request() {
        for field in ["invalid_field", "title__nonsense"] {
            let uri = format!("/notes?_orderby={field}");
            let (status, body) = send(app(store()), Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "field {field}");
            assert_eq!(body["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_post_returns_created() {
        let store = store();
        let payload = json!({"id": 10, "title": "kappa", "rank": 1, "author": {"name": "ada"}});
        let (status, body) =
            send(app(store.clone()), Method::POST, "/notes", Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], 10);
        assert!(body.get("deleted").is_none());
        assert!(store.get(&10).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_post_with_deleted_names_field() {
        let payload = json!({
            "id": 10,
            "title": "kappa",
            "rank": 1,
            "author": {"name": "ada"},
            "deleted": true
        });
        let (status, body) = send(app(store()), Method::POST, "/notes", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "deleted");
    }

    #[tokio::test]
    async fn test_detail_verbs() {
        let store = store();

        let (status, body) = send(app(store.clone()), Method::GET, "/notes/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "delta");

        let (status, body) = send(
            app(store.clone()),
            Method::PATCH,
            "/notes/4",
            Some(json!({"rank": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rank"], 7);

        let replacement = json!({"title": "DELTA", "rank": 8, "author": {"name": "grace"}});
        let (status, body) =
            send(app(store.clone()), Method::PUT, "/notes/4", Some(replacement)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "DELTA");

        let (status, body) = send(app(store.clone()), Method::DELETE, "/notes/4", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (_, body) = send(app(store), Method::GET, "/notes", None).await;
        assert_eq!(body["total"], 5);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let (status, body) = send(app(store()), Method::GET, "/notes/77", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
