//! End-to-end tests for the Web Access Control pipeline

use axum::body::to_bytes;
use axum::http::header::HeaderName;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use portico::config::{initialize_root_acl, rdf_converters, web_acl_handler};
use portico::storage::conversion::TEXT_TURTLE;
use portico::{
    AsyncHandler, AuthenticatedLdpHandler, HttpRequest, MemoryResourceStore, Representation,
    RepresentationConvertingStore, RepresentationData, RepresentationMetadata, ResourceIdentifier,
    ResourceStore,
};
use std::sync::Arc;

const BASE: &str = "http://test.com";

fn quad_store() -> Arc<dyn ResourceStore> {
    Arc::new(RepresentationConvertingStore::new(
        MemoryResourceStore::new(),
        rdf_converters(),
        Some(TEXT_TURTLE.to_string()),
    ))
}

async fn put_turtle(store: &dyn ResourceStore, url: &str, content: &str) {
    store
        .set_representation(
            &ResourceIdentifier::new(url),
            Representation::new(
                RepresentationData::from_bytes(content.to_string()),
                RepresentationMetadata::with_content_type(TEXT_TURTLE),
            ),
        )
        .await
        .unwrap();
}

fn request(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&[u8]>,
) -> HttpRequest {
    let path = url
        .strip_prefix(BASE)
        .expect("test URLs live under the base")
        .to_string();
    let mut header_map = HeaderMap::new();
    header_map.insert("host", "test.com".parse().unwrap());
    for (name, value) in headers {
        header_map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            value.parse().unwrap(),
        );
    }
    let body = body.map(|content| {
        let content = Bytes::copy_from_slice(content);
        stream::once(async move { Ok(content) }).boxed()
    });
    HttpRequest {
        method,
        path,
        headers: header_map,
        body,
    }
}

async fn call(
    handler: &AuthenticatedLdpHandler,
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    body: Option<&[u8]>,
) -> (StatusCode, HeaderMap, Bytes) {
    let response = handler
        .handle_safe(request(method, url, headers, body))
        .await
        .unwrap();
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, parts.headers, bytes)
}

const SAMPLE_TURTLE: &str = "<http://test.com/s> <http://test.com/p> <http://test.com/o> .";

const READ_ONLY_ACL: &str = r#"@prefix acl: <http://www.w3.org/ns/auth/acl#>.
@prefix foaf: <http://xmlns.com/foaf/0.1/>.
<#authorization>
    a acl:Authorization;
    acl:agentClass foaf:Agent;
    acl:mode acl:Read;
    acl:accessTo <http://test.com/>;
    acl:default <http://test.com/>."#;

#[tokio::test]
async fn test_root_acl_lets_anonymous_agents_work() {
    let store = quad_store();
    initialize_root_acl(store.as_ref(), &ResourceIdentifier::new("http://test.com/"))
        .await
        .unwrap();
    let handler = web_acl_handler(Arc::clone(&store));

    // POST
    let (status, headers, _) = call(
        &handler,
        Method::POST,
        "http://test.com/",
        &[("content-type", TEXT_TURTLE), ("slug", "notes.ttl")],
        Some(SAMPLE_TURTLE.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let location = headers.get("location").unwrap().to_str().unwrap().to_string();

    // GET
    let (status, _, body) = call(
        &handler,
        Method::GET,
        &location,
        &[("accept", "text/turtle")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&body).contains("<http://test.com/s>"));

    // DELETE
    let (status, _, _) = call(&handler, Method::DELETE, &location, &[], None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_acl_denies_everyone() {
    let store = quad_store();
    put_turtle(store.as_ref(), "http://test.com/doc", SAMPLE_TURTLE).await;
    let handler = web_acl_handler(Arc::clone(&store));

    // Anonymous agents are asked to authenticate.
    let (status, _, body) = call(&handler, Method::GET, "http://test.com/doc", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(String::from_utf8_lossy(&body).contains("AuthenticationError"));

    // Authenticated agents are refused outright.
    let (status, _, body) = call(
        &handler,
        Method::GET,
        "http://test.com/doc",
        &[("authorization", "WebID http://test.com/alice#me")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(String::from_utf8_lossy(&body).contains("ForbiddenError"));
}

#[tokio::test]
async fn test_default_read_grant_is_inherited_by_descendants() {
    let store = quad_store();
    put_turtle(store.as_ref(), "http://test.com/.acl", READ_ONLY_ACL).await;
    put_turtle(
        store.as_ref(),
        "http://test.com/deep/nested/doc",
        SAMPLE_TURTLE,
    )
    .await;
    let handler = web_acl_handler(Arc::clone(&store));

    let (status, _, _) = call(
        &handler,
        Method::GET,
        "http://test.com/deep/nested/doc",
        &[("accept", "text/turtle")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Read does not allow writing.
    let (status, _, _) = call(
        &handler,
        Method::PUT,
        "http://test.com/deep/nested/doc",
        &[("content-type", TEXT_TURTLE)],
        Some(SAMPLE_TURTLE.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = call(
        &handler,
        Method::PUT,
        "http://test.com/deep/nested/doc",
        &[
            ("content-type", TEXT_TURTLE),
            ("authorization", "WebID http://test.com/alice#me"),
        ],
        Some(SAMPLE_TURTLE.as_bytes()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_acl_is_a_server_error() {
    let store = quad_store();
    put_turtle(store.as_ref(), "http://test.com/doc", SAMPLE_TURTLE).await;
    put_turtle(store.as_ref(), "http://test.com/doc.acl", "this is not turtle").await;
    let handler = web_acl_handler(Arc::clone(&store));

    let (status, _, body) = call(&handler, Method::GET, "http://test.com/doc", &[], None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8_lossy(&body).contains("ServerError"));
}

#[tokio::test]
async fn test_negotiation_serves_the_stored_type_or_fails_cleanly() {
    let store = quad_store();
    initialize_root_acl(store.as_ref(), &ResourceIdentifier::new("http://test.com/"))
        .await
        .unwrap();
    put_turtle(store.as_ref(), "http://test.com/doc", SAMPLE_TURTLE).await;
    let handler = web_acl_handler(Arc::clone(&store));

    let (status, headers, _) = call(
        &handler,
        Method::GET,
        "http://test.com/doc",
        &[("accept", "text/turtle")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-type").unwrap().to_str().unwrap(),
        TEXT_TURTLE
    );

    // No converter produces JSON, so the request cannot be satisfied.
    let (status, _, body) = call(
        &handler,
        Method::GET,
        "http://test.com/doc",
        &[("accept", "application/json")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("ConversionError"));
}
