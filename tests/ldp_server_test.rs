//! End-to-end tests for the unsecured server pipeline

use axum::body::to_bytes;
use axum::http::header::HeaderName;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use portico::config::{operation_dispatcher, unsecured_handler};
use portico::handler::CompositeHandler;
use portico::ldp::handler::{AuthenticatedLdpHandler, AuthenticatedLdpHandlerArgs};
use portico::ldp::operations::GetOperationHandler;
use portico::{
    AllowAllAuthorizer, AsyncHandler, BasicRequestParser, BasicResponseWriter, HttpRequest,
    MemoryResourceStore, ResourceStore,
};
use std::sync::Arc;

const BASE: &str = "http://test.com";

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

#[tokio::test]
async fn test_add_read_and_delete_a_resource() {
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let handler = unsecured_handler(store);

    // POST
    let (status, headers, body) = call(
        &handler,
        Method::POST,
        "http://test.com/",
        &[
            ("content-type", "application/octet-stream"),
            ("slug", "testfile1.txt"),
        ],
        Some(b"TESTFILE1 content"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    let location = headers.get("location").unwrap().to_str().unwrap().to_string();
    assert!(location.starts_with("http://test.com/"));
    assert_ne!(location, "http://test.com/");

    // GET
    let (status, headers, body) = call(
        &handler,
        Method::GET,
        &location,
        &[("accept", "text/*")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("location").unwrap().to_str().unwrap(), location);
    assert!(String::from_utf8_lossy(&body).contains("TESTFILE1"));

    // DELETE
    let (status, headers, body) =
        call(&handler, Method::DELETE, &location, &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(headers.get("location").unwrap().to_str().unwrap(), location);

    // GET again
    let (status, _, body) = call(
        &handler,
        Method::GET,
        &location,
        &[("accept", "text/*")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(String::from_utf8_lossy(&body).contains("NotFoundError"));
}

#[tokio::test]
async fn test_put_replaces_a_resource() {
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let handler = unsecured_handler(store);

    let url = "http://test.com/notes.txt";
    let (status, _, _) = call(
        &handler,
        Method::PUT,
        url,
        &[("content-type", "text/plain")],
        Some(b"first"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = call(
        &handler,
        Method::PUT,
        url,
        &[("content-type", "text/plain")],
        Some(b"second"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, body) = call(&handler, Method::GET, url, &[], None).await;
    assert_eq!(&body[..], b"second");
}

#[tokio::test]
async fn test_unrecognized_method_is_a_bad_request() {
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let handler = unsecured_handler(store);

    let (status, _, body) = call(
        &handler,
        Method::PATCH,
        "http://test.com/doc",
        &[],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&body).contains("BadRequestError"));
}

#[tokio::test]
async fn test_unwired_method_is_method_not_allowed() {
    // A pipeline whose operation dispatcher only knows GET.
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let handler = AuthenticatedLdpHandler::new(AuthenticatedLdpHandlerArgs {
        request_parser: Box::new(BasicRequestParser::new()),
        credentials_extractor: Box::new(portico::config::credentials_chain()),
        permissions_extractor: Box::new(portico::config::permissions_chain()),
        authorizer: Box::new(AllowAllAuthorizer),
        operation_handler: Box::new(CompositeHandler::new(vec![Box::new(
            GetOperationHandler::new(store),
        )
            as Box<
                dyn AsyncHandler<
                    Input = portico::Operation,
                    Output = portico::ResponseDescription,
                >,
            >])),
        response_writer: Box::new(BasicResponseWriter),
    });

    let (status, _, body) = call(
        &handler,
        Method::DELETE,
        "http://test.com/doc",
        &[],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(String::from_utf8_lossy(&body).contains("MethodNotAllowedError"));
}

#[tokio::test]
async fn test_router_serves_the_pipeline() {
    use tower::ServiceExt;

    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let server = portico::LdpServer::new(Arc::new(unsecured_handler(store)), "127.0.0.1", 0);

    let response = server
        .router()
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/")
                .header("host", "test.com")
                .header("content-type", "application/octet-stream")
                .header("slug", "via-router.bin")
                .body(axum::body::Body::from("router payload"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("location").unwrap().to_str().unwrap(),
        "http://test.com/via-router.bin"
    );
}

#[tokio::test]
async fn test_operation_dispatcher_rejects_unknown_methods() {
    let store: Arc<dyn ResourceStore> = Arc::new(MemoryResourceStore::new());
    let dispatcher = operation_dispatcher(store);

    let operation = portico::Operation {
        method: Method::PATCH,
        target: portico::ResourceIdentifier::new("http://test.com/doc"),
        preferences: Default::default(),
        body: None,
    };
    assert!(dispatcher.can_handle(&operation).is_err());
}
