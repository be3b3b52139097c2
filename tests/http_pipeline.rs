//! End-to-end tests of the client over real HTTP against a mock backend.

mod common;

use std::time::Duration;

use common::{closed_addr, start_backend, MockReply};
use resilient_api_client::{
    request_fn, ApiClient, ApiError, ClientConfig, ErrorKind, RequestOptions,
};
use serde_json::{json, Value};

fn test_config() -> ClientConfig {
    ClientConfig::default()
        .with_timeout(Duration::from_millis(300))
        .with_retry_base_delay(Duration::from_millis(10))
        .with_cache_ttl(Duration::from_secs(30))
}

#[tokio::test]
async fn test_get_is_cached_after_first_fetch() {
    let backend = start_backend(|_| MockReply::json(200, r#"[{"id":1,"name":"Leanne"}]"#)).await;
    let api = ApiClient::new(backend.base_url(), test_config()).unwrap();

    let first = api.get("/users").await.unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.data, json!([{"id": 1, "name": "Leanne"}]));

    let second = api.get("/users").await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.data, first.data);
    assert_eq!(backend.hits(), 1);

    let key = format!("GET:{}/users", backend.base_url());
    assert_eq!(api.cache_stats().keys().collect::<Vec<_>>(), vec![key.as_str()]);
}

#[tokio::test]
async fn test_post_sends_json_and_purges_family() {
    let backend = start_backend(|request| match request.method.as_str() {
        "POST" => MockReply::json(201, r#"{"id":101,"title":"t"}"#),
        _ => MockReply::json(200, "[]"),
    })
    .await;
    let api = ApiClient::new(backend.base_url(), test_config()).unwrap();

    api.get("/posts").await.unwrap();
    api.get("/users").await.unwrap();

    let created = api.post("/posts", &json!({"title": "t"})).await.unwrap();
    assert_eq!(created.data["id"], 101);

    let post = backend.requests().into_iter().find(|r| r.method == "POST").unwrap();
    assert_eq!(post.path, "/posts");
    assert_eq!(post.header("Content-Type"), Some("application/json"));
    assert_eq!(post.body, r#"{"title":"t"}"#);

    let stats = api.cache_stats();
    assert_eq!(stats.size, 1);
    assert!(stats.keys().all(|k| k.ends_with("/users")));

    let refetched = api.get("/posts").await.unwrap();
    assert!(!refetched.from_cache);
    assert_eq!(backend.hits(), 4);
}

#[tokio::test]
async fn test_error_statuses_are_not_retried() {
    let backend = start_backend(|request| {
        if request.path.starts_with("/missing") {
            MockReply::json(404, "{}")
        } else {
            MockReply::json(503, "{}")
        }
    })
    .await;
    let api = ApiClient::new(backend.base_url(), test_config()).unwrap();

    let err = api.get("/missing/1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.status(), Some(404));
    assert_eq!(backend.hits(), 1);

    let err = api.put("/posts/1", &json!({"id": 1})).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(backend.hits(), 2);
    assert_eq!(api.cache_stats().size, 0);
}

#[tokio::test]
async fn test_slow_backend_times_out_every_attempt() {
    let backend =
        start_backend(|_| MockReply::json(200, "{}").delayed(Duration::from_secs(2))).await;
    let config = test_config()
        .with_timeout(Duration::from_millis(100))
        .with_max_retries(2);
    let api = ApiClient::new(backend.base_url(), config).unwrap();

    let err = api.get("/slow").await.unwrap_err();
    assert_eq!(backend.hits(), 3);
    match err {
        ApiError::RetryExhausted { attempts, source } => {
            assert_eq!(attempts, 3);
            assert_eq!(source.kind(), ErrorKind::Timeout);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let addr = closed_addr().await;
    let config = test_config().with_max_retries(1);
    let api = ApiClient::new(format!("http://{}", addr), config).unwrap();

    let err = api.get("/users").await.unwrap_err();
    match err {
        ApiError::RetryExhausted { attempts, source } => {
            assert_eq!(attempts, 2);
            assert_eq!(source.kind(), ErrorKind::Transport);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_interceptor_header_reaches_server() {
    let backend = start_backend(|_| MockReply::json(200, "{}")).await;
    let mut api = ApiClient::new(backend.base_url(), test_config()).unwrap();
    api.add_request_interceptor(request_fn(|_url: &str, options: &RequestOptions| {
        Ok(Some(options.clone().with_header("X-Request-Time", "1700000000000")))
    }));

    api.get("/users/1").await.unwrap();

    let seen = backend.requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].header("x-request-time"), Some("1700000000000"));
}

#[tokio::test]
async fn test_delete_with_empty_body() {
    let backend = start_backend(|_| MockReply::json(200, "")).await;
    let api = ApiClient::new(backend.base_url(), test_config()).unwrap();

    let deleted = api.delete("/posts/1").await.unwrap();
    assert_eq!(deleted.data, Value::Null);
    assert!(!deleted.from_cache);
    assert_eq!(backend.requests()[0].method, "DELETE");
}
