//! Client tests against a throwaway local HTTP server.

use std::convert::Infallible;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use specimen_lib::SpecimenClient;
use specimen_lib::error::ApiError;
use specimen_lib::query::{GenusQuery, QueryState};
use specimen_lib::tree::{CheckState, TaxonomyTree};

type Handler = fn(&str, &str, &[u8]) -> (StatusCode, String);

/// Serves every connection with `handler` and returns the base URL.
async fn serve(handler: Handler) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let io = TokioIo::new(stream);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| async move {
                    let method = req.method().to_string();
                    let path_and_query = req
                        .uri()
                        .path_and_query()
                        .map(|p| p.to_string())
                        .unwrap_or_default();
                    let body = req.into_body().collect().await.unwrap().to_bytes();
                    let (status, text) = handler(&method, &path_and_query, &body);

                    Ok::<_, Infallible>(
                        Response::builder()
                            .status(status)
                            .header("Content-Type", "application/json")
                            .body(Full::new(Bytes::from(text)))
                            .unwrap(),
                    )
                });
                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    format!("http://{}", addr)
}

fn client(base_url: &str) -> SpecimenClient {
    SpecimenClient::builder().url(base_url).build().unwrap()
}

fn search_server(method: &str, path: &str, body: &[u8]) -> (StatusCode, String) {
    match (method, path) {
        ("GET", "/api/taxonomy_json") => (
            StatusCode::OK,
            r#"{"name": "Root", "rank": null, "children": [
                {"name": "Kingdom A", "rank": "kingdom", "children": [
                    {"name": "Genus Y", "rank": "genus", "children": []},
                    {"name": "Genus X", "rank": "genus"}
                ]}
            ]}"#
            .to_string(),
        ),
        ("POST", "/api/build_query") => {
            let state: serde_json::Value = serde_json::from_slice(body).unwrap();
            let taxa = state["taxonomy"].as_array().map_or(0, Vec::len);
            let hybrids = state["options"]["hybrids"].as_str().unwrap_or("?").to_string();
            (
                StatusCode::OK,
                serde_json::json!({
                    "sql": format!("-- {} taxa, hybrids={}", taxa, hybrids),
                    "results": [["BOLD:AAA0001", "Genus X"], ["BOLD:AAA0002", "Genus X"]],
                    "columns": ["bin", "genus"],
                    "total_count": 2
                })
                .to_string(),
            )
        }
        ("GET", p) if p.starts_with("/api/query?") => {
            (StatusCode::OK, serde_json::json!([[p]]).to_string())
        }
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

#[tokio::test]
async fn test_fetch_taxonomy_single_root() {
    let base = serve(search_server).await;
    let forest = client(&base).fetch_taxonomy().await.unwrap();

    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].name, "Root");
    assert_eq!(forest[0].children[0].children.len(), 2);
}

#[tokio::test]
async fn test_selection_round_trip() {
    let base = serve(search_server).await;
    let client = client(&base);

    let mut tree = TaxonomyTree::from_forest(client.fetch_taxonomy().await.unwrap());
    let kingdom = tree.find("Kingdom A").unwrap();
    tree.expand(kingdom).unwrap();
    tree.set_checked(tree.find("Genus X").unwrap(), true).unwrap();
    assert_eq!(tree.check_state(kingdom), Some(CheckState::Indeterminate));

    let state = QueryState::new().with_taxonomy(tree.selection());
    let response = client.build_query(&state).await.unwrap();

    assert_eq!(response.sql.as_deref(), Some("-- 1 taxa, hybrids=all"));
    assert_eq!(response.row_count(), 2);
    assert_eq!(response.columns, vec!["bin", "genus"]);
    assert_eq!(response.display_rows()[1][0], "BOLD:AAA0002");
}

#[tokio::test]
async fn test_run_query_encodes_parameters() {
    let base = serve(search_server).await;
    let query = GenusQuery {
        exclude_duplicates: true,
        ..GenusQuery::new("Canis lupus")
    };
    let rows = client(&base).run_query(&query).await.unwrap();

    assert_eq!(
        rows[0][0],
        "/api/query?genus=Canis+lupus&verified_genus=false&exclude_dup=true&exclude_misclass=false"
    );
}

#[tokio::test]
async fn test_http_error_status() {
    fn failing(_: &str, _: &str, _: &[u8]) -> (StatusCode, String) {
        (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable".to_string())
    }
    let base = serve(failing).await;
    let err = client(&base).fetch_taxonomy().await.unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(err.to_string(), "HTTP 500: database unavailable");
}

#[tokio::test]
async fn test_empty_error_body_uses_reason() {
    let base = serve(search_server).await;
    let err = client(&format!("{}/missing", base))
        .fetch_taxonomy()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn test_malformed_taxonomy() {
    fn garbage(_: &str, _: &str, _: &[u8]) -> (StatusCode, String) {
        (StatusCode::OK, "<html>oops</html>".to_string())
    }
    let base = serve(garbage).await;
    let err = client(&base).fetch_taxonomy().await.unwrap_err();

    match err {
        ApiError::Parse { body, .. } => assert_eq!(body.as_deref(), Some("<html>oops</html>")),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .fetch_taxonomy()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert!(err.is_retryable());
}
