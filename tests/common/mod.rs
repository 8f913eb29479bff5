#![allow(dead_code)]

use leveropen::Lever;
use mockito::{Matcher, Mock, ServerGuard};
use std::path::PathBuf;

pub const TOKEN: &str = "example-access-token";
pub const VERSION: &str = "v1";

pub fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Reads a fixture, pointing its `{host}` links at the mock server.
pub fn fixture(server: &ServerGuard, name: &str) -> String {
    std::fs::read_to_string(data_path(name))
        .unwrap()
        .replace("{host}", &server.url())
}

pub fn base_url(server: &ServerGuard) -> String {
    format!("{}/", server.url())
}

pub fn lever(server: &ServerGuard) -> Lever {
    Lever::new(TOKEN, &base_url(server), VERSION).unwrap()
}

pub fn token_only() -> Matcher {
    Matcher::UrlEncoded("token".into(), TOKEN.into())
}

/// Serves `body` as JSON for `GET path` when the request carries the token.
pub fn serve_json(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .match_query(token_only())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create()
}

pub fn serve_datasets(server: &mut ServerGuard) -> Mock {
    let body = fixture(server, "datasets.json");
    serve_json(server, "/v1/datasets", &body)
}

pub fn serve_series(server: &mut ServerGuard) -> Mock {
    let body = fixture(server, "series.json");
    serve_json(server, "/v1/datasets/a/series", &body)
}
