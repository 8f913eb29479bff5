mod common;

use common::{TOKEN, VERSION, base_url};
use leveropen::{ApiError, Transport};
use mockito::Matcher;

#[test]
fn get_sends_token_first() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/any-url")
        .match_query(Matcher::Exact(format!("token={}", TOKEN)))
        .with_status(200)
        .create();

    let transport = Transport::new(TOKEN, &base_url(&server), VERSION).unwrap();
    let resp = transport.get("any-url", &[]).unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.url().as_str(),
        format!("{}v1/any-url?token={}", base_url(&server), TOKEN)
    );
    mock.assert();
}

#[test]
fn get_appends_params_in_order() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1/any-url")
        .match_query(Matcher::Exact(format!("token={}&page=1&size=20", TOKEN)))
        .with_status(200)
        .create();

    let transport = Transport::new(TOKEN, &base_url(&server), VERSION).unwrap();
    let resp = transport
        .get("any-url", &[("page", "1"), ("size", "20")])
        .unwrap();

    assert_eq!(
        resp.url().as_str(),
        format!("{}v1/any-url?token={}&page=1&size=20", base_url(&server), TOKEN)
    );
    mock.assert();
}

#[test]
fn not_found_raises_api_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v1/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Status": "Test"}"#)
        .create();

    let transport = Transport::new(TOKEN, &base_url(&server), VERSION).unwrap();
    let err = transport.get("missing", &[]).unwrap_err();

    let api = err.downcast_ref::<ApiError>().expect("an ApiError");
    assert_eq!(api.status(), 404);
    assert_eq!(
        api.info(),
        "See https://www.leveropen.com for information on how to obtain your personal Access Token."
    );
    let message = err.to_string();
    assert!(message.contains("Response 404:"));
    assert!(message.contains(r#"{"Status":"Test"}"#));
    assert!(message.starts_with(api.info()));
}

#[test]
fn any_2xx_is_success() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v1/created")
        .match_query(Matcher::Any)
        .with_status(201)
        .create();

    let transport = Transport::new(TOKEN, &base_url(&server), VERSION).unwrap();
    assert_eq!(transport.get("created", &[]).unwrap().status(), 201);
}

#[test]
fn invalid_json_is_a_parse_error_not_api_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/v1/datasets")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create();

    let transport = Transport::new(TOKEN, &base_url(&server), VERSION).unwrap();
    let err = transport
        .get_json::<serde_json::Value>("datasets", &[])
        .unwrap_err();
    assert!(err.downcast_ref::<ApiError>().is_none());
    assert!(err.to_string().contains("failed to parse API JSON"));
}

#[test]
fn connection_failure_does_not_leak_token() {
    // Nothing listens on the discard port.
    let transport = Transport::new(TOKEN, "http://127.0.0.1:9/", VERSION).unwrap();
    let err = transport
        .get("datasets/a/series?token=stale-token", &[("page", "1")])
        .unwrap_err();

    assert!(err.downcast_ref::<ApiError>().is_none());
    for message in [err.to_string(), format!("{:#}", err), format!("{:?}", err)] {
        assert!(!message.contains(TOKEN), "{}", message);
        assert!(!message.contains("stale-token"), "{}", message);
    }
    assert!(
        err.to_string()
            .contains("request to http://127.0.0.1:9/v1/datasets/a/series failed")
    );
}
