//! Routing behavior seen through full dispatch.

use http::Method;
use sextant::{App, ViewBinding};
use sextant_core::{Request, Response, SextantResult};
use sextant_router::{ParamValue, RouteError};
use sextant_test::TestClient;

fn describe_params(req: &mut Request) -> SextantResult<Response> {
    let params: serde_json::Map<String, serde_json::Value> = req
        .params()
        .iter()
        .map(|(name, value)| {
            let value = match value {
                None => serde_json::Value::Null,
                Some(ParamValue::Int(n)) => serde_json::json!(n),
                Some(ParamValue::Float(f)) => serde_json::json!(f),
                Some(ParamValue::Str(s)) => serde_json::json!(s),
                Some(ParamValue::Uuid(u)) => serde_json::json!(u.to_string()),
            };
            (name.to_string(), value)
        })
        .collect();
    Response::json(&serde_json::Value::Object(params))
}

fn get(pattern: &str, body: &'static str) -> ViewBinding {
    ViewBinding::handler(pattern, move |_req| Ok(Response::text(body))).method(Method::GET)
}

fn params_route(pattern: &str) -> ViewBinding {
    ViewBinding::handler(pattern, describe_params).method(Method::GET)
}

#[test]
fn static_segment_beats_dynamic_regardless_of_order() {
    let client = TestClient::new(
        App::builder()
            .route(get("/users/<id>", "dynamic"))
            .route(get("/users/me", "static"))
            .bootstrap()
            .unwrap(),
    );

    client.get("/users/me").send().assert_body_eq("static");
    client.get("/users/42").send().assert_body_eq("dynamic");
}

#[test]
fn dynamic_candidates_try_registration_order() {
    let client = TestClient::new(
        App::builder()
            .route(get("/items/<id:int>", "first"))
            .route(get("/items/<name>", "second"))
            .bootstrap()
            .unwrap(),
    );

    client.get("/items/7").send().assert_body_eq("first");
    client.get("/items/seven").send().assert_body_eq("second");
}

#[test]
fn int_param_is_typed() {
    let client = TestClient::new(
        App::builder()
            .route(params_route("/items/<id:int>"))
            .bootstrap()
            .unwrap(),
    );

    let response = client.get("/items/7").send();
    response.assert_status_code(200);
    assert_eq!(response.json_value().unwrap()["id"], 7);

    client.get("/items/seven").send().assert_status_code(404);
}

#[test]
fn optional_trailing_param() {
    let client = TestClient::new(
        App::builder()
            .route(params_route("/search/<?q>"))
            .bootstrap()
            .unwrap(),
    );

    let absent = client.get("/search").send().json_value().unwrap();
    assert!(absent["q"].is_null());

    let present = client.get("/search/term").send().json_value().unwrap();
    assert_eq!(present["q"], "term");
}

#[test]
fn optional_param_followed_by_static_text() {
    let client = TestClient::new(
        App::builder()
            .route(params_route("/a/<?x>/b"))
            .bootstrap()
            .unwrap(),
    );

    let absent = client.get("/a/b").send().json_value().unwrap();
    assert!(absent["x"].is_null());

    let present = client.get("/a/v/b").send().json_value().unwrap();
    assert_eq!(present["x"], "v");
}

#[test]
fn trailing_slash_and_empty_segments() {
    let client = TestClient::new(
        App::builder()
            .route(get("/users", "list"))
            .route(get("/users/<id>", "one"))
            .route(get("/", "root"))
            .bootstrap()
            .unwrap(),
    );

    client.get("/users/").send().assert_body_eq("list");
    client.get("/users//5").send().assert_status_code(404);
    client.get("/").send().assert_body_eq("root");
}

#[test]
fn percent_encoded_path_is_decoded_before_matching() {
    let client = TestClient::new(
        App::builder()
            .route(params_route("/files/<name>"))
            .bootstrap()
            .unwrap(),
    );

    let body = client.get("/files/a%20b").send().json_value().unwrap();
    assert_eq!(body["name"], "a b");
}

#[test]
fn head_falls_back_to_get_with_empty_body() {
    let client = TestClient::new(App::builder().route(get("/ping", "pong")).bootstrap().unwrap());

    let get = client.get("/ping").send();
    let head = client.head("/ping").send();

    assert_eq!(head.status(), get.status());
    assert_eq!(head.headers(), get.headers());
    assert_eq!(head.content_length(), Some(4));
    assert!(head.body().is_empty());
}

#[test]
fn method_mismatch_falls_through_to_dynamic_route() {
    let client = TestClient::new(
        App::builder()
            .route(
                ViewBinding::handler("/users/me", |_req| Ok(Response::text("created")))
                    .method(Method::POST),
            )
            .route(params_route("/users/<name>"))
            .bootstrap()
            .unwrap(),
    );

    let response = client.get("/users/me").send();
    response.assert_status_code(200);
    assert_eq!(response.json_value().unwrap()["name"], "me");

    client.post("/users/me").send().assert_body_eq("created");
    client
        .delete("/users/me")
        .send()
        .assert_status_code(405)
        .assert_header("allow", "POST");
}

#[test]
fn not_found_and_method_not_allowed() {
    let client = TestClient::new(App::builder().route(get("/items", "list")).bootstrap().unwrap());

    client
        .get("/nothing")
        .send()
        .assert_status_code(404)
        .assert_error_code("ROUTE_NOT_FOUND");

    client
        .post("/items")
        .send()
        .assert_status_code(405)
        .assert_error_code("METHOD_NOT_ALLOWED")
        .assert_header("allow", "GET, HEAD");
}

#[test]
fn malformed_uuid_is_invalid_path_parameter() {
    let client = TestClient::new(
        App::builder()
            .route(params_route("/orders/<id:uuid>"))
            .bootstrap()
            .unwrap(),
    );

    client
        .get("/orders/0000000000000000000000000000000000-0")
        .send()
        .assert_status_code(400)
        .assert_error_code("INVALID_PATH_PARAMETER")
        .assert_json_field("parameter", "id");

    client.get("/orders/not-a-uuid").send().assert_status_code(404);

    let ok = client
        .get("/orders/0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b")
        .send();
    ok.assert_status_code(200);
    assert_eq!(
        ok.json_value().unwrap()["id"],
        "0190a5b2-7c3d-7e4f-8a1b-2c3d4e5f6a7b"
    );
}

#[test]
fn duplicate_pattern_fails_at_bootstrap() {
    let err = App::builder()
        .route(get("/a", "one"))
        .route(get("/a", "two"))
        .bootstrap()
        .unwrap_err();
    assert!(matches!(err, RouteError::RouteConflict { .. }));
}

#[test]
fn registry_is_frozen_after_bootstrap() {
    let app = App::builder().route(get("/a", "one")).bootstrap().unwrap();
    assert!(app.registry().is_frozen());

    let mut registry = sextant::Registry::new();
    registry.add_route(get("/a", "one")).unwrap();
    let app = App::bootstrap(registry, std::sync::Arc::new(sextant_core::StaticSettings::default()));
    assert!(app.registry().is_frozen());
}

#[test]
fn url_for_named_route() {
    let app = App::builder()
        .route(get("/users/<id:int>/posts/<?page>", "posts").name("user_posts"))
        .bootstrap()
        .unwrap();

    assert_eq!(
        app.registry().url_for("user_posts", [("id", 3_i64)]).unwrap(),
        "/users/3/posts"
    );
    assert_eq!(
        app.registry()
            .url_for("user_posts", [("id", "3"), ("page", "2")])
            .unwrap(),
        "/users/3/posts/2"
    );
}
