//! Loaded configuration driving dispatch.

use http::Method;
use sextant::{App, ViewBinding};
use sextant_config::ConfigLoader;
use sextant_core::{Error, Response, Settings};
use sextant_test::TestClient;

#[test]
fn loaded_config_drives_debug_and_body_limit() {
    let config = ConfigLoader::new()
        .with_string("debug = true\nmax_body_size = 4\nroute_cache_capacity = 0", "toml")
        .unwrap()
        .load()
        .unwrap();

    let app = App::builder()
        .settings(config)
        .route(ViewBinding::handler("/fail", |_req| Err(Error::fault("kaput"))).method(Method::GET))
        .route(
            ViewBinding::handler("/echo", |req| Ok(Response::bytes(req.body()?.clone())))
                .method(Method::POST),
        )
        .bootstrap()
        .unwrap();
    assert!(app.settings().debug());
    assert_eq!(app.registry().router().cache_capacity(), 0);

    let client = TestClient::new(app);
    let body = client.get("/fail").send().json_value().unwrap();
    assert_eq!(body["details"]["exception"], "kaput");

    client.post("/echo").body("12345").send().assert_status_code(413);
    client.post("/echo").body("1234").send().assert_body_eq("1234");
}
