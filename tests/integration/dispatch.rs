use halform::config::Settings;
use halform::engine::{Reply, RequestInfo};
use halform::hal::{HalConfig, PrepareHook};
use halform::route::RouteEntry;
use halform::test_utils::mycompany_engine;
use serde_json::json;

use crate::common::hal_request;

fn media_type_settings() -> Settings {
    Settings {
        media_types: vec!["application/json".to_string(), "application/hal+json".to_string()],
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_media_types_select_content_type() {
    let engine = mycompany_engine(media_type_settings());
    engine.route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new())).unwrap();

    let request = RequestInfo::get("/people/100").with_accept("application/json");
    let reply = engine.apply(&request, Reply::json(json!({"name": "Bob"}))).await.unwrap();
    assert_eq!(reply.headers.get("content-type"), Some("application/json"));
    assert_eq!(reply.body["_links"]["self"]["href"], "/people/100");

    let reply = engine
        .apply(&hal_request("/people/100"), Reply::json(json!({"name": "Bob"})))
        .await
        .unwrap();
    assert_eq!(reply.headers.get("content-type"), Some("application/hal+json"));
    assert_eq!(reply.body["_links"]["self"]["href"], "/people/100");
}

#[tokio::test]
async fn test_unacceptable_media_type_passes_through() {
    let engine = mycompany_engine(Settings::default());
    let request = RequestInfo::get("/people/100").with_accept("text/html, application/xml;q=0.9");
    let reply = engine.apply(&request, Reply::json(json!({"name": "Bob"}))).await.unwrap();
    assert_eq!(reply.body, json!({"name": "Bob"}));
    assert_eq!(reply.headers.get("content-type"), Some("application/json"));
}

#[tokio::test]
async fn test_explicit_accept_required() {
    let engine = mycompany_engine(Settings {
        require_explicit_hal_accept: true,
        ..Settings::default()
    });

    let wildcard = RequestInfo::get("/people/100").with_accept("*/*");
    assert!(!engine.should_transform(&wildcard, &Reply::json(json!({}))));
    assert!(!engine.should_transform(&RequestInfo::get("/people/100"), &Reply::json(json!({}))));
    assert!(engine.should_transform(&hal_request("/people/100"), &Reply::json(json!({}))));
}

#[tokio::test]
async fn test_created_reply_uses_location_as_self() {
    let engine = mycompany_engine(Settings::default());
    engine.route(RouteEntry::new("POST", "/people").unwrap().hal(HalConfig::new())).unwrap();

    let request = RequestInfo::new("POST", "/people").with_accept("application/hal+json");
    let reply = engine
        .apply(&request, Reply::created("/people/100", json!({"name": "Bob"})))
        .await
        .unwrap();
    assert_eq!(reply.status, 201);
    assert_eq!(reply.headers.get("location"), Some("/people/100"));
    assert_eq!(reply.body["_links"]["self"]["href"], "/people/100");

    let reply = engine
        .apply(&request, Reply::created("api/people/100", json!({"name": "Bob"})))
        .await
        .unwrap();
    assert_eq!(reply.body["_links"]["self"]["href"], "/api/people/100");
}

#[tokio::test]
async fn test_location_ignored_without_created_status() {
    let engine = mycompany_engine(Settings::default());
    let reply = engine
        .apply(
            &hal_request("/people"),
            Reply::json(json!({})).header("location", "/people/100"),
        )
        .await
        .unwrap();
    assert_eq!(reply.body["_links"]["self"]["href"], "/people");
}

#[tokio::test]
async fn test_reply_headers_and_status_preserved() {
    let engine = mycompany_engine(Settings::default());
    let reply = Reply::json(json!({"name": "Bob"}))
        .status(202)
        .header("last-modified", "Thu, 01 Oct 2026 10:00:00 GMT");
    let reply = engine.apply(&hal_request("/people/100"), reply).await.unwrap();
    assert_eq!(reply.status, 202);
    assert_eq!(reply.headers.get("Last-Modified"), Some("Thu, 01 Oct 2026 10:00:00 GMT"));
    assert_eq!(reply.headers.get("content-type"), Some("application/hal+json"));
}

#[tokio::test]
async fn test_unrouted_request_gets_self_link_without_query() {
    let engine = mycompany_engine(Settings::default());
    let reply = engine
        .apply(&hal_request("/things?page=2"), Reply::json(json!({"a": 1})))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({"_links": {"self": {"href": "/things"}}, "a": 1}));
}

#[tokio::test]
async fn test_url_valued_query_parameter_keeps_request_path() {
    let engine = mycompany_engine(Settings {
        absolute: true,
        ..Settings::default()
    });
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().query("{?callback}")))
        .unwrap();

    let request = hal_request("/people/100?callback=http://example.com/cb").with_host("localhost:9090");
    let reply = engine.apply(&request, Reply::json(json!({}))).await.unwrap();
    assert_eq!(
        reply.body["_links"]["self"]["href"],
        "http://localhost:9090/people/100?callback=http://example.com/cb"
    );
}

#[tokio::test]
async fn test_internal_route_and_non_object_bodies_pass_through() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/internal/stats")
                .unwrap()
                .internal(true)
                .hal(HalConfig::new().link("mco:boss", "./boss")),
        )
        .unwrap();

    let reply = engine
        .apply(&hal_request("/internal/stats"), Reply::json(json!({"hits": 3})))
        .await
        .unwrap();
    assert_eq!(reply.body, json!({"hits": 3}));

    for body in [json!([{"id": 1}]), json!("text"), json!(null)] {
        let reply = engine.apply(&hal_request("/people"), Reply::json(body.clone())).await.unwrap();
        assert_eq!(reply.body, body);
    }
}

#[tokio::test]
async fn test_request_filter_skips_transformation() {
    let engine = mycompany_engine(Settings::default());
    engine.filter(|request| request.path != "/health");

    let reply = engine.apply(&hal_request("/health"), Reply::json(json!({"ok": true}))).await.unwrap();
    assert_eq!(reply.body, json!({"ok": true}));

    let reply = engine.apply(&hal_request("/people"), Reply::json(json!({}))).await.unwrap();
    assert_eq!(reply.body["_links"]["self"]["href"], "/people");
}

#[tokio::test]
async fn test_handle_turns_failures_into_server_errors() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal_fn(PrepareHook::sync(|_| {
            anyhow::bail!("database unavailable")
        })))
        .unwrap();

    let reply = engine.handle(&hal_request("/people/100"), Reply::json(json!({}))).await;
    assert_eq!(reply.status, 500);
    assert_eq!(reply.body["statusCode"], 500);
    assert!(reply.body["message"].as_str().unwrap().contains("database unavailable"));
}

#[tokio::test]
async fn test_api_root_lists_routes_by_rel() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/people")
                .unwrap()
                .hal(HalConfig::new().name("people").query("{?q*,start,limit}").api("mco:people")),
        )
        .unwrap();
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().api("mco:person")))
        .unwrap();
    engine.route(RouteEntry::new("GET", "/health").unwrap()).unwrap();

    let reply = engine.serve_builtin(&hal_request("/api")).unwrap().unwrap();
    assert_eq!(reply.headers.get("content-type"), Some("application/hal+json"));
    assert_eq!(
        reply.body["_links"],
        json!({
            "self": {"href": "/api/"},
            "curies": [{"name": "mco", "href": "/rels/mycompany/{rel}", "templated": true}],
            "mco:people": {"href": "/people{?q*,start,limit}", "templated": true},
            "mco:person": {"href": "/people/{id}", "templated": true}
        })
    );

    assert!(engine.serve_builtin(&hal_request("/people")).unwrap().is_none());
}
