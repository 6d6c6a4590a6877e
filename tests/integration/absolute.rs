use halform::config::Settings;
use halform::engine::{Reply, RequestInfo};
use halform::hal::{EmbedSpec, HalConfig};
use halform::route::RouteEntry;
use halform::test_utils::mycompany_engine;
use serde_json::json;
use serial_test::serial;

use crate::common::{hal_request, render};

fn people_route(config: HalConfig) -> RouteEntry {
    RouteEntry::new("GET", "/people/{id}").unwrap().hal(
        config
            .link("mco:boss", "./boss")
            .embed("mco:person", EmbedSpec::new("friend", "/people/{item.id}")),
    )
}

#[tokio::test]
async fn test_absolute_links_from_request_host() {
    let engine = mycompany_engine(Settings::default());
    engine.route(people_route(HalConfig::new().absolute(true))).unwrap();

    let request = RequestInfo::get("http://localhost:9090/people/100").with_accept("application/hal+json");
    let reply = engine.apply(&request, Reply::json(json!({"friend": {"id": 200}}))).await.unwrap();
    let links = &reply.body["_links"];
    assert_eq!(links["self"]["href"], "http://localhost:9090/people/100");
    assert_eq!(links["mco:boss"]["href"], "http://localhost:9090/people/100/boss");
    assert_eq!(links["curies"][0]["href"], "http://localhost:9090/rels/mycompany/{rel}");
    assert_eq!(
        reply.body["_embedded"]["mco:person"]["_links"]["self"]["href"],
        "http://localhost:9090/people/200"
    );
}

#[tokio::test]
async fn test_absolute_setting_uses_configured_host_and_protocol() {
    let engine = mycompany_engine(Settings {
        absolute: true,
        protocol: Some("https".to_string()),
        host: Some("api.example.com".to_string()),
        ..Settings::default()
    });
    engine.route(people_route(HalConfig::new())).unwrap();

    let request = hal_request("/people/100").with_host("localhost:9090");
    let reply = engine.apply(&request, Reply::json(json!({}))).await.unwrap();
    assert_eq!(reply.body["_links"]["self"]["href"], "https://api.example.com/people/100");
}

#[tokio::test]
async fn test_absolute_without_host_falls_back_to_relative() {
    let engine = mycompany_engine(Settings {
        absolute: true,
        ..Settings::default()
    });
    engine.route(people_route(HalConfig::new())).unwrap();

    let doc = render(&engine, "/people/100", json!({})).await;
    assert_eq!(doc["_links"]["self"]["href"], "/people/100");
    assert_eq!(doc["_links"]["mco:boss"]["href"], "/people/100/boss");
}

#[tokio::test]
async fn test_url_builder_replaces_origin() {
    let engine = mycompany_engine(Settings::default());
    engine.route(people_route(HalConfig::new().absolute(true).query("{?full}"))).unwrap();
    engine.url_builder(|_request, path, search| format!("https://cdn.example.com/v1{path}{search}"));

    let doc = render(&engine, "/people/100?full=true", json!({})).await;
    assert_eq!(doc["_links"]["self"]["href"], "https://cdn.example.com/v1/people/100?full=true");
    assert_eq!(doc["_links"]["mco:boss"]["href"], "https://cdn.example.com/v1/people/100/boss");
}

#[tokio::test]
async fn test_relative_links_by_default() {
    let engine = mycompany_engine(Settings::default());
    engine.route(people_route(HalConfig::new())).unwrap();

    let request = RequestInfo::get("http://localhost:9090/people/100").with_accept("application/hal+json");
    let reply = engine.apply(&request, Reply::json(json!({}))).await.unwrap();
    assert_eq!(reply.body["_links"]["self"]["href"], "/people/100");
}

#[tokio::test]
#[serial]
async fn test_environment_overrides_settings() {
    // SAFETY: serialized with every other test touching HALFORM_* variables
    unsafe {
        std::env::set_var("HALFORM_HOST", "localhost:9090");
        std::env::set_var("HALFORM_ABSOLUTE", "true");
    }
    let settings = Settings::default().with_env_overrides();
    unsafe {
        std::env::remove_var("HALFORM_HOST");
        std::env::remove_var("HALFORM_ABSOLUTE");
    }

    let engine = mycompany_engine(settings);
    engine.route(people_route(HalConfig::new())).unwrap();
    let doc = render(&engine, "/people/100", json!({})).await;
    assert_eq!(doc["_links"]["self"]["href"], "http://localhost:9090/people/100");
}
