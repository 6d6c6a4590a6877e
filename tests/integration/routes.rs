use halform::config::Settings;
use halform::core::HalError;
use halform::hal::{HalConfig, LinkFn};
use halform::route::{RouteEntry, RouteTable};
use halform::test_utils::mycompany_engine;
use serde_json::json;

use crate::common::render;

fn table() -> RouteTable {
    let table = RouteTable::new();
    table.add(RouteEntry::new("GET", "/{a}/{b}/{c}").unwrap().hal(HalConfig::new().name("a:b:c"))).unwrap();
    table.add(RouteEntry::new("GET", "/deez/treez/{foo}/{bar}").unwrap().id("deez-treez")).unwrap();
    table.add(RouteEntry::new("GET", "/deez/treez/{are?}").unwrap().id("deez-optional")).unwrap();
    table
}

#[test]
fn test_resolve_named_route() {
    let path = table().resolve("a:b:c", &json!({"a": "i", "b": "aint", "c": "fack"})).unwrap();
    assert_eq!(path, "/i/aint/fack");
}

#[test]
fn test_resolve_encodes_parameter_values() {
    let table = table();
    let path = table.resolve("deez-treez", &json!({"foo": "are/fire", "bar": "proof"})).unwrap();
    assert_eq!(path, "/deez/treez/are%2Ffire/proof");

    let path = table
        .resolve(
            "deez-treez",
            &json!({"foo": "are", "bar": "fire/proof", "things": {"should": "not break"}}),
        )
        .unwrap();
    assert_eq!(path, "/deez/treez/are/fire%2Fproof");
}

#[test]
fn test_resolve_optional_parameter() {
    let table = table();
    assert_eq!(table.resolve("deez-optional", &json!({"are": "fireproof"})).unwrap(), "/deez/treez/fireproof");
    assert_eq!(table.resolve("deez-optional", &json!({})).unwrap(), "/deez/treez");
}

#[test]
fn test_resolve_errors() {
    let table = table();
    let err = table.resolve("deez-treez", &json!({"foo": "are"})).unwrap_err();
    assert_eq!(
        err,
        HalError::MissingRouteParameter {
            route: "deez-treez".to_string(),
            parameter: "bar".to_string(),
        }
    );

    let err = table.resolve("nope", &json!({})).unwrap_err();
    assert_eq!(err, HalError::RouteNotFound { route: "nope".to_string() });
}

#[test]
fn test_duplicate_route_name_rejected() {
    let table = table();
    let err = table.add(RouteEntry::new("GET", "/other").unwrap().id("deez-treez")).unwrap_err();
    assert!(matches!(err, HalError::Validation { .. }));
    assert_eq!(table.len(), 3);
}

#[test]
fn test_match_request_decodes_params() {
    let table = table();
    let (entry, params) = table.match_request("GET", "/deez/treez/are%2Ffire/proof").unwrap();
    assert_eq!(entry.name(), Some("deez-treez"));
    assert_eq!(params, json!({"foo": "are/fire", "bar": "proof"}));
    assert!(table.match_request("POST", "/deez/treez/a/b").is_none());
}

#[tokio::test]
async fn test_link_function_reports_missing_parameter() {
    let engine = mycompany_engine(Settings::default());
    engine.route(RouteEntry::new("GET", "/people/{id}").unwrap().id("person")).unwrap();
    engine
        .route(RouteEntry::new("GET", "/teams/{id}").unwrap().hal(HalConfig::new().link(
            "mco:boss",
            LinkFn::sync(|rep, _| Ok(rep.route("person", &json!({}))?.into())),
        )))
        .unwrap();

    let err = engine
        .apply(&crate::common::hal_request("/teams/1"), halform::engine::Reply::json(json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, HalError::PrepareFailure { ref message, .. } if message.contains("Missing parameter 'id'")));

    let doc = render(&engine, "/people/5", json!({})).await;
    assert_eq!(doc["_links"]["self"]["href"], "/people/5");
}
