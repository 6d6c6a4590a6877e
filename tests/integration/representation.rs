use halform::config::Settings;
use halform::core::HalError;
use halform::engine::Reply;
use halform::hal::{HalConfig, Link, LinkFn, PrepareHook};
use halform::route::RouteEntry;
use halform::test_utils::{init_test_logging, mycompany_engine};
use serde_json::json;

use crate::common::{hal_request, keys, mco_curie, render};

#[tokio::test]
async fn test_self_and_simple_link() {
    init_test_logging(None);
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new().link("mco:boss", "./boss")),
        )
        .unwrap();

    let doc = render(&engine, "/people/100", json!({"firstName": "Bob", "lastName": "Smith"})).await;
    assert_eq!(
        doc,
        json!({
            "_links": {
                "self": {"href": "/people/100"},
                "curies": [mco_curie()],
                "mco:boss": {"href": "/people/100/boss"}
            },
            "firstName": "Bob",
            "lastName": "Smith"
        })
    );
    assert_eq!(keys(&doc["_links"]), vec!["self", "curies", "mco:boss"]);
    assert_eq!(keys(&doc), vec!["_links", "firstName", "lastName"]);
}

#[tokio::test]
async fn test_templated_link_object() {
    let engine = mycompany_engine(Settings::default());
    let config = HalConfig::from_value(&json!({
        "links": {"mco:boss": {"href": "../{bossId}", "title": "Boss"}}
    }))
    .unwrap();
    engine.route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(config)).unwrap();

    let doc = render(&engine, "/people/100", json!({"firstName": "Bob", "bossId": "1234"})).await;
    assert_eq!(doc["_links"]["mco:boss"], json!({"href": "/people/1234", "title": "Boss"}));
    assert_eq!(doc["bossId"], "1234");
}

#[tokio::test]
async fn test_prepare_hook_and_hal_function_add_links() {
    let engine = mycompany_engine(Settings::default());
    let add_boss = || {
        PrepareHook::new(|rep| {
            Box::pin(async move {
                rep.link("mco:boss", "http://www.whitehouse.gov");
                Ok(())
            })
        })
    };
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new().prepare(add_boss())),
        )
        .unwrap();
    engine.route(RouteEntry::new("GET", "/bosses/{id}").unwrap().hal_fn(add_boss())).unwrap();

    for url in ["/people/100", "/bosses/100"] {
        let doc = render(&engine, url, json!({"firstName": "Bob"})).await;
        assert_eq!(doc["_links"]["mco:boss"], json!({"href": "http://www.whitehouse.gov"}));
        assert_eq!(doc["_links"]["curies"], json!([mco_curie()]));
    }
}

#[tokio::test]
async fn test_hal_object_and_function_conflict() {
    let engine = mycompany_engine(Settings::default());
    let err = engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new())
                .hal_fn(PrepareHook::sync(|_| Ok(()))),
        )
        .unwrap_err();
    assert!(matches!(err, HalError::ConflictingHalConfig { .. }));
}

#[tokio::test]
async fn test_link_function_uses_named_route() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .id("person")
                .hal(HalConfig::new().query("{?full}").link(
                    "mco:boss",
                    LinkFn::sync(|rep, ctx| {
                        let id = ctx.entity["bossId"].clone();
                        Ok(Link::new(rep.route("person", &json!({"id": id}))?))
                    }),
                )),
        )
        .unwrap();

    let doc = render(&engine, "/people/100", json!({"bossId": "1234"})).await;
    assert_eq!(
        doc["_links"]["mco:boss"],
        json!({"href": "/people/1234{?full}", "templated": true})
    );
}

#[tokio::test]
async fn test_entity_hook_runs_after_route_hook() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().prepare(
            PrepareHook::sync(|rep| {
                rep.prop("order", json!(["route"]));
                Ok(())
            }),
        )))
        .unwrap();

    let entity_hook = PrepareHook::sync(|rep| {
        let mut order = rep.to_value()["order"].clone();
        if let Some(items) = order.as_array_mut() {
            items.push(json!("entity"));
        }
        rep.prop("order", order).link("mco:person", "/people/100");
        Ok(())
    });
    let reply = engine
        .apply(&hal_request("/people/100"), Reply::json(json!({})).with_to_hal(entity_hook))
        .await
        .unwrap();
    assert_eq!(reply.body["order"], json!(["route", "entity"]));
    assert_eq!(reply.body["_links"]["mco:person"]["href"], "/people/100");
}

#[tokio::test]
async fn test_ignored_fields_are_omitted() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new().ignore(["password"])),
        )
        .unwrap();
    let doc = render(&engine, "/people/100", json!({"name": "Bob", "password": "hunter2"})).await;
    assert!(doc.get("password").is_none());
    assert_eq!(doc["name"], "Bob");
}

#[tokio::test]
async fn test_strict_mode_fails_on_unknown_rel() {
    let engine = mycompany_engine(Settings {
        strict: true,
        ..Settings::default()
    });
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new().link("mco:badRel", "./bad")),
        )
        .unwrap();

    let err = engine
        .apply(&hal_request("/people/100"), Reply::json(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err, HalError::UnresolvedNamespace { rel: "mco:badRel".to_string() });

    let reply = engine.handle(&hal_request("/people/100"), Reply::json(json!({}))).await;
    assert_eq!(reply.status, 500);
}

#[tokio::test]
async fn test_permissive_mode_keeps_unknown_prefix_without_curie() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(
            RouteEntry::new("GET", "/people/{id}")
                .unwrap()
                .hal(HalConfig::new().link("foo:bar", "http://www.foo.com")),
        )
        .unwrap();
    let doc = render(&engine, "/people/100", json!({})).await;
    assert!(doc["_links"].get("curies").is_none());
    assert_eq!(doc["_links"]["foo:bar"]["href"], "http://www.foo.com");
}

#[tokio::test]
async fn test_async_hook_failure_aborts_build() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().prepare(
            PrepareHook::new(|_| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    Err(anyhow::anyhow!("lookup failed"))
                })
            }),
        )))
        .unwrap();

    let err = engine
        .apply(&hal_request("/people/100"), Reply::json(json!({})))
        .await
        .unwrap_err();
    match err {
        HalError::PrepareFailure { stage, message } => {
            assert_eq!(stage, "route prepare");
            assert_eq!(message, "lookup failed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
