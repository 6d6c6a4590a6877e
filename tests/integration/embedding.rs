use halform::config::Settings;
use halform::core::HalError;
use halform::engine::Reply;
use halform::hal::{EmbedSpec, HalConfig, LinkFn, PrepareHook};
use halform::route::RouteEntry;
use halform::test_utils::mycompany_engine;
use serde_json::json;

use crate::common::{hal_request, keys, mco_curie, render};

#[tokio::test]
async fn test_embed_object_property() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(
            HalConfig::from_value(&json!({
                "embedded": {"mco:boss": {"path": "boss", "href": "./boss"}}
            }))
            .unwrap(),
        ))
        .unwrap();

    let doc = render(
        &engine,
        "/people/100",
        json!({"firstName": "Bob", "lastName": "Smith", "boss": {"firstName": "Boss", "lastName": "Man"}}),
    )
    .await;
    assert_eq!(
        doc,
        json!({
            "_links": {"self": {"href": "/people/100"}, "curies": [mco_curie()]},
            "_embedded": {
                "mco:boss": {
                    "_links": {"self": {"href": "/people/100/boss"}},
                    "firstName": "Boss",
                    "lastName": "Man"
                }
            },
            "firstName": "Bob",
            "lastName": "Smith"
        })
    );
    assert_eq!(keys(&doc), vec!["_links", "_embedded", "firstName", "lastName"]);
}

#[tokio::test]
async fn test_embedded_href_binds_self_and_item() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(
            HalConfig::new().embed("mco:boss", EmbedSpec::new("boss", "/people/{self.id}/{item.id}")),
        ))
        .unwrap();

    let doc = render(&engine, "/people/100", json!({"id": 100, "boss": {"id": 200}})).await;
    assert_eq!(doc["_embedded"]["mco:boss"]["_links"]["self"]["href"], "/people/100/200");
}

#[tokio::test]
async fn test_embedded_collection_keeps_order() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people").unwrap().hal(
            HalConfig::new()
                .query("{?q*,start,limit}")
                .embed("mco:person", EmbedSpec::new("items", "./{item.id}")),
        ))
        .unwrap();

    let doc = render(
        &engine,
        "/people?q=funny&start=1&token=12345",
        json!({"start": 1, "count": 2, "items": [{"id": 100, "firstName": "Louis"}, {"id": 200, "firstName": "Mark"}]}),
    )
    .await;

    assert_eq!(doc["_links"]["self"]["href"], "/people?q=funny&start=1");
    assert_eq!(
        doc["_embedded"]["mco:person"],
        json!([
            {"_links": {"self": {"href": "/people/100"}}, "id": 100, "firstName": "Louis"},
            {"_links": {"self": {"href": "/people/200"}}, "id": 200, "firstName": "Mark"}
        ])
    );
    assert!(doc.get("items").is_none());
    assert_eq!(doc["count"], 2);
}

#[tokio::test]
async fn test_absent_value_omits_rel_and_empty_array_is_kept() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(
            HalConfig::new()
                .embed("mco:boss", EmbedSpec::new("boss", "./boss"))
                .embed("mco:people", EmbedSpec::new("reports", "/people/{item.id}")),
        ))
        .unwrap();

    let doc = render(&engine, "/people/100", json!({"firstName": "Bob"})).await;
    assert!(doc.get("_embedded").is_none());

    let doc = render(&engine, "/people/100", json!({"firstName": "Bob", "reports": []})).await;
    assert_eq!(doc["_embedded"], json!({"mco:people": []}));
    assert!(doc["_embedded"].get("mco:boss").is_none());
}

#[tokio::test]
async fn test_forced_single_element_array_with_nested_hooks() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(
            HalConfig::new()
                .prepare(PrepareHook::sync(|rep| {
                    rep.link("mco:boss", "http://www.whitehouse.gov");
                    Ok(())
                }))
                .embed(
                    "mco:foo",
                    EmbedSpec::new("foo", "/foo/{item.id}").collection(true).prepare(
                        PrepareHook::sync(|rep| {
                            rep.link("foo:bar", "http://www.foo.com");
                            Ok(())
                        }),
                    ),
                ),
        ))
        .unwrap();

    let doc = render(&engine, "/people/100", json!({"firstName": "Bob", "foo": {"id": 5678}})).await;
    assert_eq!(
        doc["_embedded"]["mco:foo"],
        json!([{
            "_links": {"self": {"href": "/foo/5678"}, "foo:bar": {"href": "http://www.foo.com"}},
            "id": 5678
        }])
    );
    assert_eq!(doc["_links"]["mco:boss"]["href"], "http://www.whitehouse.gov");
}

#[tokio::test]
async fn test_embed_href_from_function_is_flagged_templated() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/person/{id}").unwrap().id("person").hal(HalConfig::new().query("{?full}")))
        .unwrap();
    engine
        .route(RouteEntry::new("GET", "/people").unwrap().hal(HalConfig::new().embed(
            "mco:person",
            EmbedSpec::new(
                "items",
                LinkFn::sync(|rep, ctx| {
                    let id = ctx.item.map(|item| item["id"].clone()).unwrap_or_default();
                    Ok(rep.route("person", &json!({"id": id}))?.into())
                }),
            ),
        )))
        .unwrap();

    let doc = render(&engine, "/people", json!({"items": [{"id": 100}, {"id": 200}]})).await;
    assert_eq!(
        doc["_embedded"]["mco:person"][0]["_links"]["self"],
        json!({"href": "/person/100{?full}", "templated": true})
    );
    assert_eq!(doc["_embedded"]["mco:person"][1]["_links"]["self"]["href"], "/person/200{?full}");
}

#[tokio::test]
async fn test_nested_embedded_links_use_parent_scope() {
    let engine = mycompany_engine(Settings::default());
    let config = HalConfig::from_value(&json!({
        "embedded": {
            "mco:person": {
                "path": "team.members",
                "href": "/people/{item.id}",
                "links": {"mco:boss": "/people/{self.bossId}"},
                "embedded": {
                    "mco:boss": {"path": "manager", "href": "/people/{item.id}"}
                }
            }
        }
    }))
    .unwrap();
    engine.route(RouteEntry::new("GET", "/teams/{id}").unwrap().hal(config)).unwrap();

    let doc = render(
        &engine,
        "/teams/1",
        json!({"bossId": 9, "team": {"name": "core", "members": [{"id": 1, "manager": {"id": 9}}]}}),
    )
    .await;

    let member = &doc["_embedded"]["mco:person"][0];
    assert_eq!(member["_links"]["mco:boss"]["href"], "/people/9");
    assert_eq!(member["_embedded"]["mco:boss"]["_links"]["self"]["href"], "/people/9");
    assert!(member.get("manager").is_none());
    assert_eq!(doc["team"], json!({"name": "core"}));
    assert_eq!(doc["_links"]["curies"], json!([mco_curie()]));
}

#[tokio::test]
async fn test_embedded_prepare_failure_aborts_build() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().embed(
            "mco:boss",
            EmbedSpec::new("boss", "./boss").prepare(PrepareHook::sync(|_| anyhow::bail!("boss record is locked"))),
        )))
        .unwrap();
    let body = json!({"firstName": "Bob", "boss": {"firstName": "Boss"}});

    let err = engine.apply(&hal_request("/people/100"), Reply::json(body.clone())).await.unwrap_err();
    assert_eq!(
        err,
        HalError::PrepareFailure {
            stage: "embedded prepare".to_string(),
            message: "boss record is locked".to_string(),
        }
    );

    let reply = engine.handle(&hal_request("/people/100"), Reply::json(body)).await;
    assert_eq!(reply.status, 500);
    assert!(reply.body.get("_links").is_none());
    let message = reply.body["message"].as_str().unwrap();
    assert!(message.contains("embedded prepare"));
    assert!(message.contains("boss record is locked"));
}

#[tokio::test]
async fn test_one_failing_collection_entry_aborts_build() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people").unwrap().hal(HalConfig::new().embed(
            "mco:person",
            EmbedSpec::new("items", "./{item.id}").prepare(PrepareHook::new(|rep| {
                Box::pin(async move {
                    tokio::task::yield_now().await;
                    if rep.entity()["id"] == 200 {
                        anyhow::bail!("person 200 is locked");
                    }
                    rep.prop("checked", true);
                    Ok(())
                })
            })),
        )))
        .unwrap();

    let doc = render(&engine, "/people", json!({"items": [{"id": 100}, {"id": 300}]})).await;
    assert_eq!(doc["_embedded"]["mco:person"][1]["checked"], true);

    let err = engine
        .apply(
            &hal_request("/people"),
            Reply::json(json!({"items": [{"id": 100}, {"id": 200}, {"id": 300}]})),
        )
        .await
        .unwrap_err();
    match err {
        HalError::PrepareFailure { stage, message } => {
            assert_eq!(stage, "embedded prepare");
            assert_eq!(message, "person 200 is locked");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_embed_href_function_failure_aborts_build() {
    let engine = mycompany_engine(Settings::default());
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(HalConfig::new().embed(
            "mco:boss",
            EmbedSpec::new("boss", LinkFn::sync(|_, _| anyhow::bail!("no route for boss"))),
        )))
        .unwrap();

    let err = engine
        .apply(&hal_request("/people/100"), Reply::json(json!({"boss": {"id": 200}})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        HalError::PrepareFailure {
            stage: "link function".to_string(),
            message: "no route for boss".to_string(),
        }
    );
}
