//! Unit tests for registry updates racing with document builds.

use std::sync::Arc;

use halform::config::Settings;
use halform::engine::{Reply, RequestInfo};
use halform::hal::HalConfig;
use halform::namespace::NamespaceSpec;
use halform::route::RouteEntry;
use halform::test_utils::mycompany_engine;
use serde_json::json;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn builds_see_a_consistent_registry_while_it_changes() {
    let engine = Arc::new(mycompany_engine(Settings::default()));
    engine
        .route(RouteEntry::new("GET", "/people/{id}").unwrap().hal(
            HalConfig::new().link("mco:boss", "./boss").link("acme:widget", "/widgets/1"),
        ))
        .unwrap();

    let writer = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            for _ in 0..50 {
                engine.registry().add(NamespaceSpec::named("acme", "acme")).unwrap();
                tokio::task::yield_now().await;
                assert!(engine.registry().remove("acme"));
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let engine = Arc::clone(&engine);
        readers.push(tokio::spawn(async move {
            for _ in 0..50 {
                let request = RequestInfo::get("/people/100").with_accept("application/hal+json");
                let reply = engine.apply(&request, Reply::json(json!({}))).await.unwrap();
                let curies = reply.body["_links"]["curies"].as_array().unwrap().clone();
                let names: Vec<&str> = curies.iter().filter_map(|c| c["name"].as_str()).collect();
                assert!(names == ["acme", "mco"] || names == ["mco"], "unexpected curies {names:?}");
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}
