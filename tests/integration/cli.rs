use crate::common::TestProject;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;

const CONFIG: &str = r#"
[settings]
strict = true

[[namespaces]]
name = "mycompany"
prefix = "mco"
rels = ["boss", { name = "person", description = "A person" }, "people"]

[[routes]]
path = "/people"

[routes.hal]
name = "people"
query = "{?q*,start,limit}"
api = "mco:people"

[routes.hal.embedded."mco:person"]
path = "items"
href = "./{item.id}"

[[routes]]
path = "/people/{id}"
id = "person"

[routes.hal]
query = "{?full}"
api = "mco:person"
links = { "mco:boss" = { href = "../{bossId}", title = "Boss" } }
"#;

fn project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.write_config(CONFIG).unwrap();
    project
}

#[test]
fn test_render_person() {
    let project = project();
    project.write_file("person.json", r#"{"firstName": "Bob", "bossId": "1234"}"#).unwrap();

    let output = project.run_halform(&["render", "/people/100?full=true&x=1", "--body", "person.json"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(
        output.json(),
        json!({
            "_links": {
                "self": {"href": "/people/100?full=true"},
                "curies": [{"name": "mco", "href": "/rels/mycompany/{rel}", "templated": true}],
                "mco:boss": {"href": "/people/1234", "title": "Boss"}
            },
            "firstName": "Bob",
            "bossId": "1234"
        })
    );
}

#[test]
fn test_render_collection_with_host() {
    let project = project();
    project.write_file("people.json", r#"{"items": [{"id": 100}, {"id": 200}]}"#).unwrap();

    let output = project
        .run_halform(&["render", "http://localhost:9090/people?q=funny", "--body", "people.json", "--compact"])
        .unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    let doc = output.json();
    assert_eq!(doc["_links"]["self"]["href"], "/people?q=funny");
    assert_eq!(doc["_embedded"]["mco:person"][1]["_links"]["self"]["href"], "/people/200");
    assert_eq!(output.stdout.trim().lines().count(), 1);
}

#[test]
fn test_resolve_named_route() {
    let project = project();
    let output = project.run_halform(&["resolve", "person", "-p", "id=1234", "--query"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(output.stdout.trim(), "/people/1234{?full}");

    let output = project.run_halform(&["resolve", "person"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("Missing parameter 'id'"));
}

#[test]
fn test_api_root() {
    let project = project();
    let output = project.run_halform(&["api"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    let doc = output.json();
    assert_eq!(doc["_links"]["self"]["href"], "/api/");
    assert_eq!(doc["_links"]["mco:people"]["href"], "/people{?q*,start,limit}");
    assert_eq!(doc["_links"]["mco:person"]["href"], "/people/{id}");
}

#[test]
fn test_rels_json() {
    let project = project();
    let output = project.run_halform(&["rels", "--json"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert_eq!(
        output.json(),
        json!([{
            "name": "mycompany",
            "prefix": "mco",
            "rels": [
                {"name": "boss"},
                {"name": "person", "description": "A person"},
                {"name": "people"}
            ]
        }])
    );

    let output = project.run_halform(&["rels", "--namespace", "acme"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("acme"));
}

#[test]
fn test_rels_from_directory_namespace() {
    let project = TestProject::new().unwrap();
    project
        .write_file("rels/mycompany/boss.md", "---\ndescription: The person you report to\n---\nBosses.\n")
        .unwrap();
    project
        .write_config("[[namespaces]]\ndir = \"rels/mycompany\"\nprefix = \"mco\"\n")
        .unwrap();

    let output = project.run_halform(&["rels"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("mycompany (mco)"));
    assert!(output.stdout.contains("mco:boss  The person you report to"));

    let output = project.run_halform(&["doc", "mycompany", "boss"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("<h1>mco:boss</h1>"));
    assert!(output.stdout.contains("Bosses."));
}

#[test]
fn test_validate() {
    let project = project();
    let output = project.run_halform(&["validate"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stdout.contains("is valid (1 namespaces, 2 routes)"));

    project
        .write_config(
            r#"
[[namespaces]]
name = "mycompany"
prefix = "mco"

[[routes]]
path = "/people/{id}"

[routes.hal]
links = { "mco:boss" = "./boss" }
"#,
        )
        .unwrap();
    let output = project.run_halform(&["validate"]).unwrap();
    assert!(output.success, "stderr: {}", output.stderr);
    assert!(output.stderr.contains("mco:boss"));

    let output = project.run_halform(&["validate", "--strict"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("1 unresolved rel(s)"));
}

#[test]
fn test_invalid_namespace_field_reported() {
    let project = TestProject::new().unwrap();
    project.write_config("[[namespaces]]\nname = \"mycompany\"\nprefirx = \"mco\"\n").unwrap();

    let output = project.run_halform(&["validate"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("prefirx"));
}

#[test]
fn test_missing_config_file() {
    let project = TestProject::new().unwrap();
    let output = project.run_halform(&["rels"]).unwrap();
    assert!(!output.success);
    assert!(output.stderr.contains("halform.toml"));
}

#[test]
fn test_config_flag_and_env() {
    let project = project();
    let config = project.config_path();

    Command::cargo_bin("halform")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["--config", config.to_str().unwrap(), "resolve", "people"])
        .assert()
        .success()
        .stdout(predicate::str::diff("/people\n"));

    Command::cargo_bin("halform")
        .unwrap()
        .env("NO_COLOR", "1")
        .env("HALFORM_CONFIG", &config)
        .args(["validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid (1 namespaces, 2 routes)"));
}
