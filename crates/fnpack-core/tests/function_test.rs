use fnpack_core::function::CONTAINER_STEP_PATH;
use fnpack_core::{Error, FunctionConfig, Runtime};
use proptest::prelude::*;
use serde_json::json;

fn parse(value: serde_json::Value) -> FunctionConfig {
    serde_json::from_value(value).unwrap()
}

fn single_step() -> FunctionConfig {
    parse(json!({
        "name": "Send welcome email",
        "id": "send-welcome-email",
        "triggers": [{ "event": "app/user.created" }],
        "steps": {
            "step": {
                "id": "step",
                "name": "Send welcome email",
                "path": "https://placeholder.com?fnId=send-welcome-email",
                "runtime": { "type": "http", "url": "https://placeholder.com" }
            }
        }
    }))
}

// ── Parsing ──

#[test]
fn parses_http_runtime() {
    let config = single_step();
    let step = &config.steps["step"];

    assert_eq!(
        step.runtime,
        Runtime::Http {
            url: Some("https://placeholder.com".to_owned())
        }
    );
    assert_eq!(step.extra["name"], "Send welcome email");
    assert_eq!(config.extra["id"], "send-welcome-email");
}

#[test]
fn unknown_runtime_type_is_accepted() {
    let config = parse(json!({
        "steps": { "step": { "path": "x", "runtime": { "type": "wasm", "module": "a.wasm" } } }
    }));

    assert_eq!(config.steps["step"].runtime, Runtime::Unknown);
}

#[test]
fn http_runtime_without_url_is_accepted() {
    let config = parse(json!({
        "steps": { "step": { "path": "x", "runtime": { "type": "http" } } }
    }));

    assert_eq!(config.steps["step"].runtime, Runtime::Http { url: None });
}

#[test]
fn malformed_step_fields_fall_back_to_defaults() {
    let config = parse(json!({
        "steps": {
            "step": { "id": "step", "path": 42, "runtime": "http" }
        }
    }));
    let step = &config.steps["step"];

    assert_eq!(step.path, "");
    assert_eq!(step.runtime, Runtime::Unknown);
    assert_eq!(step.extra["id"], "step");

    let rewritten = config.into_container("Dockerfile.inngest");
    assert_eq!(rewritten.steps["step"].runtime.type_tag(), "container");
}

#[test]
fn untagged_runtime_falls_back_to_unknown() {
    let config = parse(json!({
        "steps": { "step": { "path": "x", "runtime": { "url": "https://example.com" } } }
    }));
    assert_eq!(config.steps["step"].runtime, Runtime::Unknown);
}

#[test]
fn missing_runtime_defaults_to_unknown() {
    let config = parse(json!({ "steps": { "step": { "path": "x" } } }));
    assert_eq!(config.steps["step"].runtime, Runtime::Unknown);
}

// ── Step count ──

#[test]
fn single_step_id_returns_only_step() {
    assert_eq!(single_step().single_step_id().unwrap(), "step");
}

#[test]
fn multiple_steps_are_rejected() {
    let config = parse(json!({
        "steps": {
            "first": { "path": "a", "runtime": { "type": "http", "url": "u" } },
            "second": { "path": "b", "runtime": { "type": "http", "url": "u" } }
        }
    }));

    let err = config.single_step_id().unwrap_err();
    assert!(matches!(err, Error::UnsupportedStepFunctions { count: 2, .. }));
    assert!(err.to_string().contains("step functions are not yet supported"));
}

#[test]
fn empty_steps_are_rejected() {
    let config = parse(json!({ "steps": {} }));
    assert!(matches!(config.single_step_id(), Err(Error::NoSteps)));
}

// ── Rewrite ──

#[test]
fn into_container_rewrites_path_and_runtime() {
    let config = single_step().into_container("Dockerfile.inngest");
    let step = &config.steps["step"];

    assert_eq!(step.path, CONTAINER_STEP_PATH);
    assert_eq!(
        step.runtime,
        Runtime::Container {
            dockerfile: "./Dockerfile.inngest".to_owned()
        }
    );
    assert_eq!(step.runtime.type_tag(), "container");
}

#[test]
fn into_container_preserves_other_fields() {
    let config = single_step().into_container("Dockerfile.inngest");

    assert_eq!(config.extra["name"], "Send welcome email");
    assert_eq!(config.extra["triggers"][0]["event"], "app/user.created");
    assert_eq!(config.steps["step"].extra["id"], "step");
}

#[test]
fn rewritten_config_serializes_container_runtime() {
    let config = single_step().into_container("Dockerfile.inngest");
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(
        value["steps"]["step"]["runtime"],
        json!({ "type": "container", "dockerfile": "./Dockerfile.inngest" })
    );
    assert_eq!(value["steps"]["step"]["path"], "file://.");
    assert_eq!(value["id"], "send-welcome-email");
}

proptest! {
    #[test]
    fn rewritten_single_step_always_targets_dockerfile(
        step_id in "[a-z][a-z0-9-]{0,15}",
        dockerfile in "[A-Za-z][A-Za-z0-9._-]{0,20}",
    ) {
        let mut steps = serde_json::Map::new();
        steps.insert(
            step_id.clone(),
            json!({ "path": "p", "runtime": { "type": "http", "url": "u" } }),
        );
        let config = parse(json!({ "steps": steps })).into_container(&dockerfile);

        prop_assert_eq!(config.single_step_id().unwrap(), step_id.as_str());
        let step = config.steps.values().next().unwrap();
        prop_assert_eq!(step.runtime.type_tag(), "container");
        prop_assert_eq!(
            &step.runtime,
            &Runtime::Container { dockerfile: format!("./{dockerfile}") }
        );
    }
}
