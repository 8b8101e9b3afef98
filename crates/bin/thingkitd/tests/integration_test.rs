//! End-to-end tests for the full thingkitd stack.
//!
//! Most tests run the real binary, feed it JSON-lines requests on stdin and
//! read the responses from stdout. The last group wires the same components
//! in-process to check timing under a paused clock.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use thingkit_adapter_tank::{ChassisCommand, MotionVector, SimulatedChassis, TYPE_NAME};
use thingkit_app::hub::Hub;
use thingkit_app::registry::DeviceRegistry;
use thingkit_app::services::thing_manager::ThingManager;

/// Run `thingkitd` with `requests` on stdin (serial mode, default devices).
fn run_daemon(requests: &[Value], env: &[(&str, &str)]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_thingkitd"))
        .env("THINGKIT_CONFIG", "does-not-exist.toml")
        .env("THINGKIT_HUB_CONCURRENT", "false")
        .env("THINGKIT_LOG", "warn")
        .env_remove("RUST_LOG")
        .env_remove("THINGKIT_DEVICES")
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let mut stdin = child.stdin.take().unwrap();
        for request in requests {
            writeln!(stdin, "{request}").unwrap();
        }
    }
    child.wait_with_output().unwrap()
}

fn responses(output: &Output) -> Vec<Value> {
    String::from_utf8(output.stdout.clone())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[test]
fn should_list_tank_by_default() {
    let output = run_daemon(&[json!({"id": 1, "type": "list"})], &[]);
    assert!(output.status.success());
    assert_eq!(
        responses(&output),
        vec![json!({"id": 1, "status": "ok", "result": ["Tank"]})]
    );
}

#[test]
fn should_describe_tank_capabilities() {
    let output = run_daemon(&[json!({"type": "describe"})], &[]);
    let response = &responses(&output)[0];
    let tank = &response["result"][0];
    assert_eq!(tank["name"], "Tank");
    assert_eq!(tank["properties"].as_array().unwrap().len(), 4);

    let set_speed = tank["methods"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["name"] == "SetSpeed")
        .unwrap();
    assert_eq!(
        set_speed["parameters"][0],
        json!({
            "name": "speed",
            "description": "Integer between 1 and 100",
            "type": "number",
            "required": true,
            "integer": true,
            "min": 1.0,
            "max": 100.0
        })
    );
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

#[test]
fn should_report_power_after_turn_on() {
    let output = run_daemon(
        &[
            json!({"id": 1, "type": "invoke", "thing": "Tank", "method": "TurnOn"}),
            json!({"id": 2, "type": "read", "thing": "Tank", "property": "power"}),
        ],
        &[],
    );
    let responses = responses(&output);
    assert_eq!(responses[0]["status"], "ok");
    assert_eq!(responses[0]["result"]["method"], "TurnOn");
    assert_eq!(responses[1], json!({"id": 2, "status": "ok", "result": true}));
}

#[test]
fn should_reject_speed_out_of_range() {
    let output = run_daemon(
        &[
            json!({"id": 1, "type": "invoke", "thing": "Tank", "method": "SetSpeed", "parameters": {"speed": 150}}),
            json!({"id": 2, "type": "read", "thing": "Tank", "property": "speed"}),
        ],
        &[],
    );
    let responses = responses(&output);
    assert_eq!(responses[0]["status"], "error");
    assert_eq!(responses[0]["code"], "argument_range");
    assert_eq!(responses[1]["result"], 0.0);
}

#[test]
fn should_report_unknown_method() {
    let output = run_daemon(
        &[json!({"id": 7, "type": "invoke", "thing": "Tank", "method": "Fly"})],
        &[],
    );
    let response = &responses(&output)[0];
    assert_eq!(response["id"], 7);
    assert_eq!(response["code"], "method_not_found");
}

#[test]
fn should_omit_unchanged_things_from_delta_states() {
    let output = run_daemon(
        &[
            json!({"id": 1, "type": "states", "delta": true}),
            json!({"id": 2, "type": "states", "delta": true}),
            json!({"id": 3, "type": "invoke", "thing": "Tank", "method": "SetBrightness", "parameters": {"brightness": 60}}),
            json!({"id": 4, "type": "states", "delta": true}),
        ],
        &[],
    );
    let responses = responses(&output);
    assert_eq!(responses[0]["result"].as_array().unwrap().len(), 1);
    assert_eq!(responses[1]["result"], json!([]));
    assert_eq!(responses[3]["result"][0]["properties"]["brightness"], 60.0);
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[test]
fn should_fail_startup_for_unknown_device_type() {
    let output = run_daemon(&[], &[("THINGKIT_DEVICES", "Boat")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("device type not found: Boat"), "{stderr}");
}

#[test]
fn should_fail_startup_for_invalid_configuration() {
    let output = run_daemon(&[], &[("THINGKIT_HUB_CONCURRENT", "maybe")]);
    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// In-process timing
// ---------------------------------------------------------------------------

async fn hub(chassis: Arc<SimulatedChassis>) -> Hub<Arc<SimulatedChassis>> {
    let mut registry = DeviceRegistry::new();
    thingkit_adapter_tank::register(&mut registry).unwrap();
    let manager = ThingManager::new(chassis);
    manager.instantiate(&registry, TYPE_NAME).await.unwrap();
    Hub::new(Arc::new(manager))
}

#[tokio::test(start_paused = true)]
async fn should_stop_tank_600ms_after_go_left() {
    let chassis = Arc::new(SimulatedChassis::new());
    let hub = hub(Arc::clone(&chassis)).await;

    let response = hub
        .handle_json(r#"{"type": "invoke", "thing": "Tank", "method": "GoLeft"}"#)
        .await;
    assert!(response.contains(r#""status":"ok""#));

    assert_eq!(
        chassis.timeline(),
        vec![
            (Duration::ZERO, ChassisCommand::Start),
            (Duration::ZERO, ChassisCommand::Motion(MotionVector::LEFT)),
            (Duration::from_millis(600), ChassisCommand::Motion(MotionVector::STOP)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn should_queue_concurrent_invocations_on_the_tank() {
    let chassis = Arc::new(SimulatedChassis::new());
    let hub = hub(Arc::clone(&chassis)).await;

    let forward = tokio::spawn({
        let hub = hub.clone();
        async move {
            hub.handle_json(r#"{"type": "invoke", "thing": "Tank", "method": "GoForward"}"#)
                .await
        }
    });
    let light = tokio::spawn({
        let hub = hub.clone();
        async move {
            hub.handle_json(r#"{"type": "invoke", "thing": "Tank", "method": "TurnOn"}"#)
                .await
        }
    });
    forward.await.unwrap();
    light.await.unwrap();

    assert_eq!(
        chassis.timeline()[1..],
        [
            (Duration::ZERO, ChassisCommand::Motion(MotionVector::FORWARD)),
            (Duration::from_millis(500), ChassisCommand::Motion(MotionVector::STOP)),
            (Duration::from_millis(500), ChassisCommand::RgbLight(2)),
        ]
    );
}
