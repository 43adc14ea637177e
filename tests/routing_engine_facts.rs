mod common;

use common::{init_tracing, CannedDevice};
use proptest::prelude::*;
use rustyview::facts::routing_engines;
use rustyview::{Device, FactValue, Facts};
use std::sync::Arc;

fn reply(states: &[&str]) -> String {
    let engines: String = states
        .iter()
        .enumerate()
        .map(|(slot, state)| {
            format!(
                "<route-engine><slot>{slot}</slot><mastership-state>{state}</mastership-state>\
                 <status>OK</status><model>RE-S-2X00x6</model></route-engine>"
            )
        })
        .collect();
    format!("<route-engine-information>{engines}</route-engine-information>")
}

fn gather(states: &[&str]) -> Facts {
    init_tracing();
    let device: Arc<dyn Device> = Arc::new(
        CannedDevice::new("lab-mx1").with_reply("get-route-engine-information", reply(states)),
    );
    let mut facts = Facts::new();
    routing_engines(device, &mut facts).unwrap();
    facts
}

fn mastership<'a>(facts: &'a Facts, id: &str) -> Option<&'a str> {
    facts
        .get(id)?
        .as_map()?
        .get("mastership_state")
        .map(String::as_str)
}

#[test]
fn master_and_backup() {
    let facts = gather(&["master", "backup"]);
    assert_eq!(mastership(&facts, "RE0"), Some("master"));
    assert_eq!(mastership(&facts, "RE1"), Some("backup"));
    assert_eq!(facts.get("master"), Some(&FactValue::Text("RE0".to_string())));
}

#[test]
fn two_masters_become_a_list() {
    let facts = gather(&["master", "backup", "master"]);
    assert_eq!(
        facts.get("master"),
        Some(&FactValue::List(vec!["RE0".to_string(), "RE2".to_string()]))
    );
}

#[test]
fn fields_are_underscored() {
    let facts = gather(&["master"]);
    let engine = facts.get("RE0").and_then(FactValue::as_map).unwrap();
    let keys: Vec<&str> = engine.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["mastership_state", "status", "model"]);
}

#[test]
fn missing_rpc_is_an_error() {
    let device: Arc<dyn Device> = Arc::new(CannedDevice::new("lab-mx1"));
    let mut facts = Facts::new();
    assert!(routing_engines(device, &mut facts).is_err());
    assert!(facts.is_empty());
}

proptest! {
    #[test]
    fn master_aggregate_matches_states(masters in prop::collection::vec(any::<bool>(), 0..6)) {
        let states: Vec<&str> = masters.iter().map(|&m| if m { "master" } else { "backup" }).collect();
        let facts = gather(&states);
        let expected: Vec<String> = masters
            .iter()
            .enumerate()
            .filter(|(_, &m)| m)
            .map(|(slot, _)| format!("RE{}", slot))
            .collect();
        match expected.len() {
            0 => prop_assert!(!facts.contains_key("master")),
            1 => prop_assert_eq!(facts.get("master"), Some(&FactValue::Text(expected[0].clone()))),
            _ => prop_assert_eq!(facts.get("master"), Some(&FactValue::List(expected))),
        }
    }
}
