//! Routing-engine facts
//!
//! One map per routing engine, keyed `RE<n>`, plus `master` naming the
//! engine(s) that report mastership.

use super::{FactValue, Facts};
use crate::error::{Result, ViewError};
use crate::table::{Device, NameSelector, RpcTable, TableDef};
use crate::view::{FieldDescriptor, View, ViewClass};
use indexmap::IndexMap;
use std::sync::Arc;

const RPC: &str = "get-route-engine-information";

/// Reply elements copied into each engine's map
const REPORTED: [&str; 5] = [
    "mastership-state",
    "status",
    "model",
    "up-time",
    "last-reboot-reason",
];

/// View type describing one `route-engine` element
pub fn route_engine_class() -> Arc<ViewClass> {
    let mut builder = ViewClass::builder("RouteEngineView")
        .field(FieldDescriptor::text("slot", "slot"))
        .field(FieldDescriptor::text(
            "re_name",
            "ancestor::multi-routing-engine-item/re-name",
        ));
    for element in REPORTED {
        builder = builder.field(FieldDescriptor::text(element.replace('-', "_"), element));
    }
    builder.build()
}

/// Text of a reported element; an element with no text is an empty fact
fn fact_text(view: &View, key: &str) -> Result<Option<String>> {
    match view.field::<String>(key) {
        Err(ViewError::FieldConversion { .. }) => Ok(Some(String::new())),
        other => other,
    }
}

/// `RE<n>` from the first digit of a multi-instance name, else the slot
fn engine_id(view: &View) -> Result<String> {
    if let Some(re_name) = fact_text(view, "re_name")? {
        if let Some(digit) = re_name.chars().find(char::is_ascii_digit) {
            return Ok(format!("RE{}", digit));
        }
    }
    match fact_text(view, "slot")? {
        Some(slot) if !slot.is_empty() => Ok(format!("RE{}", slot)),
        _ => Ok("RE0".to_string()),
    }
}

pub fn routing_engines(device: Arc<dyn Device>, facts: &mut Facts) -> Result<()> {
    let def = TableDef::new(RPC, ".//route-engine", &route_engine_class()).key(NameSelector::None);
    let table = RpcTable::new(Arc::clone(&device), def);
    table.get()?;

    let mut masters = Vec::new();
    for view in table.views()? {
        let id = engine_id(&view)?;
        let mut engine = IndexMap::new();
        for element in REPORTED {
            let key = element.replace('-', "_");
            if let Some(value) = fact_text(&view, &key)? {
                engine.insert(key, value);
            }
        }
        if engine.get("mastership_state").map(String::as_str) == Some("master") {
            masters.push(id.clone());
        }
        tracing::debug!(
            hostname = device.hostname(),
            engine = %id,
            fields = engine.len(),
            "routing engine collected"
        );
        facts.insert(id, FactValue::Map(engine));
    }

    match masters.len() {
        0 => {}
        1 => {
            facts.insert("master".to_string(), FactValue::Text(masters.remove(0)));
        }
        _ => {
            facts.insert("master".to_string(), FactValue::List(masters));
        }
    }
    Ok(())
}
