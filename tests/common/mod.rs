#![allow(dead_code)]

use parking_lot::Mutex;
use rustyview::{Device, NodeRef, RpcRequest, RpcTable, Table, TableDef, ViewClass, ViewError, XmlDocument};
use std::collections::HashMap;
use std::sync::Arc;

/// Device answering from canned replies, keyed by RPC name
pub struct CannedDevice {
    hostname: String,
    replies: HashMap<String, String>,
    pub seen: Mutex<Vec<RpcRequest>>,
}

impl CannedDevice {
    pub fn new(hostname: &str) -> Self {
        CannedDevice {
            hostname: hostname.to_string(),
            replies: HashMap::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, rpc: &str, xml: impl Into<String>) -> Self {
        self.replies.insert(rpc.to_string(), xml.into());
        self
    }
}

impl Device for CannedDevice {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn rpc(&self, request: &RpcRequest) -> rustyview::Result<Arc<XmlDocument>> {
        self.seen.lock().push(request.clone());
        match self.replies.get(&request.name) {
            Some(xml) => Ok(Arc::new(XmlDocument::parse(xml)?)),
            None => Err(ViewError::Rpc {
                rpc: request.name.clone(),
                reason: "not scripted".to_string(),
            }),
        }
    }
}

/// Send crate logs to the test writer; filter with RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn root(xml: &str) -> NodeRef {
    let doc = XmlDocument::parse(xml).expect("fixture xml parses");
    NodeRef::root(Arc::new(doc)).expect("fixture has a root")
}

/// Table bound to `node` on a device named `hostname`
pub fn bound_table(hostname: &str, def: TableDef, node: &NodeRef) -> Arc<dyn Table> {
    let device: Arc<dyn Device> = Arc::new(CannedDevice::new(hostname));
    RpcTable::bound(device, def, node.clone())
}

pub fn def_for(class: &Arc<ViewClass>) -> TableDef {
    TableDef::new("get-items", "item", class)
}
