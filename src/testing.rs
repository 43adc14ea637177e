//! Canned-reply device for unit tests

use crate::dom::XmlDocument;
use crate::error::{Result, ViewError};
use crate::table::{Device, RpcRequest};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct FixtureDevice {
    hostname: String,
    replies: HashMap<String, String>,
    requests: Mutex<Vec<RpcRequest>>,
}

impl FixtureDevice {
    pub fn new(hostname: &str) -> Self {
        FixtureDevice {
            hostname: hostname.to_string(),
            replies: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(mut self, rpc: &str, xml: &str) -> Self {
        self.replies.insert(rpc.to_string(), xml.to_string());
        self
    }

    /// Requests seen so far, oldest first
    pub fn requests(&self) -> Vec<RpcRequest> {
        self.requests.lock().clone()
    }
}

impl Device for FixtureDevice {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn rpc(&self, request: &RpcRequest) -> Result<Arc<XmlDocument>> {
        self.requests.lock().push(request.clone());
        let xml = self.replies.get(&request.name).ok_or_else(|| ViewError::Rpc {
            rpc: request.name.clone(),
            reason: "no canned reply".to_string(),
        })?;
        Ok(Arc::new(XmlDocument::parse(xml)?))
    }
}
