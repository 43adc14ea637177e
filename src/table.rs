//! Tables and devices
//!
//! A `Device` answers RPCs with reply documents. A `Table` turns a reply
//! into repeated items and tells each `View` how to name itself and how to
//! re-fetch its item. `RpcTable` is the stock table: one RPC, one item
//! selector, one view class.

use crate::dom::{NodeRef, XmlDocument};
use crate::error::{Result, ViewError};
use crate::view::{View, ViewClass};
use crate::xpath::Match;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// One remote procedure call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    pub name: String,
    pub args: IndexMap<String, String>,
}

impl RpcRequest {
    pub fn new(name: impl Into<String>) -> Self {
        RpcRequest {
            name: name.into(),
            args: IndexMap::new(),
        }
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }
}

/// A managed system that answers RPCs (blocking)
pub trait Device: Send + Sync {
    fn hostname(&self) -> &str;

    fn rpc(&self, request: &RpcRequest) -> Result<Arc<XmlDocument>>;
}

/// How a view derives its name from its node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSelector {
    /// The device hostname names every view
    None,
    /// First match of one selector
    Single(String),
    /// First match of each selector, in order
    Composite(Vec<String>),
}

/// Items are named by their `name` child
impl Default for NameSelector {
    fn default() -> Self {
        NameSelector::Single("name".to_string())
    }
}

impl NameSelector {
    pub fn single(selector: impl Into<String>) -> Self {
        NameSelector::Single(selector.into())
    }

    pub fn composite<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NameSelector::Composite(selectors.into_iter().map(Into::into).collect())
    }
}

/// A resolved view name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewName {
    Scalar(String),
    Composite(Vec<String>),
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewName::Scalar(name) => f.write_str(name),
            ViewName::Composite(parts) => write!(f, "({})", parts.join(", ")),
        }
    }
}

impl From<&str> for ViewName {
    fn from(name: &str) -> Self {
        ViewName::Scalar(name.to_string())
    }
}

/// The collaborator a `View` consults for naming and refresh
pub trait Table: Send + Sync {
    fn name_selector(&self) -> &NameSelector;

    /// Selector locating each item inside a reply
    fn iteration_selector(&self) -> &str;

    fn device(&self) -> Arc<dyn Device>;

    fn can_refresh(&self) -> bool {
        false
    }

    /// Reply scoped to a single item
    fn fetch_by_key(&self, _key: &ViewName) -> Result<Arc<XmlDocument>> {
        Err(ViewError::Capability("fetch by key"))
    }
}

/// Builds a nested table bound to a device and an already fetched node
pub type TableFactory = Arc<dyn Fn(Arc<dyn Device>, NodeRef) -> Arc<dyn Table> + Send + Sync>;

/// Static description of an `RpcTable`
#[derive(Debug, Clone)]
pub struct TableDef {
    pub rpc: String,
    pub args: IndexMap<String, String>,
    /// Argument that carries a view name when fetching one item
    pub args_key: Option<String>,
    pub item: String,
    pub key: NameSelector,
    pub view: Arc<ViewClass>,
    /// Give each view its own registry so it can take instance extensions
    pub private_views: bool,
}

impl TableDef {
    pub fn new(rpc: impl Into<String>, item: impl Into<String>, view: &Arc<ViewClass>) -> Self {
        TableDef {
            rpc: rpc.into(),
            args: IndexMap::new(),
            args_key: None,
            item: item.into(),
            key: NameSelector::default(),
            view: Arc::clone(view),
            private_views: false,
        }
    }

    pub fn key(mut self, key: NameSelector) -> Self {
        self.key = key;
        self
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn args_key(mut self, key: impl Into<String>) -> Self {
        self.args_key = Some(key.into());
        self
    }

    pub fn private_views(mut self) -> Self {
        self.private_views = true;
        self
    }
}

/// Table over the items of one RPC reply
pub struct RpcTable {
    def: TableDef,
    device: Arc<dyn Device>,
    /// Root of the fetched reply, or the node a nested table was bound to
    root: RwLock<Option<NodeRef>>,
}

impl RpcTable {
    /// Unfetched table; call `get` before reading items
    pub fn new(device: Arc<dyn Device>, def: TableDef) -> Arc<Self> {
        Arc::new(RpcTable {
            def,
            device,
            root: RwLock::new(None),
        })
    }

    /// Table over a node some other reply already delivered
    pub fn bound(device: Arc<dyn Device>, def: TableDef, node: NodeRef) -> Arc<Self> {
        Arc::new(RpcTable {
            def,
            device,
            root: RwLock::new(Some(node)),
        })
    }

    /// Nested-table factory for a field descriptor
    pub fn factory(def: TableDef) -> TableFactory {
        Arc::new(move |device: Arc<dyn Device>, node: NodeRef| -> Arc<dyn Table> {
            RpcTable::bound(device, def.clone(), node)
        })
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    fn request(&self) -> RpcRequest {
        RpcRequest {
            name: self.def.rpc.clone(),
            args: self.def.args.clone(),
        }
    }

    fn call(&self, request: &RpcRequest) -> Result<NodeRef> {
        let doc = self.device.rpc(request)?;
        NodeRef::root(doc).ok_or_else(|| ViewError::Rpc {
            rpc: request.name.clone(),
            reason: "reply has no root element".to_string(),
        })
    }

    /// Fetch the reply, replacing whatever the table held
    pub fn get(&self) -> Result<()> {
        let root = self.call(&self.request())?;
        tracing::debug!(
            rpc = %self.def.rpc,
            hostname = self.device.hostname(),
            "table fetched"
        );
        *self.root.write() = Some(root);
        Ok(())
    }

    /// Item nodes; empty before `get`
    pub fn items(&self) -> Result<Vec<NodeRef>> {
        let Some(root) = self.root.read().clone() else {
            return Ok(Vec::new());
        };
        Ok(root
            .select(&self.def.item)?
            .into_iter()
            .filter_map(|m| match m {
                Match::Node(node) if node.is_element() => Some(node),
                _ => None,
            })
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.items()?.is_empty())
    }

    /// One view per item, in reply order
    pub fn views(self: &Arc<Self>) -> Result<Vec<View>> {
        let table: Arc<dyn Table> = Arc::clone(self) as Arc<dyn Table>;
        self.items()?
            .into_iter()
            .map(|node| {
                if self.def.private_views {
                    View::new_private(&self.def.view, Arc::clone(&table), node)
                } else {
                    View::new(&self.def.view, Arc::clone(&table), node)
                }
            })
            .collect()
    }

    pub fn keys(self: &Arc<Self>) -> Result<Vec<ViewName>> {
        self.views()?.iter().map(View::name).collect()
    }

    /// First view whose name equals `key`
    pub fn view(self: &Arc<Self>, key: &ViewName) -> Result<Option<View>> {
        for view in self.views()? {
            if view.name()? == *key {
                return Ok(Some(view));
            }
        }
        Ok(None)
    }
}

impl Table for RpcTable {
    fn name_selector(&self) -> &NameSelector {
        &self.def.key
    }

    fn iteration_selector(&self) -> &str {
        &self.def.item
    }

    fn device(&self) -> Arc<dyn Device> {
        Arc::clone(&self.device)
    }

    fn can_refresh(&self) -> bool {
        self.def.args_key.is_some()
    }

    fn fetch_by_key(&self, key: &ViewName) -> Result<Arc<XmlDocument>> {
        let Some(args_key) = &self.def.args_key else {
            return Err(ViewError::Capability("fetch by key"));
        };
        // One args key carries one value
        let ViewName::Scalar(value) = key else {
            return Err(ViewError::Capability("fetch by composite key"));
        };
        let request = self.request().arg(args_key.clone(), value.clone());
        tracing::debug!(rpc = %request.name, key = %key, "fetching single item");
        self.device.rpc(&request)
    }
}

impl fmt::Debug for RpcTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcTable")
            .field("rpc", &self.def.rpc)
            .field("item", &self.def.item)
            .field("view", &self.def.view.name())
            .field("hostname", &self.device.hostname())
            .finish()
    }
}
