//! Views: typed, read-only projections of one reply element
//!
//! A `View` binds one element to the field registry of its `ViewClass` and
//! answers lookups by name. Each field descriptor carries a selector, an
//! optional group, and a kind: a scalar run through a converter, a boolean
//! presence test, or a nested table.
//!
//! ```ignore
//! let class = ViewClass::builder("PhyPortView")
//!     .group("mac_stats", "ethernet-mac-statistics")
//!     .field(FieldDescriptor::text("oper", "oper-status"))
//!     .field(FieldDescriptor::int("rx_bytes", "input-bytes").in_group("mac_stats"))
//!     .build();
//! let view = View::new(&class, table, node)?;
//! let rx: Option<i64> = view.field("rx_bytes")?;
//! ```

mod class;
mod field;
mod registry;
mod value;

pub use class::{ViewClass, ViewClassBuilder};
pub use field::{Converter, FieldDescriptor, FieldKind, GroupDescriptor};
pub use registry::{Descriptors, Extension};
pub use value::{FieldValue, FromFieldValue};

use crate::dom::NodeRef;
use crate::error::{Result, ViewError};
use crate::table::{Device, NameSelector, Table, ViewName};
use crate::xpath::{Match, Selection};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Where an extension block merges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendScope {
    /// The shared registry of the view's type
    Class,
    /// This view's private registry
    Instance,
}

#[derive(Clone)]
enum Registry {
    Shared,
    Private(Arc<Descriptors>),
}

pub struct View {
    class: Arc<ViewClass>,
    table: Arc<dyn Table>,
    node: NodeRef,
    /// Groups resolved at construction or refresh; `None` records a miss
    groups: HashMap<String, Option<NodeRef>>,
    registry: Registry,
}

impl View {
    /// View reading its type's shared registry
    pub fn new(class: &Arc<ViewClass>, table: Arc<dyn Table>, node: NodeRef) -> Result<Self> {
        View::bind(class, table, node, Registry::Shared)
    }

    /// View with its own registry, seeded from the type's current one
    pub fn new_private(class: &Arc<ViewClass>, table: Arc<dyn Table>, node: NodeRef) -> Result<Self> {
        let private = Registry::Private(class.descriptors());
        View::bind(class, table, node, private)
    }

    /// View over a selection that must hold exactly one element
    pub fn from_selection(
        class: &Arc<ViewClass>,
        table: Arc<dyn Table>,
        selection: Selection,
    ) -> Result<Self> {
        let count = selection.len();
        match selection.into_first() {
            Some(Match::Node(node)) if count == 1 => View::new(class, table, node),
            Some(Match::Text(_)) if count == 1 => Err(ViewError::Construction {
                found: "a text result".to_string(),
            }),
            _ => Err(ViewError::Construction {
                found: format!("{} matches", count),
            }),
        }
    }

    fn bind(
        class: &Arc<ViewClass>,
        table: Arc<dyn Table>,
        node: NodeRef,
        registry: Registry,
    ) -> Result<Self> {
        if !node.is_element() {
            return Err(ViewError::Construction {
                found: format!("a {:?} node", node.kind()),
            });
        }
        let mut view = View {
            class: Arc::clone(class),
            table,
            node,
            groups: HashMap::new(),
            registry,
        };
        view.resolve_groups()?;
        Ok(view)
    }

    /// Registry this view resolves through
    pub fn descriptors(&self) -> Arc<Descriptors> {
        match &self.registry {
            Registry::Shared => self.class.descriptors(),
            Registry::Private(descriptors) => Arc::clone(descriptors),
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self.registry, Registry::Private(_))
    }

    fn resolve_groups(&mut self) -> Result<()> {
        let descriptors = self.descriptors();
        let mut groups = HashMap::new();
        for group in descriptors.groups() {
            let root = first_element(self.node.select(&group.selector)?);
            if root.is_none() {
                tracing::debug!(
                    class = %self.class.name(),
                    group = %group.name,
                    selector = %group.selector,
                    "group absent"
                );
            }
            groups.insert(group.name.clone(), root);
        }
        self.groups = groups;
        Ok(())
    }

    /// Root of a group, resolving type-wide groups added after construction
    fn group_root(&self, descriptors: &Descriptors, name: &str) -> Result<Option<NodeRef>> {
        if let Some(cached) = self.groups.get(name) {
            return Ok(cached.clone());
        }
        match descriptors.group(name) {
            Some(group) => Ok(first_element(self.node.select(&group.selector)?)),
            None => Ok(None),
        }
    }

    fn resolve(&self, descriptors: &Descriptors, field: &FieldDescriptor) -> Result<FieldValue> {
        let converter = match &field.kind {
            FieldKind::NestedTable(factory) => {
                let table = (**factory)(self.device(), self.node.clone());
                return Ok(FieldValue::Table(table));
            }
            FieldKind::Scalar(converter) => Some(converter),
            FieldKind::Boolean => None,
        };

        let selection = match &field.group {
            None => self.node.select(&field.selector)?,
            Some(group) => match self.group_root(descriptors, group)? {
                Some(root) => root.select(&field.selector)?,
                None => return Ok(FieldValue::Absent),
            },
        };

        let Some(converter) = converter else {
            return Ok(FieldValue::Bool(!selection.is_empty()));
        };
        let Some(first) = selection.into_first() else {
            tracing::trace!(field = %field.name, selector = %field.selector, "no match");
            return Ok(FieldValue::Absent);
        };
        let Some(text) = first.text() else {
            return Err(ViewError::FieldConversion {
                field: field.name.clone(),
                raw: String::new(),
                target: converter.target().to_string(),
                reason: "matched element has no text".to_string(),
            });
        };
        let raw = text.trim();
        converter
            .convert(raw)
            .map_err(|reason| ViewError::FieldConversion {
                field: field.name.clone(),
                raw: raw.to_string(),
                target: converter.target().to_string(),
                reason,
            })
    }

    /// Resolve one field by name
    pub fn get_field(&self, name: &str) -> Result<FieldValue> {
        let descriptors = self.descriptors();
        let field = descriptors
            .field(name)
            .ok_or_else(|| ViewError::UnknownField(name.to_string()))?;
        let value = self.resolve(&descriptors, field)?;
        tracing::trace!(class = %self.class.name(), field = name, ?value, "field resolved");
        Ok(value)
    }

    /// Typed lookup; `None` when nothing matched
    pub fn field<T: FromFieldValue>(&self, name: &str) -> Result<Option<T>> {
        T::from_field_value(name, self.get_field(name)?)
    }

    /// Field names in registration order
    pub fn keys(&self) -> Vec<String> {
        self.descriptors().field_names().map(str::to_string).collect()
    }

    /// Field values in the order of `keys`
    pub fn values(&self) -> Result<Vec<FieldValue>> {
        let descriptors = self.descriptors();
        descriptors
            .fields()
            .map(|field| self.resolve(&descriptors, field))
            .collect()
    }

    pub fn items(&self) -> Result<Vec<(String, FieldValue)>> {
        let descriptors = self.descriptors();
        descriptors
            .fields()
            .map(|field| Ok((field.name.clone(), self.resolve(&descriptors, field)?)))
            .collect()
    }

    pub fn name(&self) -> Result<ViewName> {
        match self.table.name_selector() {
            NameSelector::None => Ok(ViewName::Scalar(self.device().hostname().to_string())),
            NameSelector::Single(selector) => Ok(ViewName::Scalar(self.first_text(selector)?)),
            NameSelector::Composite(selectors) => selectors
                .iter()
                .map(|selector| self.first_text(selector))
                .collect::<Result<Vec<_>>>()
                .map(ViewName::Composite),
        }
    }

    pub fn key(&self) -> Result<ViewName> {
        self.name()
    }

    fn first_text(&self, selector: &str) -> Result<String> {
        let first = self
            .node
            .select(selector)?
            .into_first()
            .ok_or_else(|| ViewError::NameNotFound {
                selector: selector.to_string(),
            })?;
        Ok(first.text().unwrap_or_default().trim().to_string())
    }

    /// The bound element
    pub fn xml(&self) -> &NodeRef {
        &self.node
    }

    pub fn table(&self) -> &Arc<dyn Table> {
        &self.table
    }

    pub fn device(&self) -> Arc<dyn Device> {
        self.table.device()
    }

    pub fn class(&self) -> &Arc<ViewClass> {
        &self.class
    }

    /// Same table and node seen through another type
    pub fn as_view(&self, class: &Arc<ViewClass>) -> Result<View> {
        View::new(class, Arc::clone(&self.table), self.node.clone())
    }

    /// Rebind to a freshly fetched copy of this item
    pub fn refresh(&mut self) -> Result<&mut Self> {
        if !self.table.can_refresh() {
            return Err(ViewError::Capability("refresh"));
        }
        let name = self.name()?;
        let doc = self.table.fetch_by_key(&name)?;
        let selector = self.table.iteration_selector();
        let node = NodeRef::root(doc)
            .map(|root| root.select(selector))
            .transpose()?
            .and_then(first_element)
            .ok_or_else(|| ViewError::RefreshNotFound {
                name: name.to_string(),
                selector: selector.to_string(),
            })?;
        self.node = node;
        self.resolve_groups()?;
        tracing::debug!(class = %self.class.name(), name = %name, "view refreshed");
        Ok(self)
    }

    /// Merge the registrations made in `block`
    ///
    /// Class scope changes every shared view of this type. Instance scope
    /// needs a view built with `new_private`.
    pub fn extend<F>(&mut self, scope: ExtendScope, block: F) -> Result<()>
    where
        F: FnOnce(&mut Extension),
    {
        match scope {
            ExtendScope::Class => {
                self.class.extend(block);
                if !self.is_private() {
                    self.resolve_groups()?;
                }
                Ok(())
            }
            ExtendScope::Instance => {
                let Registry::Private(current) = &self.registry else {
                    return Err(ViewError::SharedRegistry(self.class.name().to_string()));
                };
                let mut more = Extension::default();
                block(&mut more);
                let adds_groups = more.adds_groups();
                let merged = Arc::new(current.merged(more));
                tracing::debug!(
                    class = %self.class.name(),
                    fields = merged.len(),
                    "instance extension merged"
                );
                self.registry = Registry::Private(merged);
                if adds_groups {
                    self.resolve_groups()?;
                }
                Ok(())
            }
        }
    }
}

fn first_element(selection: Selection) -> Option<NodeRef> {
    match selection.into_first()? {
        Match::Node(node) if node.is_element() => Some(node),
        _ => None,
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Ok(name) => write!(f, "{}:{}", self.class.name(), name),
            Err(_) => write!(f, "{}:<unnamed>", self.class.name()),
        }
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("class", &self.class.name())
            .field("node", &self.node)
            .field("private", &self.is_private())
            .finish()
    }
}
