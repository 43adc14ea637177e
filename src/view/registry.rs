//! Ordered field and group registries

use super::field::{FieldDescriptor, GroupDescriptor};
use indexmap::IndexMap;

/// Field and group descriptors in registration order
///
/// Registering a name again replaces its descriptor but keeps the slot it
/// first took, so enumeration order never shifts.
#[derive(Debug, Clone, Default)]
pub struct Descriptors {
    fields: IndexMap<String, FieldDescriptor>,
    groups: IndexMap<String, GroupDescriptor>,
}

impl Descriptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn group(&self, name: &str) -> Option<&GroupDescriptor> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupDescriptor> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn insert_field(&mut self, field: FieldDescriptor) {
        self.fields.insert(field.name.clone(), field);
    }

    pub(crate) fn insert_group(&mut self, group: GroupDescriptor) {
        self.groups.insert(group.name.clone(), group);
    }

    /// Copy with an extension applied
    pub fn merged(&self, extension: Extension) -> Descriptors {
        let mut out = self.clone();
        for group in extension.groups {
            out.insert_group(group);
        }
        for field in extension.fields {
            out.insert_field(field);
        }
        out
    }
}

/// Registrations collected inside one extension block
#[derive(Debug, Default)]
pub struct Extension {
    fields: Vec<FieldDescriptor>,
    groups: Vec<GroupDescriptor>,
}

impl Extension {
    pub fn field(&mut self, field: FieldDescriptor) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn group(&mut self, name: impl Into<String>, selector: impl Into<String>) -> &mut Self {
        self.groups.push(GroupDescriptor::new(name, selector));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }

    pub fn adds_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}
