//! Named view types and their shared registries

use super::field::{FieldDescriptor, GroupDescriptor};
use super::registry::{Descriptors, Extension};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A named view type
///
/// Holds the registry shared by every view constructed in shared mode.
/// The registry is an immutable snapshot; extending the type publishes a
/// new one, which shared views pick up on their next read.
pub struct ViewClass {
    name: String,
    registry: RwLock<Arc<Descriptors>>,
}

impl ViewClass {
    pub fn builder(name: impl Into<String>) -> ViewClassBuilder {
        ViewClassBuilder {
            name: name.into(),
            descriptors: Descriptors::new(),
        }
    }

    /// Builder starting from `base`'s current registry
    pub fn derive(name: impl Into<String>, base: &ViewClass) -> ViewClassBuilder {
        ViewClassBuilder {
            name: name.into(),
            descriptors: (*base.descriptors()).clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current registry snapshot
    pub fn descriptors(&self) -> Arc<Descriptors> {
        Arc::clone(&self.registry.read())
    }

    /// Type-wide extension, merged once when `block` returns
    pub fn extend<F>(&self, block: F)
    where
        F: FnOnce(&mut Extension),
    {
        let mut more = Extension::default();
        block(&mut more);
        if more.is_empty() {
            return;
        }
        let mut registry = self.registry.write();
        let merged = registry.merged(more);
        *registry = Arc::new(merged);
        tracing::debug!(
            class = %self.name,
            fields = registry.len(),
            "type-wide extension merged"
        );
    }
}

impl fmt::Debug for ViewClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let descriptors = self.descriptors();
        f.debug_struct("ViewClass")
            .field("name", &self.name)
            .field("fields", &descriptors.field_names().collect::<Vec<_>>())
            .finish()
    }
}

pub struct ViewClassBuilder {
    name: String,
    descriptors: Descriptors,
}

impl ViewClassBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.descriptors.insert_field(field);
        self
    }

    pub fn group(mut self, name: impl Into<String>, selector: impl Into<String>) -> Self {
        self.descriptors.insert_group(GroupDescriptor::new(name, selector));
        self
    }

    pub fn build(self) -> Arc<ViewClass> {
        Arc::new(ViewClass {
            name: self.name,
            registry: RwLock::new(Arc::new(self.descriptors)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_copies_base() {
        let base = ViewClass::builder("Base")
            .field(FieldDescriptor::text("a", "./a"))
            .build();
        let derived = ViewClass::derive("Derived", &base)
            .field(FieldDescriptor::text("b", "./b"))
            .build();
        assert_eq!(derived.descriptors().field_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(base.descriptors().len(), 1);
    }

    #[test]
    fn test_extend_publishes_new_snapshot() {
        let class = ViewClass::builder("V").field(FieldDescriptor::text("a", "./a")).build();
        let before = class.descriptors();
        class.extend(|more| {
            more.field(FieldDescriptor::text("b", "./b"));
        });
        assert_eq!(before.len(), 1);
        assert_eq!(class.descriptors().len(), 2);
    }

    #[test]
    fn test_empty_extension_keeps_snapshot() {
        let class = ViewClass::builder("V").build();
        let before = class.descriptors();
        class.extend(|_| {});
        assert!(Arc::ptr_eq(&before, &class.descriptors()));
    }
}
