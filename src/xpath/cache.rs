//! Process-wide cache of compiled selectors
//!
//! View field selectors are fixed strings evaluated over and over, so each
//! one is compiled once and shared. LRU-bounded; see `EngineConfig`.

use super::compiler::{compile, CompiledExpr};
use crate::error::SelectorError;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock};

pub const DEFAULT_CAPACITY: usize = 256;

static CACHE: LazyLock<Mutex<LruCache<String, Arc<CompiledExpr>>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(capacity(DEFAULT_CAPACITY))));

fn capacity(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN)
}

/// Compiled form of `selector`, compiling on a miss
///
/// Failed compilations are not cached.
pub fn compiled(selector: &str) -> Result<Arc<CompiledExpr>, SelectorError> {
    if let Some(hit) = CACHE.lock().get(selector) {
        return Ok(Arc::clone(hit));
    }
    let expr = Arc::new(compile(selector).map_err(|msg| SelectorError::new(selector, msg))?);
    tracing::trace!(selector, ops = expr.ops.len(), "compiled selector");
    CACHE.lock().put(selector.to_string(), Arc::clone(&expr));
    Ok(expr)
}

/// Resize the cache; a capacity of 0 is treated as 1
pub fn set_capacity(n: usize) {
    CACHE.lock().resize(capacity(n));
}

pub fn capacity_now() -> usize {
    CACHE.lock().cap().get()
}

pub fn len() -> usize {
    CACHE.lock().len()
}

pub fn clear() {
    CACHE.lock().clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_selector_shares_compilation() {
        let a = compiled("route-engine/slot[1]").unwrap();
        let b = compiled("route-engine/slot[1]").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_errors_carry_selector() {
        let err = compiled("slot[").unwrap_err();
        assert_eq!(err.selector, "slot[");
        assert!(!err.message.is_empty());
    }
}
