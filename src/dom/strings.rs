//! String Interning Pool
//!
//! Deduplicated storage for element names, attribute names and values, and
//! text content. Everything is copied into one buffer so a document outlives
//! the reply bytes it was parsed from.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

#[derive(Debug, Default)]
pub struct StringPool {
    /// (offset, len) into `data`, indexed by string id
    entries: Vec<(u32, u32)>,
    data: String,
    /// Hash of string content -> ids with that hash
    hash_index: HashMap<u64, Vec<u32>>,
}

impl StringPool {
    pub fn new() -> Self {
        let mut pool = StringPool {
            entries: Vec::with_capacity(256),
            data: String::with_capacity(4096),
            hash_index: HashMap::new(),
        };
        // Entry 0 is reserved for "no string"
        pool.entries.push((0, 0));
        pool
    }

    #[inline]
    fn compute_hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a string, returning its id (0 for the empty string)
    pub fn intern(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }
        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            for &id in ids {
                if self.get(id) == s {
                    return id;
                }
            }
        }

        let offset = self.data.len() as u32;
        self.data.push_str(s);
        let id = self.entries.len() as u32;
        self.entries.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// Intern raw reply bytes; invalid UTF-8 is replaced
    pub fn intern_bytes(&mut self, s: &[u8]) -> u32 {
        self.intern(&String::from_utf8_lossy(s))
    }

    /// Resolve an id; unknown ids resolve to ""
    #[inline]
    pub fn get(&self, id: u32) -> &str {
        match self.entries.get(id as usize) {
            Some(&(offset, len)) => &self.data[offset as usize..(offset + len) as usize],
            None => "",
        }
    }

    /// Number of distinct strings (excluding the reserved entry)
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut pool = StringPool::new();
        let a = pool.intern("route-engine");
        let b = pool.intern("slot");
        let c = pool.intern("route-engine");
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(b), "slot");
    }

    #[test]
    fn test_empty_and_unknown() {
        let mut pool = StringPool::new();
        assert_eq!(pool.intern(""), 0);
        assert_eq!(pool.get(0), "");
        assert_eq!(pool.get(99), "");
        assert!(pool.is_empty());
    }

    #[test]
    fn test_lossy_bytes() {
        let mut pool = StringPool::new();
        let id = pool.intern_bytes(b"re\xff0");
        assert_eq!(pool.get(id), "re\u{fffd}0");
    }
}
