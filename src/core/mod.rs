//! Core reader primitives
//!
//! Building blocks for turning RPC reply bytes into tokens:
//! - Scanner: memchr-accelerated delimiter search
//! - Tokenizer: pull tokenizer over markup and text
//! - Entities: predefined and numeric reference decoding (Cow, zero-copy when possible)
//! - Attributes: attribute list parsing

pub mod attributes;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
