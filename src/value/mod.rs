//! Value module - In-memory representation of YAML/JSON documents.
//!
//! This module provides the document tree that migrations operate on.

mod value;

pub use value::*;
