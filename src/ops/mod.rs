//! Ops module - Declarative key mutations and their executor.
//!
//! One [`Operation`] is one declared change against a values document;
//! [`apply`] carries out a single operation and reports its outcome.

mod executor;
mod operation;

pub use executor::*;
pub use operation::*;
