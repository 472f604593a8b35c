//! Keypath module - Path representation and navigation for nested documents.
//!
//! Paths address slots in a values document by mixing map keys and list
//! indices, e.g. `microservice.env[0].name`.

mod navigate;
mod path;

pub use navigate::*;
pub use path::*;
