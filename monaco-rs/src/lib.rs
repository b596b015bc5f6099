//! Monaco templating engine.
//!
//! Expands simulation input templates (netlists, command lines, parameter
//! decks) against a name → value environment.  See [`template`] for the
//! directive language.

pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod template;

pub use env::Environment;
pub use error::{Error, Result};
pub use template::{evaluate, Template, Value};
