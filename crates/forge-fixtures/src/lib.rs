//! Test-fixture factory for Forge.
//!
//! Recipes are registered by name and run through a `Factory`, which keeps
//! nested invocations on a job pipeline and can lint the whole registry.

pub mod attributes;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod factory;
pub mod fixture;
pub mod hooks;
pub mod job;
pub mod lint;
pub mod registry;
pub mod resolver;
pub mod traits;

pub use attributes::*;
pub use config::*;
pub use diagnostics::*;
pub use errors::*;
pub use factory::*;
pub use fixture::*;
pub use hooks::{Callback, Lifecycle};
pub use job::*;
pub use lint::*;
pub use registry::*;
pub use resolver::*;
pub use traits::*;
