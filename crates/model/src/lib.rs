//! # Variant Model
//!
//! Dependency resolution between configuration variants: which objects are
//! enabled given the current state of the objects they depend on, and who
//! must be re-examined when an upstream choice changes.
//!
//! ## Architecture
//!
//! ```text
//! PropertyStore (key/value configuration)
//!     │
//!     ├──> SlotTable          slot index -> dependee address
//!     ├──> RecordStore        name -> {depender, slots, logic, logging}
//!     │
//!     └──> DependencyModel::initialize
//!            ├─ VariantDependency per record (bind, compile, lock)
//!            ├─ dependers index  (dependee path -> depender paths)
//!            └─ InfluenceGraph   (petgraph, transitive propagation)
//! ```
//!
//! The model is bound to exactly one [`Scope`]: a whole repository of
//! registries (global addressing) or a single registry (local addressing).
//! Live activation state is read through the [`VariantRegistry`] /
//! [`VariantRepository`] traits at `evaluate()` time; the engine owns no
//! configuration state of its own.

mod dependency;
mod error;
mod graph;
mod logic;
mod model;
mod properties;
mod records;
mod scope;
mod slots;

#[cfg(test)]
pub(crate) mod testkit;

pub use dependency::VariantDependency;
pub use error::{ModelError, Result};
pub use graph::InfluenceGraph;
pub use logic::LogicExpr;
pub use model::DependencyModel;
pub use properties::{extract_logging, level_from_label, MemoryProperties, PropertyStore};
pub use records::{DependencyRecord, RecordStore};
pub use scope::{Scope, VariantRegistry, VariantRepository};
pub use slots::SlotTable;
