//! LSIF index generator core.
//!
//! Given a compiled view of a program — an ordered set of source files plus a
//! synchronous semantic oracle — the engine emits a linearized stream of LSIF
//! vertices and edges describing declarations, references, hover content and
//! cross-project monikers for every named entity.
//!
//! The interesting machinery lives in [`indexer`]: the traversal driver, the
//! per-(symbol, document) partitioning of ranges, the four symbol-data
//! variants, and the lifecycle manager that flushes each accumulator at
//! exactly the right node, document or project boundary.

pub mod emit;
pub mod error;
pub mod graph;
pub mod indexer;
pub mod logging;
pub mod model;
pub mod paths;
pub mod semantics;
pub mod symbols;

pub use emit::{Emitter, EmitterContext, JsonLineEmitter, MemoryEmitter};
pub use error::{LsifscopeError, Result};
pub use indexer::{visit_program, DependentProject, IndexerOptions, ProjectResult};
pub use model::builder::{Builder, IdGenerator, SequentialIds};
