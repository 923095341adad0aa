//! Strategy selection for symbol data creation.
//!
//! Each strategy is keyed off a single property of the raw symbol and decides
//! which accumulator variant is built, which declaration nodes count, and
//! which source files the symbol is partitioned over. The set is closed.

use crate::model::protocol::SymbolKind;
use crate::semantics::{NodeId, SemanticOracle, SymbolRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolverKind {
    Standard,
    TypeAlias,
    Method,
    Transient,
}

impl ResolverKind {
    pub fn select(oracle: &dyn SemanticOracle, sym: SymbolRef) -> Self {
        match oracle.symbol_kind(sym) {
            SymbolKind::Alias => ResolverKind::TypeAlias,
            SymbolKind::Method => ResolverKind::Method,
            SymbolKind::Transient => ResolverKind::Transient,
            _ => ResolverKind::Standard,
        }
    }

    pub fn requires_source_file(&self) -> bool {
        matches!(self, ResolverKind::Method | ResolverKind::Transient)
    }

    /// Declaration nodes of the symbol; transients only exist at their use
    /// location.
    pub fn declaration_nodes(
        &self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
        location: Option<NodeId>,
    ) -> Option<Vec<NodeId>> {
        match self {
            ResolverKind::Transient => location.map(|node| vec![node]),
            _ => {
                let declarations = oracle.declarations(sym);
                if declarations.is_empty() {
                    None
                } else {
                    Some(declarations)
                }
            }
        }
    }

    /// Unique owning source files of the declaration nodes, in declaration
    /// order.
    pub fn source_files(
        &self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
        location: Option<NodeId>,
    ) -> Option<Vec<NodeId>> {
        match self {
            ResolverKind::Transient => {
                let location = match location {
                    Some(node) => node,
                    None => panic!(
                        "transient symbol `{}` resolved without a location",
                        oracle.symbol_id(sym)
                    ),
                };
                Some(vec![oracle.containing_file(location)])
            }
            _ => {
                let declarations = self.declaration_nodes(oracle, sym, location)?;
                let mut files = Vec::new();
                for declaration in declarations {
                    let file = oracle.containing_file(declaration);
                    if !files.contains(&file) {
                        files.push(file);
                    }
                }
                Some(files)
            }
        }
    }

    /// The emission file for multi-file symbols: the first declaring file,
    /// which keeps dumps stable across re-indexing runs.
    pub fn partition_scope(&self, files: &[NodeId]) -> NodeId {
        match files.first() {
            Some(file) => *file,
            None => panic!("symbol has no declaring source file"),
        }
    }
}
