//! Memoized queries over the semantic oracle.
//!
//! All three queries are pure functions of the oracle state, so results are
//! held in bounded LRU caches. The caches cap memory on large programs; the
//! capacities are tuning parameters, not part of the contract.

use crate::model::protocol::SymbolKind;
use crate::semantics::{SemanticOracle, SymbolRef};
use lru::LruCache;
use std::num::NonZeroUsize;

const SYMBOL_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(2048) {
    Some(capacity) => capacity,
    None => panic!("capacity is non-zero"),
};

const MEMBER_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(capacity) => capacity,
    None => panic!("capacity is non-zero"),
};

pub struct Symbols {
    base_symbol_cache: LruCache<SymbolRef, Option<Vec<SymbolRef>>>,
    base_member_cache: LruCache<SymbolRef, LruCache<String, Vec<SymbolRef>>>,
    export_path_cache: LruCache<SymbolRef, Option<String>>,
}

impl Symbols {
    pub fn new() -> Self {
        Self {
            base_symbol_cache: LruCache::new(SYMBOL_CACHE_CAPACITY),
            base_member_cache: LruCache::new(SYMBOL_CACHE_CAPACITY),
            export_path_cache: LruCache::new(SYMBOL_CACHE_CAPACITY),
        }
    }

    /// Base symbols of a class or interface. Absent — not an empty list —
    /// when the symbol has no bases, no declarations, or is a type literal.
    pub fn base_symbols(
        &mut self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
    ) -> Option<Vec<SymbolRef>> {
        if let Some(cached) = self.base_symbol_cache.get(&sym) {
            return cached.clone();
        }
        let computed = compute_base_symbols(oracle, sym);
        self.base_symbol_cache.put(sym, computed.clone());
        computed
    }

    /// Members named `name` found by transitively walking the bases of `sym`.
    /// A base that declares the member stops the descent on that branch.
    /// Negative results are cached as empty lists but exposed as absent.
    pub fn find_base_members(
        &mut self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
        name: &str,
    ) -> Option<Vec<SymbolRef>> {
        if let Some(inner) = self.base_member_cache.get_mut(&sym) {
            if let Some(members) = inner.get(name) {
                return if members.is_empty() {
                    None
                } else {
                    Some(members.clone())
                };
            }
        }

        let bases = self.base_symbols(oracle, sym);
        let mut result = Vec::new();
        if let Some(bases) = bases {
            for base in bases {
                if let Some(member) = oracle.member(base, name) {
                    result.push(member);
                } else if let Some(found) = self.find_base_members(oracle, base, name) {
                    result.extend(found);
                }
            }
        }

        if !self.base_member_cache.contains(&sym) {
            self.base_member_cache
                .put(sym, LruCache::new(MEMBER_CACHE_CAPACITY));
        }
        if let Some(inner) = self.base_member_cache.get_mut(&sym) {
            inner.put(name.to_string(), result.clone());
        }

        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }

    /// Dotted export path rooted at the owning source-file module, or absent
    /// when the symbol is not exported. The not-exported result is cached too.
    pub fn export_path(
        &mut self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
    ) -> Option<String> {
        if let Some(cached) = self.export_path_cache.get(&sym) {
            return cached.clone();
        }
        let computed = self.compute_export_path(oracle, sym);
        self.export_path_cache.put(sym, computed.clone());
        computed
    }

    fn compute_export_path(
        &mut self,
        oracle: &dyn SemanticOracle,
        sym: SymbolRef,
    ) -> Option<String> {
        if oracle.symbol_kind(sym) == SymbolKind::SourceFile {
            return Some(String::new());
        }
        let parent = oracle.parent_symbol(sym)?;
        let parent_path = self.export_path(oracle, parent)?;
        let name = oracle.symbol_name(sym);
        let exported = matches!(
            oracle.symbol_kind(parent),
            SymbolKind::Class | SymbolKind::Interface
        ) || oracle.export_member(parent, &name) == Some(sym);
        if !exported {
            return None;
        }
        if parent_path.is_empty() {
            Some(name)
        } else {
            Some(format!("{parent_path}.{name}"))
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_base_symbols(oracle: &dyn SemanticOracle, sym: SymbolRef) -> Option<Vec<SymbolRef>> {
    match oracle.symbol_kind(sym) {
        SymbolKind::TypeLiteral => None,
        SymbolKind::Interface => {
            if oracle.declarations(sym).is_empty() {
                return None;
            }
            let ty = oracle.declared_type(sym)?;
            let bases: Vec<SymbolRef> = oracle
                .base_types(ty)
                .into_iter()
                .filter_map(|base| oracle.type_symbol(base))
                .collect();
            if bases.is_empty() {
                None
            } else {
                Some(bases)
            }
        }
        SymbolKind::Class => {
            let declarations = oracle.declarations(sym);
            if declarations.is_empty() {
                return None;
            }
            let mut bases = Vec::new();
            for decl in declarations {
                for base in oracle.heritage_symbols(decl) {
                    if !bases.contains(&base) {
                        bases.push(base);
                    }
                }
            }
            if bases.is_empty() {
                None
            } else {
                Some(bases)
            }
        }
        _ => None,
    }
}
