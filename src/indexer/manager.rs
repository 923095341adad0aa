//! Global registry of project, document and symbol data.
//!
//! The manager owns every lifecycle: it begins documents on demand, retires
//! partitions when their trigger node is processed, and flushes the world in
//! the load-bearing order symbols → documents → project at the end of the
//! run. Document and symbol registries are tri-state: live, tombstone, or
//! absent.

use super::resolver::ResolverKind;
use super::symbol_data::{
    DefinitionInfo, DocumentRef, FlushTrigger, ReferenceTarget, SymbolContext, SymbolHandle,
    SymbolStore, SymbolVariant,
};
use super::{ProjectPaths, SemanticContext};
use crate::emit::EmitterContext;
use crate::error::Result;
use crate::model::protocol::{
    Diagnostic, EventKind, EventScope, FoldingRange, Id, MonikerKind, RangeBasedDocumentSymbol,
    Span, SymbolKind,
};
use crate::paths;
use crate::semantics::{NodeId, SemanticOracle, SymbolRef};
use std::collections::HashMap;
use tracing::debug;

/// Pending project `contains` links are flushed in batches to bound emission
/// latency.
const CONTAINS_BATCH: usize = 32;

pub struct ProjectData {
    project: Id,
    pending_documents: Vec<Id>,
}

impl ProjectData {
    fn begin(ctx: &mut EmitterContext, kind: &str) -> Result<Self> {
        let vertex = ctx.builder.project(kind);
        let project = ctx.vertex(vertex)?;
        let event = ctx.builder.event(EventKind::Begin, EventScope::Project, project);
        ctx.vertex(event)?;
        debug!(project, "begin project");
        Ok(Self {
            project,
            pending_documents: Vec::new(),
        })
    }

    fn add_document(&mut self, ctx: &mut EmitterContext, document: Id) -> Result<()> {
        self.pending_documents.push(document);
        if self.pending_documents.len() >= CONTAINS_BATCH {
            self.flush_pending(ctx)?;
        }
        Ok(())
    }

    fn flush_pending(&mut self, ctx: &mut EmitterContext) -> Result<()> {
        if self.pending_documents.is_empty() {
            return Ok(());
        }
        let documents = std::mem::take(&mut self.pending_documents);
        let edge = ctx.builder.contains(self.project, documents);
        ctx.edge(edge)
    }

    fn end(&mut self, ctx: &mut EmitterContext) -> Result<()> {
        self.flush_pending(ctx)?;
        let event = ctx
            .builder
            .event(EventKind::End, EventScope::Project, self.project);
        ctx.vertex(event)?;
        debug!(project = self.project, "end project");
        Ok(())
    }
}

/// Accumulated state of one document between its begin and end events.
pub struct DocumentData {
    document: Id,
    file_node: NodeId,
    moniker_path: Option<String>,
    external_library: bool,
    ranges: Vec<Id>,
    diagnostics: Vec<Diagnostic>,
    folding_ranges: Vec<FoldingRange>,
    document_symbols: Vec<RangeBasedDocumentSymbol>,
}

impl DocumentData {
    pub fn add_range(&mut self, range: Id) {
        self.ranges.push(range);
    }

    pub fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    pub fn set_folding_ranges(&mut self, folding_ranges: Vec<FoldingRange>) {
        self.folding_ranges = folding_ranges;
    }

    pub fn set_document_symbols(&mut self, symbols: Vec<RangeBasedDocumentSymbol>) {
        self.document_symbols = symbols;
    }

    /// Emits the accumulated results. The `contains` edge is guarded: a
    /// document without ranges emits none.
    fn end(&mut self, ctx: &mut EmitterContext) -> Result<()> {
        if !self.ranges.is_empty() {
            let edge = ctx
                .builder
                .contains(self.document, std::mem::take(&mut self.ranges));
            ctx.edge(edge)?;
        }
        if !self.diagnostics.is_empty() {
            let vertex = ctx
                .builder
                .diagnostic_result(std::mem::take(&mut self.diagnostics));
            let result = ctx.vertex(vertex)?;
            let edge = ctx.builder.diagnostic_edge(self.document, result);
            ctx.edge(edge)?;
        }
        if !self.folding_ranges.is_empty() {
            let vertex = ctx
                .builder
                .folding_range_result(std::mem::take(&mut self.folding_ranges));
            let result = ctx.vertex(vertex)?;
            let edge = ctx.builder.folding_range_edge(self.document, result);
            ctx.edge(edge)?;
        }
        if !self.document_symbols.is_empty() {
            let vertex = ctx
                .builder
                .document_symbol_result(std::mem::take(&mut self.document_symbols));
            let result = ctx.vertex(vertex)?;
            let edge = ctx.builder.document_symbol_edge(self.document, result);
            ctx.edge(edge)?;
        }
        Ok(())
    }
}

enum DocumentSlot {
    Live(DocumentData),
    Cleared,
}

struct LifecycleContext<'a> {
    documents: &'a HashMap<String, DocumentSlot>,
    clear_on_node: &'a mut HashMap<NodeId, Vec<SymbolHandle>>,
}

impl SymbolContext for LifecycleContext<'_> {
    fn document_ref(&self, file: &str) -> Option<DocumentRef> {
        match self.documents.get(file) {
            Some(DocumentSlot::Live(data)) => Some(DocumentRef {
                document: data.document,
                file_node: data.file_node,
            }),
            _ => None,
        }
    }

    fn manage_lifecycle(&mut self, node: NodeId, handle: SymbolHandle) {
        self.clear_on_node.entry(node).or_default().push(handle);
    }
}

pub struct DataManager {
    project: ProjectData,
    documents: HashMap<String, DocumentSlot>,
    store: SymbolStore,
    clear_on_node: HashMap<NodeId, Vec<SymbolHandle>>,
}

impl DataManager {
    pub fn begin(ctx: &mut EmitterContext, language: &str) -> Result<Self> {
        Ok(Self {
            project: ProjectData::begin(ctx, language)?,
            documents: HashMap::new(),
            store: SymbolStore::new(),
            clear_on_node: HashMap::new(),
        })
    }

    // ---- Documents ----

    pub fn get_or_create_document_data(
        &mut self,
        ctx: &mut EmitterContext,
        oracle: &dyn SemanticOracle,
        project_paths: &ProjectPaths,
        file_node: NodeId,
    ) -> Result<Id> {
        let name = oracle.file_name(file_node);
        match self.documents.get(&name) {
            Some(DocumentSlot::Live(data)) => return Ok(data.document),
            Some(DocumentSlot::Cleared) => {
                panic!("document data for `{name}` already cleared")
            }
            None => {}
        }

        let (moniker_path, external_library) = project_paths.moniker_path(&name);
        let contents = oracle.file_contents(file_node);
        let vertex = ctx
            .builder
            .document(paths::to_uri(&name), oracle.language_id(), contents);
        let document = ctx.vertex(vertex)?;
        let event = ctx
            .builder
            .event(EventKind::Begin, EventScope::Document, document);
        ctx.vertex(event)?;
        self.project.add_document(ctx, document)?;
        debug!(file = %name, document, "begin document");

        self.documents.insert(
            name,
            DocumentSlot::Live(DocumentData {
                document,
                file_node,
                moniker_path,
                external_library,
                ranges: Vec::new(),
                diagnostics: Vec::new(),
                folding_ranges: Vec::new(),
                document_symbols: Vec::new(),
            }),
        );
        Ok(document)
    }

    pub fn document_mut(&mut self, file: &str) -> &mut DocumentData {
        match self.documents.get_mut(file) {
            Some(DocumentSlot::Live(data)) => data,
            _ => panic!("no live document data for `{file}`"),
        }
    }

    // ---- Symbols ----

    pub(crate) fn get_or_create_symbol_data(
        &mut self,
        ctx: &mut EmitterContext,
        sem: &mut SemanticContext<'_>,
        sym: SymbolRef,
        location: Option<NodeId>,
    ) -> Result<SymbolHandle> {
        let symbol_id = sem.oracle.symbol_id(sym);
        if let Some(handle) = self.store.find(&symbol_id) {
            if !self.store.is_live(handle) {
                panic!("symbol data `{symbol_id}` already cleared");
            }
            return Ok(handle);
        }

        let kind = ResolverKind::select(sem.oracle, sym);
        let files = kind
            .source_files(sem.oracle, sym, location)
            .unwrap_or_default();
        if kind.requires_source_file() && files.is_empty() {
            panic!("symbol `{symbol_id}` has no declaring source file");
        }
        for file in &files {
            self.get_or_create_document_data(ctx, sem.oracle, sem.paths, *file)?;
        }

        let scope = sem.oracle.symbol_scope(sym);
        let variant = self.make_variant(ctx, sem, kind, sym, location, &files)?;

        let handle = {
            let Self {
                store,
                documents,
                clear_on_node,
                ..
            } = self;
            let mut life = LifecycleContext {
                documents,
                clear_on_node,
            };
            store.create(ctx, &mut life, symbol_id, scope, variant)?
        };

        self.attach_moniker(ctx, sem, handle, sym, &files)?;
        Ok(handle)
    }

    fn make_variant(
        &mut self,
        ctx: &mut EmitterContext,
        sem: &mut SemanticContext<'_>,
        kind: ResolverKind,
        sym: SymbolRef,
        location: Option<NodeId>,
        files: &[NodeId],
    ) -> Result<SymbolVariant> {
        match kind {
            ResolverKind::Standard => Ok(SymbolVariant::Standard),
            ResolverKind::TypeAlias => {
                let Some(target) = sem.oracle.alias_target(sym) else {
                    return Ok(SymbolVariant::Standard);
                };
                let target_handle = self.get_or_create_symbol_data(ctx, sem, target, None)?;
                let rename = sem.oracle.symbol_name(sym) != sem.oracle.symbol_name(target);
                Ok(SymbolVariant::Aliased {
                    target: target_handle,
                    rename,
                })
            }
            ResolverKind::Method => {
                let scope_file = kind.partition_scope(files);
                let source_file = sem.oracle.file_name(scope_file);
                let name = sem.oracle.symbol_name(sym);
                let base_members = sem
                    .oracle
                    .parent_symbol(sym)
                    .and_then(|container| sem.symbols.find_base_members(sem.oracle, container, &name));
                let bases = match base_members {
                    Some(members) if !members.is_empty() => {
                        let mut handles = Vec::with_capacity(members.len());
                        for member in members {
                            handles.push(self.get_or_create_symbol_data(ctx, sem, member, None)?);
                        }
                        Some(handles)
                    }
                    _ => None,
                };
                Ok(SymbolVariant::Method { source_file, bases })
            }
            ResolverKind::Transient => {
                let location = match location {
                    Some(location) => location,
                    None => panic!(
                        "transient symbol `{}` resolved without a location",
                        sem.oracle.symbol_id(sym)
                    ),
                };
                let parts = sem
                    .oracle
                    .type_at_location(sym, location)
                    .and_then(|ty| sem.oracle.union_or_intersection_parts(ty));
                let Some(parts) = parts else {
                    return Ok(SymbolVariant::Standard);
                };
                let mut element_symbols = Vec::with_capacity(parts.len());
                for part in parts {
                    match sem.oracle.type_symbol(part) {
                        Some(symbol) => element_symbols.push(symbol),
                        // Not every constituent carries a symbol; the
                        // composite then has no traversable elements.
                        None => return Ok(SymbolVariant::Standard),
                    }
                }
                if element_symbols.is_empty() {
                    return Ok(SymbolVariant::Standard);
                }
                let mut elements = Vec::with_capacity(element_symbols.len());
                for symbol in element_symbols {
                    elements.push(self.get_or_create_symbol_data(ctx, sem, symbol, None)?);
                }
                let source_file = sem.oracle.file_name(kind.partition_scope(files));
                Ok(SymbolVariant::UnionOrIntersection {
                    source_file,
                    elements,
                })
            }
        }
    }

    /// Derives the symbol's moniker from the moniker paths of its declaring
    /// documents; any disagreement between them means no moniker.
    fn attach_moniker(
        &mut self,
        ctx: &mut EmitterContext,
        sem: &mut SemanticContext<'_>,
        handle: SymbolHandle,
        sym: SymbolRef,
        files: &[NodeId],
    ) -> Result<()> {
        let Some(export_path) = sem.symbols.export_path(sem.oracle, sym) else {
            return Ok(());
        };
        if files.is_empty() {
            return Ok(());
        }

        let mut agreed: Option<Option<String>> = None;
        let mut external_library = false;
        for file in files {
            let name = sem.oracle.file_name(*file);
            let data = match self.documents.get(&name) {
                Some(DocumentSlot::Live(data)) => data,
                _ => return Ok(()),
            };
            match &agreed {
                None => agreed = Some(data.moniker_path.clone()),
                Some(previous) if *previous != data.moniker_path => return Ok(()),
                Some(_) => {}
            }
            external_library |= data.external_library;
        }
        let Some(Some(path)) = agreed else {
            return Ok(());
        };

        let identifier = if sem.oracle.symbol_kind(sym) == SymbolKind::SourceFile {
            path
        } else {
            format!("{path}.{export_path}")
        };
        let kind = if external_library {
            MonikerKind::Import
        } else {
            MonikerKind::Export
        };
        self.store.add_moniker(handle, ctx, kind, identifier)
    }

    // ---- Symbol operations, routed through the store ----

    pub fn add_definition(
        &mut self,
        ctx: &mut EmitterContext,
        handle: SymbolHandle,
        file: &str,
        range: Id,
        span: Span,
    ) -> Result<()> {
        let Self {
            store,
            documents,
            clear_on_node,
            ..
        } = self;
        let mut life = LifecycleContext {
            documents,
            clear_on_node,
        };
        store.add_definition(handle, ctx, &mut life, file, range, span)
    }

    pub fn add_reference(
        &mut self,
        ctx: &mut EmitterContext,
        handle: SymbolHandle,
        file: &str,
        target: ReferenceTarget,
    ) -> Result<()> {
        let Self {
            store,
            documents,
            clear_on_node,
            ..
        } = self;
        let mut life = LifecycleContext {
            documents,
            clear_on_node,
        };
        store.add_reference(handle, ctx, &mut life, file, target)
    }

    pub fn record_definition_info(&mut self, handle: SymbolHandle, info: DefinitionInfo) {
        self.store.record_definition_info(handle, info);
    }

    pub fn has_definition_info(&self, handle: SymbolHandle, file: &str, span: Span) -> bool {
        self.store.has_definition_info(handle, file, span)
    }

    pub fn find_definition(&self, handle: SymbolHandle, file: &str, span: Span) -> Option<Id> {
        self.store.find_definition(handle, file, span)
    }

    pub fn has_hover(&self, handle: SymbolHandle) -> bool {
        self.store.has_hover(handle)
    }

    pub fn add_hover(
        &mut self,
        ctx: &mut EmitterContext,
        handle: SymbolHandle,
        contents: String,
    ) -> Result<()> {
        self.store.add_hover(handle, ctx, contents)
    }

    // ---- Lifecycle triggers ----

    /// Consults the symbols registered on `node`; exhausted symbols are
    /// retired to tombstones.
    pub fn node_processed(&mut self, ctx: &mut EmitterContext, node: NodeId) -> Result<()> {
        let Some(handles) = self.clear_on_node.remove(&node) else {
            return Ok(());
        };
        for handle in handles {
            if !self.store.is_live(handle) {
                continue;
            }
            let exhausted = self
                .store
                .node_processed(handle, ctx, FlushTrigger::Scope(node))?;
            if exhausted {
                self.store.clear(handle);
            }
        }
        Ok(())
    }

    /// Flushes every partition registered on the file's node, then ends the
    /// document. Partitions go first: their `item` edges must land inside
    /// the document's begin/end bracket.
    pub fn document_processed(
        &mut self,
        ctx: &mut EmitterContext,
        file_node: NodeId,
        file: &str,
    ) -> Result<()> {
        if let Some(handles) = self.clear_on_node.remove(&file_node) {
            for handle in handles {
                if !self.store.is_live(handle) {
                    continue;
                }
                self.store
                    .node_processed(handle, ctx, FlushTrigger::SourceFile { file })?;
            }
        }

        match self.documents.get_mut(file) {
            Some(slot @ DocumentSlot::Live(_)) => {
                if let DocumentSlot::Live(mut data) = std::mem::replace(slot, DocumentSlot::Cleared)
                {
                    data.end(ctx)?;
                    let event = ctx
                        .builder
                        .event(EventKind::End, EventScope::Document, data.document);
                    ctx.vertex(event)?;
                    debug!(file = %file, "end document");
                }
            }
            _ => panic!("no live document data for `{file}`"),
        }
        Ok(())
    }

    /// End of the run: still-live symbols first, then still-live documents,
    /// then the project. Symbol partitions need live documents for their
    /// `contains` accounting, so the order is load-bearing.
    pub fn project_processed(&mut self, ctx: &mut EmitterContext) -> Result<()> {
        for handle in 0..self.store.len() {
            if self.store.is_live(handle) {
                self.store.end(handle, ctx)?;
                self.store.clear(handle);
            }
        }

        let mut remaining: Vec<String> = self
            .documents
            .iter()
            .filter_map(|(name, slot)| match slot {
                DocumentSlot::Live(_) => Some(name.clone()),
                DocumentSlot::Cleared => None,
            })
            .collect();
        remaining.sort();
        for name in remaining {
            let Some(slot) = self.documents.get_mut(&name) else {
                continue;
            };
            if let DocumentSlot::Live(mut data) = std::mem::replace(slot, DocumentSlot::Cleared) {
                data.end(ctx)?;
                let event = ctx
                    .builder
                    .event(EventKind::End, EventScope::Document, data.document);
                ctx.vertex(event)?;
            }
        }

        self.project.end(ctx)
    }
}
