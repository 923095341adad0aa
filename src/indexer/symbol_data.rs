//! Per-symbol accumulators and the store that owns them.
//!
//! A `SymbolData` is a tagged sum: a shared result-set header plus one of
//! four behaviors (standard, aliased, method, union-or-intersection). Cross
//! symbol linkage — aliases routing into their target, methods into their
//! bases, union members into their elements — goes through handles into the
//! owning [`SymbolStore`], never through direct references, so the store
//! stays the single owner of every accumulator.

use super::partition::SymbolDataPartition;
use crate::emit::EmitterContext;
use crate::error::Result;
use crate::model::protocol::{Id, ItemProperty, MonikerKind, Span};
use crate::semantics::{NodeId, SymbolId};
use std::collections::HashMap;
use tracing::debug;

pub type SymbolHandle = usize;

pub const MONIKER_SCHEME: &str = "tsc";

/// The narrow view of the data manager a symbol needs while it is alive:
/// document lookup for partition creation and lifecycle registration.
pub(crate) trait SymbolContext {
    fn document_ref(&self, file: &str) -> Option<DocumentRef>;
    fn manage_lifecycle(&mut self, node: NodeId, handle: SymbolHandle);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentRef {
    pub document: Id,
    pub file_node: NodeId,
}

/// Shared header of every variant: the result-set vertex and the lazily
/// created definition/reference results hanging off it.
pub struct ResultSetHeader {
    symbol_id: SymbolId,
    result_set: Id,
    definition_result: Option<Id>,
    reference_result: Option<Id>,
    owns_reference_result: bool,
}

impl ResultSetHeader {
    fn new(symbol_id: SymbolId, result_set: Id, owns_reference_result: bool) -> Self {
        Self {
            symbol_id,
            result_set,
            definition_result: None,
            reference_result: None,
            owns_reference_result,
        }
    }

    pub fn result_set(&self) -> Id {
        self.result_set
    }

    pub(crate) fn get_or_create_definition_result(
        &mut self,
        ctx: &mut EmitterContext,
    ) -> Result<Id> {
        if let Some(id) = self.definition_result {
            return Ok(id);
        }
        let vertex = ctx.builder.definition_result();
        let id = ctx.vertex(vertex)?;
        let edge = ctx.builder.definition_edge(self.result_set, id);
        ctx.edge(edge)?;
        self.definition_result = Some(id);
        Ok(id)
    }

    pub(crate) fn get_or_create_reference_result(
        &mut self,
        ctx: &mut EmitterContext,
    ) -> Result<Id> {
        if !self.owns_reference_result {
            panic!(
                "reference result requested on aliased symbol `{}`",
                self.symbol_id
            );
        }
        if let Some(id) = self.reference_result {
            return Ok(id);
        }
        let vertex = ctx.builder.reference_result();
        let id = ctx.vertex(vertex)?;
        let edge = ctx.builder.references_edge(self.result_set, id);
        ctx.edge(edge)?;
        self.reference_result = Some(id);
        Ok(id)
    }
}

/// Where a definition range has already been recorded for a symbol; lets an
/// identifier sitting on its own declaration name skip reference emission.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionInfo {
    pub file: String,
    pub span: Span,
}

enum DeclarationMemory {
    None,
    One(DefinitionInfo),
    Many(Vec<DefinitionInfo>),
}

impl DeclarationMemory {
    fn record(&mut self, info: DefinitionInfo) {
        match self {
            DeclarationMemory::None => *self = DeclarationMemory::One(info),
            DeclarationMemory::One(existing) => {
                *self = DeclarationMemory::Many(vec![existing.clone(), info]);
            }
            DeclarationMemory::Many(list) => list.push(info),
        }
    }

    fn contains(&self, file: &str, span: Span) -> bool {
        match self {
            DeclarationMemory::None => false,
            DeclarationMemory::One(info) => info.file == file && info.span == span,
            DeclarationMemory::Many(list) => {
                list.iter().any(|info| info.file == file && info.span == span)
            }
        }
    }
}

/// A flushed partition slot stays behind as a tombstone; reopening one is a
/// programming error, unlike creating a partition that never existed.
enum PartitionSlot {
    Live(SymbolDataPartition),
    Cleared,
}

enum Partitions {
    Map(HashMap<String, PartitionSlot>),
    Cleared,
}

pub enum SymbolVariant {
    Standard,
    Aliased {
        target: SymbolHandle,
        rename: bool,
    },
    Method {
        source_file: String,
        bases: Option<Vec<SymbolHandle>>,
    },
    UnionOrIntersection {
        source_file: String,
        elements: Vec<SymbolHandle>,
    },
}

pub struct SymbolData {
    header: ResultSetHeader,
    declarations: DeclarationMemory,
    partitions: Partitions,
    scope: Option<NodeId>,
    has_hover: bool,
    variant: SymbolVariant,
}

/// What to flush when a node's `processed` event consults a symbol.
pub(crate) enum FlushTrigger<'a> {
    /// The symbol's recorded scope ended; the symbol is exhausted.
    Scope(NodeId),
    /// A source file ended; only that file's partition is flushed.
    SourceFile { file: &'a str },
}

/// A reference being filed for a symbol: either a range in the current
/// document or an already emitted reference result to link.
pub enum ReferenceTarget {
    Range { id: Id, property: ItemProperty },
    Result(Id),
}

enum SymbolSlot {
    Live(SymbolData),
    Cleared(SymbolId),
}

#[derive(Default)]
pub struct SymbolStore {
    entries: Vec<SymbolSlot>,
    by_id: HashMap<SymbolId, SymbolHandle>,
}

enum DefinitionPlan {
    Standard { record_as_reference: bool },
    Alias { target: SymbolHandle },
    Method { bases: Option<Vec<SymbolHandle>> },
    Skip,
}

enum ReferencePlan {
    Local,
    Forward(Vec<SymbolHandle>),
}

impl SymbolStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<SymbolHandle> {
        self.by_id.get(id).copied()
    }

    pub fn is_live(&self, handle: SymbolHandle) -> bool {
        matches!(self.entries[handle], SymbolSlot::Live(_))
    }

    fn data(&self, handle: SymbolHandle) -> &SymbolData {
        match &self.entries[handle] {
            SymbolSlot::Live(data) => data,
            SymbolSlot::Cleared(id) => panic!("symbol data `{id}` already cleared"),
        }
    }

    fn data_mut(&mut self, handle: SymbolHandle) -> &mut SymbolData {
        match &mut self.entries[handle] {
            SymbolSlot::Live(data) => data,
            SymbolSlot::Cleared(id) => panic!("symbol data `{id}` already cleared"),
        }
    }

    pub fn result_set(&self, handle: SymbolHandle) -> Id {
        self.data(handle).header.result_set
    }

    pub fn has_hover(&self, handle: SymbolHandle) -> bool {
        self.data(handle).has_hover
    }

    /// Creates the symbol data, emits its result set and runs the variant's
    /// begin behavior.
    pub(crate) fn create(
        &mut self,
        ctx: &mut EmitterContext,
        life: &mut dyn SymbolContext,
        symbol_id: SymbolId,
        scope: Option<NodeId>,
        variant: SymbolVariant,
    ) -> Result<SymbolHandle> {
        let vertex = ctx.builder.result_set();
        let result_set = ctx.vertex(vertex)?;
        let owns_reference_result = !matches!(variant, SymbolVariant::Aliased { .. });

        let data = SymbolData {
            header: ResultSetHeader::new(symbol_id.clone(), result_set, owns_reference_result),
            declarations: DeclarationMemory::None,
            partitions: Partitions::Map(HashMap::new()),
            scope,
            has_hover: false,
            variant,
        };
        let handle = self.entries.len();
        self.entries.push(SymbolSlot::Live(data));
        self.by_id.insert(symbol_id, handle);

        enum BeginWork {
            None,
            AliasNext { target: SymbolHandle },
            LinkReferenceResults { file: String, linked: Vec<SymbolHandle> },
        }

        let begin = match &self.data(handle).variant {
            SymbolVariant::Standard | SymbolVariant::Method { bases: None, .. } => BeginWork::None,
            SymbolVariant::Aliased { target, .. } => BeginWork::AliasNext { target: *target },
            SymbolVariant::Method {
                source_file,
                bases: Some(bases),
            } => BeginWork::LinkReferenceResults {
                file: source_file.clone(),
                linked: bases.clone(),
            },
            SymbolVariant::UnionOrIntersection {
                source_file,
                elements,
            } => BeginWork::LinkReferenceResults {
                file: source_file.clone(),
                linked: elements.clone(),
            },
        };

        match begin {
            BeginWork::None => {}
            BeginWork::AliasNext { target } => {
                // Queries on the alias traverse transparently to the target.
                let target_result_set = self.data(target).header.result_set;
                let edge = ctx.builder.next(result_set, target_result_set);
                ctx.edge(edge)?;
            }
            BeginWork::LinkReferenceResults { file, linked } => {
                for other in linked {
                    let reference_result = self.reference_result_of(other, ctx)?;
                    self.get_or_create_partition(life, handle, &file)
                        .add_reference_result(reference_result);
                }
            }
        }

        Ok(handle)
    }

    fn reference_result_of(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
    ) -> Result<Id> {
        self.data_mut(handle)
            .header
            .get_or_create_reference_result(ctx)
    }

    fn get_or_create_partition<'s>(
        &'s mut self,
        life: &mut dyn SymbolContext,
        handle: SymbolHandle,
        file: &str,
    ) -> &'s mut SymbolDataPartition {
        let scope = self.data(handle).scope;
        let data = self.data_mut(handle);
        let map = match &mut data.partitions {
            Partitions::Map(map) => map,
            Partitions::Cleared => {
                panic!("symbol data `{}` already cleared", data.header.symbol_id)
            }
        };
        if !map.contains_key(file) {
            let doc = life
                .document_ref(file)
                .unwrap_or_else(|| panic!("no document data for `{file}`"));
            life.manage_lifecycle(scope.unwrap_or(doc.file_node), handle);
            let partition = SymbolDataPartition::new(doc.document);
            partition.begin();
            map.insert(file.to_string(), PartitionSlot::Live(partition));
        }
        match map.get_mut(file) {
            Some(PartitionSlot::Live(partition)) => partition,
            Some(PartitionSlot::Cleared) => panic!(
                "partition for `{file}` of symbol `{}` already flushed",
                data.header.symbol_id
            ),
            None => unreachable!("partition was just inserted"),
        }
    }

    fn push_range_to_partition(
        &mut self,
        life: &mut dyn SymbolContext,
        handle: SymbolHandle,
        file: &str,
        range: Id,
        property: ItemProperty,
    ) {
        self.get_or_create_partition(life, handle, file)
            .add_reference_range(range, property);
    }

    fn push_result_to_partition(
        &mut self,
        life: &mut dyn SymbolContext,
        handle: SymbolHandle,
        file: &str,
        result: Id,
    ) {
        self.get_or_create_partition(life, handle, file)
            .add_reference_result(result);
    }

    pub(crate) fn add_definition(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
        life: &mut dyn SymbolContext,
        file: &str,
        range: Id,
        span: Span,
    ) -> Result<()> {
        let plan = match &self.data(handle).variant {
            SymbolVariant::Standard => DefinitionPlan::Standard {
                record_as_reference: true,
            },
            SymbolVariant::Aliased { target, rename } => {
                if *rename {
                    // The alias has its own identity; references still route
                    // to the target, so the range is not filed as one here.
                    DefinitionPlan::Standard {
                        record_as_reference: false,
                    }
                } else {
                    DefinitionPlan::Alias { target: *target }
                }
            }
            SymbolVariant::Method { bases, .. } => DefinitionPlan::Method {
                bases: bases.clone(),
            },
            SymbolVariant::UnionOrIntersection { .. } => DefinitionPlan::Skip,
        };

        if matches!(plan, DefinitionPlan::Skip) {
            return Ok(());
        }

        let result_set = self.data(handle).header.result_set;
        let edge = ctx.builder.next(range, result_set);
        ctx.edge(edge)?;

        match plan {
            DefinitionPlan::Standard {
                record_as_reference,
            } => {
                self.get_or_create_partition(life, handle, file)
                    .add_definition(range, span, record_as_reference);
            }
            DefinitionPlan::Alias { target } => {
                self.push_range_to_partition(life, target, file, range, ItemProperty::References);
            }
            DefinitionPlan::Method { bases } => {
                self.get_or_create_partition(life, handle, file).add_definition(
                    range,
                    span,
                    bases.is_none(),
                );
                if let Some(bases) = bases {
                    for base in bases {
                        self.push_range_to_partition(
                            life,
                            base,
                            file,
                            range,
                            ItemProperty::Definitions,
                        );
                    }
                }
            }
            DefinitionPlan::Skip => unreachable!(),
        }
        Ok(())
    }

    pub(crate) fn add_reference(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
        life: &mut dyn SymbolContext,
        file: &str,
        target: ReferenceTarget,
    ) -> Result<()> {
        let plan = match &self.data(handle).variant {
            SymbolVariant::Standard
            | SymbolVariant::Method { bases: None, .. } => ReferencePlan::Local,
            SymbolVariant::Aliased { target, .. } => ReferencePlan::Forward(vec![*target]),
            SymbolVariant::Method {
                bases: Some(bases), ..
            } => ReferencePlan::Forward(bases.clone()),
            SymbolVariant::UnionOrIntersection { elements, .. } => {
                ReferencePlan::Forward(elements.clone())
            }
        };

        if let ReferenceTarget::Range { id, .. } = &target {
            let result_set = self.data(handle).header.result_set;
            let edge = ctx.builder.next(*id, result_set);
            ctx.edge(edge)?;
        }

        match plan {
            ReferencePlan::Local => match target {
                ReferenceTarget::Range { id, property } => {
                    self.push_range_to_partition(life, handle, file, id, property);
                }
                ReferenceTarget::Result(result) => {
                    self.push_result_to_partition(life, handle, file, result);
                }
            },
            ReferencePlan::Forward(handles) => {
                for forward in handles {
                    match &target {
                        ReferenceTarget::Range { id, property } => {
                            self.push_range_to_partition(life, forward, file, *id, *property);
                        }
                        ReferenceTarget::Result(result) => {
                            self.push_result_to_partition(life, forward, file, *result);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub(crate) fn record_definition_info(&mut self, handle: SymbolHandle, info: DefinitionInfo) {
        let data = self.data_mut(handle);
        if matches!(data.variant, SymbolVariant::UnionOrIntersection { .. }) {
            // Definitions of transient union and intersection pseudo-symbols
            // carry no meaning.
            return;
        }
        data.declarations.record(info);
    }

    pub fn has_definition_info(&self, handle: SymbolHandle, file: &str, span: Span) -> bool {
        self.data(handle).declarations.contains(file, span)
    }

    /// The definition range recorded for `span`, consulting the alias target
    /// for non-renaming aliases.
    pub fn find_definition(&self, handle: SymbolHandle, file: &str, span: Span) -> Option<Id> {
        let data = self.data(handle);
        if let SymbolVariant::Aliased {
            target,
            rename: false,
        } = &data.variant
        {
            return self.find_definition(*target, file, span);
        }
        match &data.partitions {
            Partitions::Map(map) => match map.get(file) {
                Some(PartitionSlot::Live(partition)) => partition.find_definition(span),
                _ => None,
            },
            Partitions::Cleared => None,
        }
    }

    pub(crate) fn add_hover(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
        contents: String,
    ) -> Result<()> {
        let result_set = self.data(handle).header.result_set;
        let vertex = ctx.builder.hover_result(contents);
        let hover = ctx.vertex(vertex)?;
        let edge = ctx.builder.hover_edge(result_set, hover);
        ctx.edge(edge)?;
        self.data_mut(handle).has_hover = true;
        Ok(())
    }

    pub(crate) fn add_moniker(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
        kind: MonikerKind,
        identifier: String,
    ) -> Result<()> {
        let result_set = self.data(handle).header.result_set;
        let vertex = ctx.builder.moniker(MONIKER_SCHEME, identifier, kind);
        let moniker = ctx.vertex(vertex)?;
        let edge = ctx.builder.moniker_edge(result_set, moniker);
        ctx.edge(edge)?;
        Ok(())
    }

    /// Reacts to a node's `processed` event. Returns `true` when the symbol
    /// itself is exhausted and must be retired by the caller.
    pub(crate) fn node_processed(
        &mut self,
        handle: SymbolHandle,
        ctx: &mut EmitterContext,
        trigger: FlushTrigger,
    ) -> Result<bool> {
        let SymbolData {
            header,
            partitions,
            scope,
            ..
        } = self.data_mut(handle);
        match trigger {
            FlushTrigger::Scope(node) => {
                if *scope != Some(node) {
                    panic!(
                        "node is neither the scope of symbol `{}` nor a source file",
                        header.symbol_id
                    );
                }
                let retired = std::mem::replace(partitions, Partitions::Cleared);
                if let Partitions::Map(map) = retired {
                    for (_, slot) in map {
                        if let PartitionSlot::Live(partition) = slot {
                            partition.end(ctx, header)?;
                        }
                    }
                }
                debug!(symbol = %header.symbol_id, "scope ended, symbol retired");
                Ok(true)
            }
            FlushTrigger::SourceFile { file } => {
                let map = match partitions {
                    Partitions::Map(map) => map,
                    Partitions::Cleared => {
                        panic!("symbol data `{}` already cleared", header.symbol_id)
                    }
                };
                if let Some(slot) = map.get_mut(file) {
                    match std::mem::replace(slot, PartitionSlot::Cleared) {
                        PartitionSlot::Live(partition) => partition.end(ctx, header)?,
                        PartitionSlot::Cleared => panic!(
                            "partition for `{file}` of symbol `{}` already flushed",
                            header.symbol_id
                        ),
                    }
                }
                Ok(false)
            }
        }
    }

    /// Project-end flush of whatever partitions are still live.
    pub(crate) fn end(&mut self, handle: SymbolHandle, ctx: &mut EmitterContext) -> Result<()> {
        let SymbolData {
            header, partitions, ..
        } = self.data_mut(handle);
        let retired = std::mem::replace(partitions, Partitions::Cleared);
        if let Partitions::Map(map) = retired {
            for (_, slot) in map {
                if let PartitionSlot::Live(partition) = slot {
                    partition.end(ctx, header)?;
                }
            }
        }
        Ok(())
    }

    /// Retires the handle; later access is a hard error.
    pub(crate) fn clear(&mut self, handle: SymbolHandle) {
        let symbol_id = match &self.entries[handle] {
            SymbolSlot::Live(data) => data.header.symbol_id.clone(),
            SymbolSlot::Cleared(id) => panic!("symbol data `{id}` already cleared"),
        };
        self.entries[handle] = SymbolSlot::Cleared(symbol_id);
    }
}
