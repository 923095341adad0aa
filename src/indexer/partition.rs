//! Per-(symbol, document) shard of definition and reference ranges.

use super::symbol_data::ResultSetHeader;
use crate::emit::EmitterContext;
use crate::error::Result;
use crate::model::protocol::{Id, ItemProperty, Span};
use tracing::trace;

/// Accumulates one symbol's ranges for one document until the shard ends,
/// keeping `item` edges document-homogeneous.
pub struct SymbolDataPartition {
    document: Id,
    definition_ranges: Vec<(Id, Span)>,
    declaration_refs: Vec<Id>,
    definition_refs: Vec<Id>,
    reference_refs: Vec<Id>,
    reference_results: Vec<Id>,
}

impl SymbolDataPartition {
    pub fn new(document: Id) -> Self {
        Self {
            document,
            definition_ranges: Vec::new(),
            declaration_refs: Vec::new(),
            definition_refs: Vec::new(),
            reference_refs: Vec::new(),
            reference_results: Vec::new(),
        }
    }

    pub fn begin(&self) {
        trace!(document = self.document, "partition begin");
    }

    pub fn document(&self) -> Id {
        self.document
    }

    pub fn add_definition(&mut self, range: Id, span: Span, record_as_reference: bool) {
        self.definition_ranges.push((range, span));
        if record_as_reference {
            self.definition_refs.push(range);
        }
    }

    pub fn add_reference_range(&mut self, range: Id, property: ItemProperty) {
        match property {
            ItemProperty::Declarations => self.declaration_refs.push(range),
            ItemProperty::Definitions => self.definition_refs.push(range),
            ItemProperty::References => self.reference_refs.push(range),
        }
    }

    pub fn add_reference_result(&mut self, result: Id) {
        self.reference_results.push(result);
    }

    /// Exact `[start, end)` match against the recorded definition ranges.
    pub fn find_definition(&self, span: Span) -> Option<Id> {
        self.definition_ranges
            .iter()
            .find(|(_, recorded)| *recorded == span)
            .map(|(id, _)| *id)
    }

    /// Flushes the shard as `item` edges against the owning symbol's results.
    pub fn end(self, ctx: &mut EmitterContext, header: &mut ResultSetHeader) -> Result<()> {
        if !self.definition_ranges.is_empty() {
            let definition_result = header.get_or_create_definition_result(ctx)?;
            let ranges = self.definition_ranges.iter().map(|(id, _)| *id).collect();
            let edge = ctx.builder.item(definition_result, ranges, self.document, None);
            ctx.edge(edge)?;
        }

        let buckets = [
            (ItemProperty::Declarations, &self.declaration_refs),
            (ItemProperty::Definitions, &self.definition_refs),
            (ItemProperty::References, &self.reference_refs),
        ];
        for (property, ranges) in buckets {
            if ranges.is_empty() {
                continue;
            }
            let reference_result = header.get_or_create_reference_result(ctx)?;
            let edge = ctx
                .builder
                .item(reference_result, ranges.clone(), self.document, Some(property));
            ctx.edge(edge)?;
        }

        if !self.reference_results.is_empty() {
            let reference_result = header.get_or_create_reference_result(ctx)?;
            let edge = ctx.builder.item(
                reference_result,
                self.reference_results,
                self.document,
                None,
            );
            ctx.edge(edge)?;
        }

        trace!(document = self.document, "partition end");
        Ok(())
    }
}
