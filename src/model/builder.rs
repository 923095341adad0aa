//! Id generation and record construction.
//!
//! `Builder` is the only place vertex and edge records are assembled, so every
//! record leaves here well formed and with a fresh id. Ids come from a caller
//! supplied [`IdGenerator`]; the protocol only needs a total order, so the
//! default generator hands out sequential integers.

use super::protocol::{
    Diagnostic, Edge, EdgeData, EventKind, EventScope, FoldingRange, Hover, Id, ItemProperty,
    MonikerKind, RangeBasedDocumentSymbol, RangeTag, Span, Vertex, VertexData,
};

pub trait IdGenerator {
    fn next_id(&mut self) -> Id;
}

/// Monotonically increasing integer ids, starting at 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: Id,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Id {
        let id = self.next;
        self.next += 1;
        id
    }
}

pub struct Builder {
    ids: Box<dyn IdGenerator>,
    emit_source: bool,
}

impl Builder {
    pub fn new(ids: Box<dyn IdGenerator>, emit_source: bool) -> Self {
        Self { ids, emit_source }
    }

    fn vertex(&mut self, data: VertexData) -> Vertex {
        Vertex {
            id: self.ids.next_id(),
            data,
        }
    }

    fn edge(&mut self, data: EdgeData) -> Edge {
        Edge {
            id: self.ids.next_id(),
            data,
        }
    }

    // ---- Vertices ----

    pub fn project(&mut self, kind: &str) -> Vertex {
        self.vertex(VertexData::Project {
            kind: kind.to_string(),
        })
    }

    pub fn document(&mut self, uri: String, language_id: &str, contents: Option<String>) -> Vertex {
        let contents = if self.emit_source { contents } else { None };
        self.vertex(VertexData::Document {
            uri,
            language_id: language_id.to_string(),
            contents,
        })
    }

    pub fn range(&mut self, span: Span, tag: Option<RangeTag>) -> Vertex {
        self.vertex(VertexData::Range { span, tag })
    }

    pub fn result_set(&mut self) -> Vertex {
        self.vertex(VertexData::ResultSet)
    }

    pub fn definition_result(&mut self) -> Vertex {
        self.vertex(VertexData::DefinitionResult)
    }

    pub fn reference_result(&mut self) -> Vertex {
        self.vertex(VertexData::ReferenceResult)
    }

    pub fn hover_result(&mut self, contents: String) -> Vertex {
        self.vertex(VertexData::HoverResult {
            result: Hover { contents },
        })
    }

    pub fn moniker(&mut self, scheme: &str, identifier: String, kind: MonikerKind) -> Vertex {
        self.vertex(VertexData::Moniker {
            scheme: scheme.to_string(),
            identifier,
            kind,
        })
    }

    pub fn event(&mut self, kind: EventKind, scope: EventScope, data: Id) -> Vertex {
        self.vertex(VertexData::Event { kind, scope, data })
    }

    pub fn diagnostic_result(&mut self, result: Vec<Diagnostic>) -> Vertex {
        self.vertex(VertexData::DiagnosticResult { result })
    }

    pub fn folding_range_result(&mut self, result: Vec<FoldingRange>) -> Vertex {
        self.vertex(VertexData::FoldingRangeResult { result })
    }

    pub fn document_symbol_result(&mut self, result: Vec<RangeBasedDocumentSymbol>) -> Vertex {
        self.vertex(VertexData::DocumentSymbolResult { result })
    }

    // ---- Edges ----

    pub fn contains(&mut self, out_v: Id, in_vs: Vec<Id>) -> Edge {
        self.edge(EdgeData::Contains { out_v, in_vs })
    }

    pub fn next(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::Next { out_v, in_v })
    }

    pub fn item(
        &mut self,
        out_v: Id,
        in_vs: Vec<Id>,
        document: Id,
        property: Option<ItemProperty>,
    ) -> Edge {
        self.edge(EdgeData::Item {
            out_v,
            in_vs,
            document,
            property,
        })
    }

    pub fn moniker_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::Moniker { out_v, in_v })
    }

    pub fn definition_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::Definition { out_v, in_v })
    }

    pub fn references_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::References { out_v, in_v })
    }

    pub fn hover_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::Hover { out_v, in_v })
    }

    pub fn document_symbol_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::DocumentSymbol { out_v, in_v })
    }

    pub fn folding_range_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::FoldingRange { out_v, in_v })
    }

    pub fn diagnostic_edge(&mut self, out_v: Id, in_v: Id) -> Edge {
        self.edge(EdgeData::Diagnostic { out_v, in_v })
    }
}
