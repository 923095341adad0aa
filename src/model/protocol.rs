//! Wire-level records of the emitted index graph.
//!
//! Every record carries a unique id and a label; the engine treats them as
//! opaque values and only dispatches on the label. Serialization follows the
//! LSIF wire names (`textDocument/definition`, `item`, ...), one JSON object
//! per element.

use serde::{Deserialize, Serialize};

pub type Id = u64;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open `[start, end)` span of (line, character) pairs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start_line: u32, start_character: u32, end_line: u32, end_character: u32) -> Self {
        Self {
            start: Position::new(start_line, start_character),
            end: Position::new(end_line, end_character),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Syntactic kind attached to definition ranges and document symbols.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    SourceFile,
    Module,
    Class,
    Interface,
    TypeLiteral,
    Method,
    Function,
    Variable,
    Property,
    Parameter,
    TypeParameter,
    Alias,
    Transient,
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RangeTag {
    #[serde(rename_all = "camelCase")]
    Definition {
        text: String,
        kind: SymbolKind,
        full_range: Span,
    },
    Reference {
        text: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MonikerKind {
    Import,
    Export,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Begin,
    End,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum EventScope {
    Document,
    Project,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Hover {
    pub contents: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Information,
    Hint,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub code: Option<String>,
    pub message: String,
    pub range: Span,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoldingRange {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl From<Span> for FoldingRange {
    fn from(span: Span) -> Self {
        Self {
            start_line: span.start.line,
            start_character: span.start.character,
            end_line: span.end.line,
            end_character: span.end.character,
        }
    }
}

/// Document-symbol tree node; refers to an already emitted definition range.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RangeBasedDocumentSymbol {
    pub id: Id,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<RangeBasedDocumentSymbol>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: Id,
    #[serde(flatten)]
    pub data: VertexData,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "label", rename_all = "camelCase")]
pub enum VertexData {
    Project {
        kind: String,
    },
    #[serde(rename_all = "camelCase")]
    Document {
        uri: String,
        language_id: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        contents: Option<String>,
    },
    Range {
        #[serde(flatten)]
        span: Span,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        tag: Option<RangeTag>,
    },
    ResultSet,
    DefinitionResult,
    ReferenceResult,
    HoverResult {
        result: Hover,
    },
    Moniker {
        scheme: String,
        identifier: String,
        kind: MonikerKind,
    },
    Event {
        kind: EventKind,
        scope: EventScope,
        data: Id,
    },
    DiagnosticResult {
        result: Vec<Diagnostic>,
    },
    FoldingRangeResult {
        result: Vec<FoldingRange>,
    },
    DocumentSymbolResult {
        result: Vec<RangeBasedDocumentSymbol>,
    },
}

impl Vertex {
    pub fn label(&self) -> &'static str {
        match &self.data {
            VertexData::Project { .. } => "project",
            VertexData::Document { .. } => "document",
            VertexData::Range { .. } => "range",
            VertexData::ResultSet => "resultSet",
            VertexData::DefinitionResult => "definitionResult",
            VertexData::ReferenceResult => "referenceResult",
            VertexData::HoverResult { .. } => "hoverResult",
            VertexData::Moniker { .. } => "moniker",
            VertexData::Event { .. } => "event",
            VertexData::DiagnosticResult { .. } => "diagnosticResult",
            VertexData::FoldingRangeResult { .. } => "foldingRangeResult",
            VertexData::DocumentSymbolResult { .. } => "documentSymbolResult",
        }
    }
}

/// Property tag on `item` edges, bucketing the attached ranges.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ItemProperty {
    Declarations,
    Definitions,
    References,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: Id,
    #[serde(flatten)]
    pub data: EdgeData,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "label")]
pub enum EdgeData {
    #[serde(rename = "contains", rename_all = "camelCase")]
    Contains { out_v: Id, in_vs: Vec<Id> },
    #[serde(rename = "next", rename_all = "camelCase")]
    Next { out_v: Id, in_v: Id },
    #[serde(rename = "item", rename_all = "camelCase")]
    Item {
        out_v: Id,
        in_vs: Vec<Id>,
        document: Id,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        property: Option<ItemProperty>,
    },
    #[serde(rename = "moniker", rename_all = "camelCase")]
    Moniker { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/definition", rename_all = "camelCase")]
    Definition { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/references", rename_all = "camelCase")]
    References { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/hover", rename_all = "camelCase")]
    Hover { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/documentSymbol", rename_all = "camelCase")]
    DocumentSymbol { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/foldingRange", rename_all = "camelCase")]
    FoldingRange { out_v: Id, in_v: Id },
    #[serde(rename = "textDocument/diagnostic", rename_all = "camelCase")]
    Diagnostic { out_v: Id, in_v: Id },
}

impl Edge {
    pub fn out_v(&self) -> Id {
        match &self.data {
            EdgeData::Contains { out_v, .. }
            | EdgeData::Next { out_v, .. }
            | EdgeData::Item { out_v, .. }
            | EdgeData::Moniker { out_v, .. }
            | EdgeData::Definition { out_v, .. }
            | EdgeData::References { out_v, .. }
            | EdgeData::Hover { out_v, .. }
            | EdgeData::DocumentSymbol { out_v, .. }
            | EdgeData::FoldingRange { out_v, .. }
            | EdgeData::Diagnostic { out_v, .. } => *out_v,
        }
    }

    pub fn in_vs(&self) -> Vec<Id> {
        match &self.data {
            EdgeData::Contains { in_vs, .. } | EdgeData::Item { in_vs, .. } => in_vs.clone(),
            EdgeData::Next { in_v, .. }
            | EdgeData::Moniker { in_v, .. }
            | EdgeData::Definition { in_v, .. }
            | EdgeData::References { in_v, .. }
            | EdgeData::Hover { in_v, .. }
            | EdgeData::DocumentSymbol { in_v, .. }
            | EdgeData::FoldingRange { in_v, .. }
            | EdgeData::Diagnostic { in_v, .. } => vec![*in_v],
        }
    }

    /// All ids this edge refers to, including the item document.
    pub fn referenced_ids(&self) -> Vec<Id> {
        let mut ids = self.in_vs();
        ids.push(self.out_v());
        if let EdgeData::Item { document, .. } = &self.data {
            ids.push(*document);
        }
        ids
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Element {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    pub fn id(&self) -> Id {
        match self {
            Element::Vertex(v) => v.id,
            Element::Edge(e) => e.id,
        }
    }
}
