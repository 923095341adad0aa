//! The semantic query oracle the engine indexes against.
//!
//! Parsing and type checking happen upstream; the engine only sees this
//! interface. Nodes, symbols and types are copyable handles with reference
//! identity — two handles are the same entity exactly when they compare
//! equal — so they can key hash maps directly.

use crate::model::protocol::{DiagnosticSeverity, Span, SymbolKind};

/// Stable handle to a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Stable handle to a symbol for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(pub u64);

/// Stable handle to a type for the duration of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(pub u64);

/// Cross-run stable identifier for a symbol.
pub type SymbolId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    ModuleDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    MethodDeclaration,
    MethodSignature,
    FunctionDeclaration,
    Parameter,
    TypeParameter,
    ClassExpression,
    Identifier,
    Block,
    Other,
}

/// Diagnostic as the oracle reports it; locations may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDiagnostic {
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub code: Option<String>,
    pub file: Option<NodeId>,
    pub span: Option<Span>,
}

/// Synchronous view over a compiled program: syntax, checker and navigation
/// queries. Implementations wrapping an asynchronous checker must block.
pub trait SemanticOracle {
    // ---- Program and syntax ----

    /// Source files in program order.
    fn source_files(&self) -> Vec<NodeId>;
    fn node_kind(&self, node: NodeId) -> SyntaxKind;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn node_span(&self, node: NodeId) -> Span;
    /// The name node of a declaration, when it has one.
    fn name_node(&self, decl: NodeId) -> Option<NodeId>;
    fn node_text(&self, node: NodeId) -> String;
    fn containing_file(&self, node: NodeId) -> NodeId;
    fn file_name(&self, file: NodeId) -> String;
    fn file_contents(&self, file: NodeId) -> Option<String>;
    fn is_declaration_file(&self, file: NodeId) -> bool;
    fn language_id(&self) -> &str;

    // ---- Checker ----

    fn symbol_at(&self, node: NodeId) -> Option<SymbolRef>;
    fn symbol_id(&self, sym: SymbolRef) -> SymbolId;
    fn symbol_name(&self, sym: SymbolRef) -> String;
    fn symbol_kind(&self, sym: SymbolRef) -> SymbolKind;
    fn declarations(&self, sym: SymbolRef) -> Vec<NodeId>;
    fn parent_symbol(&self, sym: SymbolRef) -> Option<SymbolRef>;
    /// Member of the symbol's instance-members table.
    fn member(&self, sym: SymbolRef, name: &str) -> Option<SymbolRef>;
    /// Member of the symbol's exports table.
    fn export_member(&self, sym: SymbolRef, name: &str) -> Option<SymbolRef>;
    /// Resolution target of an alias symbol.
    fn alias_target(&self, sym: SymbolRef) -> Option<SymbolRef>;
    /// The declared type of a class or interface symbol.
    fn declared_type(&self, sym: SymbolRef) -> Option<TypeRef>;
    fn base_types(&self, ty: TypeRef) -> Vec<TypeRef>;
    fn type_symbol(&self, ty: TypeRef) -> Option<SymbolRef>;
    /// Symbols named by the `extends`/`implements` heritage of a class
    /// declaration node.
    fn heritage_symbols(&self, class_decl: NodeId) -> Vec<SymbolRef>;
    /// The type of the symbol as observed at a specific use location.
    fn type_at_location(&self, sym: SymbolRef, location: NodeId) -> Option<TypeRef>;
    /// Constituents when the type is a union or intersection; absent otherwise.
    fn union_or_intersection_parts(&self, ty: TypeRef) -> Option<Vec<TypeRef>>;
    /// Innermost syntactic node bounding the symbol's lifetime, for symbols
    /// that are not visible past a scope.
    fn symbol_scope(&self, sym: SymbolRef) -> Option<NodeId>;

    // ---- Navigation services ----

    fn quick_info(&self, node: NodeId) -> Option<String>;
    fn syntactic_diagnostics(&self, file: NodeId) -> Vec<RawDiagnostic>;
    fn semantic_diagnostics(&self, file: NodeId) -> Vec<RawDiagnostic>;
    fn outlining_spans(&self, file: NodeId) -> Vec<Span>;
}
