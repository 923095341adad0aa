#![allow(dead_code)]

//! In-memory program fixtures for driving the indexer without a compiler.

use lsifscope::emit::MemoryEmitter;
use lsifscope::indexer::{visit_program, IndexerOptions, ProjectResult};
use lsifscope::model::builder::SequentialIds;
use lsifscope::model::protocol::{
    DiagnosticSeverity, Edge, EdgeData, Element, Id, RangeTag, Span, SymbolKind, Vertex,
    VertexData,
};
use lsifscope::semantics::{
    NodeId, RawDiagnostic, SemanticOracle, SymbolId, SymbolRef, SyntaxKind, TypeRef,
};
use std::collections::HashMap;

struct NodeData {
    kind: SyntaxKind,
    span: Span,
    text: String,
    children: Vec<NodeId>,
    file: NodeId,
    name_node: Option<NodeId>,
}

struct FileData {
    name: String,
    contents: Option<String>,
    declaration_file: bool,
}

struct SymbolEntry {
    id: String,
    name: String,
    kind: SymbolKind,
    declarations: Vec<NodeId>,
    parent: Option<SymbolRef>,
    members: HashMap<String, SymbolRef>,
    exports: HashMap<String, SymbolRef>,
    alias_target: Option<SymbolRef>,
    declared_type: Option<TypeRef>,
    scope: Option<NodeId>,
}

struct TypeEntry {
    symbol: Option<SymbolRef>,
    bases: Vec<TypeRef>,
    parts: Option<Vec<TypeRef>>,
}

/// Programmatically wired program: files, nodes, symbols and types with just
/// enough semantic structure to answer the oracle queries.
#[derive(Default)]
pub struct FixtureProgram {
    files: Vec<NodeId>,
    nodes: HashMap<NodeId, NodeData>,
    file_data: HashMap<NodeId, FileData>,
    symbols: HashMap<SymbolRef, SymbolEntry>,
    types: HashMap<TypeRef, TypeEntry>,
    bindings: HashMap<NodeId, SymbolRef>,
    quick_infos: HashMap<NodeId, String>,
    syntactic: HashMap<NodeId, Vec<RawDiagnostic>>,
    semantic: HashMap<NodeId, Vec<RawDiagnostic>>,
    outlining: HashMap<NodeId, Vec<Span>>,
    heritage: HashMap<NodeId, Vec<SymbolRef>>,
    type_at: HashMap<(SymbolRef, NodeId), TypeRef>,
    next_node: u64,
    next_symbol: u64,
    next_type: u64,
}

impl FixtureProgram {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_node(&mut self) -> NodeId {
        self.next_node += 1;
        NodeId(self.next_node)
    }

    pub fn add_file(&mut self, name: &str, contents: &str) -> NodeId {
        let node = self.fresh_node();
        self.nodes.insert(
            node,
            NodeData {
                kind: SyntaxKind::SourceFile,
                span: Span::new(0, 0, u32::MAX, 0),
                text: String::new(),
                children: Vec::new(),
                file: node,
                name_node: None,
            },
        );
        self.file_data.insert(
            node,
            FileData {
                name: name.to_string(),
                contents: Some(contents.to_string()),
                declaration_file: false,
            },
        );
        self.files.push(node);
        node
    }

    pub fn set_declaration_file(&mut self, file: NodeId) {
        if let Some(data) = self.file_data.get_mut(&file) {
            data.declaration_file = true;
        }
    }

    pub fn add_node(&mut self, parent: NodeId, kind: SyntaxKind, span: Span, text: &str) -> NodeId {
        let file = self.nodes[&parent].file;
        let node = self.fresh_node();
        self.nodes.insert(
            node,
            NodeData {
                kind,
                span,
                text: text.to_string(),
                children: Vec::new(),
                file,
                name_node: None,
            },
        );
        self.nodes.get_mut(&parent).unwrap().children.push(node);
        node
    }

    /// Adds an identifier node carrying the declaration's name and wires it
    /// as the declaration's name node.
    pub fn add_name(&mut self, decl: NodeId, span: Span, text: &str) -> NodeId {
        let name = self.add_node(decl, SyntaxKind::Identifier, span, text);
        self.nodes.get_mut(&decl).unwrap().name_node = Some(name);
        name
    }

    pub fn add_symbol(&mut self, id: &str, name: &str, kind: SymbolKind) -> SymbolRef {
        self.next_symbol += 1;
        let sym = SymbolRef(self.next_symbol);
        self.symbols.insert(
            sym,
            SymbolEntry {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                declarations: Vec::new(),
                parent: None,
                members: HashMap::new(),
                exports: HashMap::new(),
                alias_target: None,
                declared_type: None,
                scope: None,
            },
        );
        sym
    }

    /// Records a declaration node for the symbol and binds the node to it.
    pub fn declare(&mut self, sym: SymbolRef, node: NodeId) {
        self.symbols.get_mut(&sym).unwrap().declarations.push(node);
        self.bindings.insert(node, sym);
    }

    pub fn bind(&mut self, node: NodeId, sym: SymbolRef) {
        self.bindings.insert(node, sym);
    }

    pub fn set_parent(&mut self, sym: SymbolRef, parent: SymbolRef) {
        self.symbols.get_mut(&sym).unwrap().parent = Some(parent);
    }

    pub fn add_member(&mut self, owner: SymbolRef, member: SymbolRef) {
        let name = self.symbols[&member].name.clone();
        self.symbols
            .get_mut(&owner)
            .unwrap()
            .members
            .insert(name, member);
    }

    pub fn add_export(&mut self, owner: SymbolRef, member: SymbolRef) {
        let name = self.symbols[&member].name.clone();
        self.symbols
            .get_mut(&owner)
            .unwrap()
            .exports
            .insert(name, member);
    }

    pub fn set_alias_target(&mut self, alias: SymbolRef, target: SymbolRef) {
        self.symbols.get_mut(&alias).unwrap().alias_target = Some(target);
    }

    pub fn set_scope(&mut self, sym: SymbolRef, node: NodeId) {
        self.symbols.get_mut(&sym).unwrap().scope = Some(node);
    }

    pub fn add_type(&mut self, symbol: Option<SymbolRef>) -> TypeRef {
        self.next_type += 1;
        let ty = TypeRef(self.next_type);
        self.types.insert(
            ty,
            TypeEntry {
                symbol,
                bases: Vec::new(),
                parts: None,
            },
        );
        ty
    }

    pub fn set_declared_type(&mut self, sym: SymbolRef, ty: TypeRef) {
        self.symbols.get_mut(&sym).unwrap().declared_type = Some(ty);
    }

    pub fn set_base_types(&mut self, ty: TypeRef, bases: Vec<TypeRef>) {
        self.types.get_mut(&ty).unwrap().bases = bases;
    }

    pub fn set_union_parts(&mut self, ty: TypeRef, parts: Vec<TypeRef>) {
        self.types.get_mut(&ty).unwrap().parts = Some(parts);
    }

    pub fn set_type_at(&mut self, sym: SymbolRef, node: NodeId, ty: TypeRef) {
        self.type_at.insert((sym, node), ty);
    }

    pub fn set_heritage(&mut self, class_decl: NodeId, bases: Vec<SymbolRef>) {
        self.heritage.insert(class_decl, bases);
    }

    pub fn set_quick_info(&mut self, node: NodeId, text: &str) {
        self.quick_infos.insert(node, text.to_string());
    }

    pub fn add_syntactic_diagnostic(&mut self, file: NodeId, diagnostic: RawDiagnostic) {
        self.syntactic.entry(file).or_default().push(diagnostic);
    }

    pub fn add_semantic_diagnostic(&mut self, file: NodeId, diagnostic: RawDiagnostic) {
        self.semantic.entry(file).or_default().push(diagnostic);
    }

    pub fn add_outlining_span(&mut self, file: NodeId, span: Span) {
        self.outlining.entry(file).or_default().push(span);
    }
}

impl SemanticOracle for FixtureProgram {
    fn source_files(&self) -> Vec<NodeId> {
        self.files.clone()
    }
    fn node_kind(&self, node: NodeId) -> SyntaxKind {
        self.nodes[&node].kind
    }
    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[&node].children.clone()
    }
    fn node_span(&self, node: NodeId) -> Span {
        self.nodes[&node].span
    }
    fn name_node(&self, decl: NodeId) -> Option<NodeId> {
        self.nodes[&decl].name_node
    }
    fn node_text(&self, node: NodeId) -> String {
        self.nodes[&node].text.clone()
    }
    fn containing_file(&self, node: NodeId) -> NodeId {
        self.nodes[&node].file
    }
    fn file_name(&self, file: NodeId) -> String {
        self.file_data[&file].name.clone()
    }
    fn file_contents(&self, file: NodeId) -> Option<String> {
        self.file_data[&file].contents.clone()
    }
    fn is_declaration_file(&self, file: NodeId) -> bool {
        self.file_data[&file].declaration_file
    }
    fn language_id(&self) -> &str {
        "typescript"
    }
    fn symbol_at(&self, node: NodeId) -> Option<SymbolRef> {
        self.bindings.get(&node).copied()
    }
    fn symbol_id(&self, sym: SymbolRef) -> SymbolId {
        self.symbols[&sym].id.clone()
    }
    fn symbol_name(&self, sym: SymbolRef) -> String {
        self.symbols[&sym].name.clone()
    }
    fn symbol_kind(&self, sym: SymbolRef) -> SymbolKind {
        self.symbols[&sym].kind
    }
    fn declarations(&self, sym: SymbolRef) -> Vec<NodeId> {
        self.symbols[&sym].declarations.clone()
    }
    fn parent_symbol(&self, sym: SymbolRef) -> Option<SymbolRef> {
        self.symbols[&sym].parent
    }
    fn member(&self, sym: SymbolRef, name: &str) -> Option<SymbolRef> {
        self.symbols[&sym].members.get(name).copied()
    }
    fn export_member(&self, sym: SymbolRef, name: &str) -> Option<SymbolRef> {
        self.symbols[&sym].exports.get(name).copied()
    }
    fn alias_target(&self, sym: SymbolRef) -> Option<SymbolRef> {
        self.symbols[&sym].alias_target
    }
    fn declared_type(&self, sym: SymbolRef) -> Option<TypeRef> {
        self.symbols[&sym].declared_type
    }
    fn base_types(&self, ty: TypeRef) -> Vec<TypeRef> {
        self.types[&ty].bases.clone()
    }
    fn type_symbol(&self, ty: TypeRef) -> Option<SymbolRef> {
        self.types[&ty].symbol
    }
    fn heritage_symbols(&self, class_decl: NodeId) -> Vec<SymbolRef> {
        self.heritage.get(&class_decl).cloned().unwrap_or_default()
    }
    fn type_at_location(&self, sym: SymbolRef, location: NodeId) -> Option<TypeRef> {
        self.type_at.get(&(sym, location)).copied()
    }
    fn union_or_intersection_parts(&self, ty: TypeRef) -> Option<Vec<TypeRef>> {
        self.types[&ty].parts.clone()
    }
    fn symbol_scope(&self, sym: SymbolRef) -> Option<NodeId> {
        self.symbols[&sym].scope
    }
    fn quick_info(&self, node: NodeId) -> Option<String> {
        self.quick_infos.get(&node).cloned()
    }
    fn syntactic_diagnostics(&self, file: NodeId) -> Vec<RawDiagnostic> {
        self.syntactic.get(&file).cloned().unwrap_or_default()
    }
    fn semantic_diagnostics(&self, file: NodeId) -> Vec<RawDiagnostic> {
        self.semantic.get(&file).cloned().unwrap_or_default()
    }
    fn outlining_spans(&self, file: NodeId) -> Vec<Span> {
        self.outlining.get(&file).cloned().unwrap_or_default()
    }
}

// ---- Runner helpers ----

pub fn options() -> IndexerOptions {
    IndexerOptions {
        project_root: "/proj".to_string(),
        no_contents: false,
        root_dir: None,
        out_dir: None,
        config_file: None,
        dependent_projects: Vec::new(),
    }
}

pub fn run(program: &FixtureProgram) -> Vec<Element> {
    run_with(program, options()).0
}

pub fn run_with(program: &FixtureProgram, opts: IndexerOptions) -> (Vec<Element>, ProjectResult) {
    lsifscope::logging::init_for_tests();
    let mut sink = MemoryEmitter::new();
    let result = visit_program(program, &opts, Box::new(SequentialIds::new()), &mut sink)
        .expect("indexing succeeds");
    (sink.into_elements(), result)
}

// ---- Stream queries ----

pub fn vertices(elements: &[Element]) -> impl Iterator<Item = &Vertex> {
    elements.iter().filter_map(|element| match element {
        Element::Vertex(vertex) => Some(vertex),
        Element::Edge(_) => None,
    })
}

pub fn edges(elements: &[Element]) -> impl Iterator<Item = &Edge> {
    elements.iter().filter_map(|element| match element {
        Element::Edge(edge) => Some(edge),
        Element::Vertex(_) => None,
    })
}

pub fn vertices_with_label<'a>(elements: &'a [Element], label: &str) -> Vec<&'a Vertex> {
    vertices(elements).filter(|v| v.label() == label).collect()
}

/// The definition-tagged range vertex whose tag text matches.
pub fn definition_range(elements: &[Element], text: &str) -> Option<Id> {
    vertices(elements)
        .find(|v| {
            matches!(
                &v.data,
                VertexData::Range {
                    tag: Some(RangeTag::Definition { text: t, .. }),
                    ..
                } if t == text
            )
        })
        .map(|v| v.id)
}

/// All reference-tagged range vertices whose tag text matches.
pub fn reference_ranges(elements: &[Element], text: &str) -> Vec<Id> {
    vertices(elements)
        .filter(|v| {
            matches!(
                &v.data,
                VertexData::Range {
                    tag: Some(RangeTag::Reference { text: t }),
                    ..
                } if t == text
            )
        })
        .map(|v| v.id)
        .collect()
}

pub fn document_with_uri(elements: &[Element], uri: &str) -> Option<Id> {
    vertices(elements)
        .find(|v| matches!(&v.data, VertexData::Document { uri: u, .. } if u == uri))
        .map(|v| v.id)
}

/// Index of the first element matching the predicate, for ordering checks.
pub fn position_of(elements: &[Element], predicate: impl Fn(&Element) -> bool) -> Option<usize> {
    elements.iter().position(predicate)
}

pub fn item_edges(elements: &[Element]) -> Vec<&Edge> {
    edges(elements)
        .filter(|e| matches!(e.data, EdgeData::Item { .. }))
        .collect()
}

/// The `textDocument/references` target of a result set, if emitted.
pub fn reference_result_of(elements: &[Element], result_set: Id) -> Option<Id> {
    edges(elements).find_map(|e| match &e.data {
        EdgeData::References { out_v, in_v } if *out_v == result_set => Some(*in_v),
        _ => None,
    })
}

/// The `textDocument/definition` target of a result set, if emitted.
pub fn definition_result_of(elements: &[Element], result_set: Id) -> Option<Id> {
    edges(elements).find_map(|e| match &e.data {
        EdgeData::Definition { out_v, in_v } if *out_v == result_set => Some(*in_v),
        _ => None,
    })
}

/// The vertex a range is `next`-linked to.
pub fn next_target(elements: &[Element], range: Id) -> Option<Id> {
    edges(elements).find_map(|e| match &e.data {
        EdgeData::Next { out_v, in_v } if *out_v == range => Some(*in_v),
        _ => None,
    })
}

pub fn warning(message: &str) -> RawDiagnostic {
    RawDiagnostic {
        message: message.to_string(),
        severity: DiagnosticSeverity::Warning,
        code: None,
        file: None,
        span: None,
    }
}
