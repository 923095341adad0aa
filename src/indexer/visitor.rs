//! Depth-first traversal driver over the program's syntax trees.

use super::manager::DataManager;
use super::symbol_data::{DefinitionInfo, ReferenceTarget, SymbolHandle};
use super::{IndexerOptions, ProjectPaths, ProjectResult, SemanticContext};
use crate::emit::{Emitter, EmitterContext};
use crate::error::Result;
use crate::model::builder::{Builder, IdGenerator};
use crate::model::protocol::{
    Diagnostic, FoldingRange, Id, ItemProperty, RangeBasedDocumentSymbol, RangeTag, Span,
};
use crate::paths;
use crate::semantics::{NodeId, SemanticOracle, SymbolRef, SyntaxKind};
use crate::symbols::Symbols;
use tracing::{debug, warn};

/// Runs the indexer over every source file of the program, emitting the
/// element stream to `emitter`. Returns the resolved project directories.
pub fn visit_program(
    oracle: &dyn SemanticOracle,
    options: &IndexerOptions,
    ids: Box<dyn IdGenerator>,
    emitter: &mut dyn Emitter,
) -> Result<ProjectResult> {
    let project_paths = ProjectPaths::resolve(options, oracle)?;
    let builder = Builder::new(ids, !options.no_contents);
    let mut ctx = EmitterContext::new(builder, emitter);
    let manager = DataManager::begin(&mut ctx, oracle.language_id())?;

    let mut visitor = Visitor {
        oracle,
        ctx,
        symbols: Symbols::new(),
        manager,
        project_paths,
        frames: Vec::new(),
        current_file: None,
    };
    visitor.run()
}

/// One level of the document-symbol tree under construction.
struct SymbolFrame {
    range: Option<Id>,
    children: Vec<RangeBasedDocumentSymbol>,
}

struct Visitor<'a> {
    oracle: &'a dyn SemanticOracle,
    ctx: EmitterContext<'a>,
    symbols: Symbols,
    manager: DataManager,
    project_paths: ProjectPaths,
    frames: Vec<SymbolFrame>,
    current_file: Option<String>,
}

impl Visitor<'_> {
    fn run(&mut self) -> Result<ProjectResult> {
        for file in self.oracle.source_files() {
            if self.is_ignored(file) {
                debug!(file = %self.oracle.file_name(file), "skipping file");
                continue;
            }
            self.visit(file)?;
        }
        self.manager.project_processed(&mut self.ctx)?;
        Ok(self.project_paths.result())
    }

    /// Declaration files never participate; generated `.js` under a
    /// `node_modules` directory is skipped unless it is literally `index.js`.
    fn is_ignored(&self, file: NodeId) -> bool {
        if self.oracle.is_declaration_file(file) {
            return true;
        }
        let name = self.oracle.file_name(file);
        name.ends_with(".js")
            && paths::basename(&name) != "index.js"
            && paths::traverses_node_modules(&name)
    }

    fn visit(&mut self, node: NodeId) -> Result<()> {
        match self.oracle.node_kind(node) {
            SyntaxKind::SourceFile => self.visit_source_file(node),
            SyntaxKind::ModuleDeclaration
            | SyntaxKind::ClassDeclaration
            | SyntaxKind::InterfaceDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::MethodSignature
            | SyntaxKind::FunctionDeclaration => self.visit_declaration(node, true),
            SyntaxKind::Parameter | SyntaxKind::TypeParameter => {
                self.visit_declaration(node, false)
            }
            SyntaxKind::ClassExpression => {
                // Class expressions take the identifier path as well; the
                // symbol lookup comes back empty for nearly all of them.
                // TODO: decide whether this double handling is intentional
                // or should collapse into the plain child traversal.
                self.visit_identifier(node)?;
                self.visit_children(node)?;
                self.manager.node_processed(&mut self.ctx, node)
            }
            SyntaxKind::Identifier => {
                self.visit_identifier(node)?;
                self.manager.node_processed(&mut self.ctx, node)
            }
            _ => {
                self.visit_children(node)?;
                self.manager.node_processed(&mut self.ctx, node)
            }
        }
    }

    fn visit_children(&mut self, node: NodeId) -> Result<()> {
        for child in self.oracle.children(node) {
            self.visit(child)?;
        }
        Ok(())
    }

    fn visit_source_file(&mut self, file: NodeId) -> Result<()> {
        let name = self.oracle.file_name(file);
        debug!(file = %name, "begin file");
        self.manager.get_or_create_document_data(
            &mut self.ctx,
            self.oracle,
            &self.project_paths,
            file,
        )?;

        let depth = self.frames.len();
        self.frames.push(SymbolFrame {
            range: None,
            children: Vec::new(),
        });
        self.current_file = Some(name.clone());

        self.visit_children(file)?;

        if self.frames.len() != depth + 1 {
            panic!("document symbol stack unbalanced at end of `{name}`");
        }
        let root = match self.frames.pop() {
            Some(frame) => frame,
            None => panic!("document symbol stack unbalanced at end of `{name}`"),
        };

        let diagnostics = self.collect_diagnostics(file);
        let folding_ranges: Vec<FoldingRange> = self
            .oracle
            .outlining_spans(file)
            .into_iter()
            .map(FoldingRange::from)
            .collect();
        let document = self.manager.document_mut(&name);
        document.set_diagnostics(diagnostics);
        document.set_folding_ranges(folding_ranges);
        document.set_document_symbols(root.children);

        self.current_file = None;
        self.manager.document_processed(&mut self.ctx, file, &name)
    }

    fn collect_diagnostics(&self, file: NodeId) -> Vec<Diagnostic> {
        let mut collected = Vec::new();
        for raw in self.oracle.syntactic_diagnostics(file) {
            collected.push(Diagnostic {
                severity: raw.severity,
                code: raw.code,
                message: raw.message,
                range: raw.span.unwrap_or(Span::new(0, 0, 0, 0)),
            });
        }
        for raw in self.oracle.semantic_diagnostics(file) {
            match (raw.file, raw.span) {
                (Some(diag_file), Some(span)) if diag_file == file => {
                    collected.push(Diagnostic {
                        severity: raw.severity,
                        code: raw.code,
                        message: raw.message,
                        range: span,
                    });
                }
                _ => {
                    warn!(message = %raw.message, "skipping semantic diagnostic without a resolvable location");
                }
            }
        }
        collected
    }

    fn visit_declaration(&mut self, node: NodeId, container: bool) -> Result<()> {
        let mut pushed = false;
        if let Some(sym) = self.oracle.symbol_at(node) {
            let file_name = match &self.current_file {
                Some(current) => current.clone(),
                None => panic!("declaration visited outside of a source file"),
            };
            let mut sem = SemanticContext {
                oracle: self.oracle,
                symbols: &mut self.symbols,
                paths: &self.project_paths,
            };
            let handle =
                self.manager
                    .get_or_create_symbol_data(&mut self.ctx, &mut sem, sym, Some(node))?;

            let name_node = self.oracle.name_node(node).unwrap_or(node);
            let span = self.oracle.node_span(name_node);
            let range = match self.manager.find_definition(handle, &file_name, span) {
                Some(existing) => existing,
                None => self.record_definition(handle, sym, node, name_node, &file_name, span)?,
            };
            if container {
                self.frames.push(SymbolFrame {
                    range: Some(range),
                    children: Vec::new(),
                });
                pushed = true;
            }
        }

        self.visit_children(node)?;

        if pushed {
            let frame = match self.frames.pop() {
                Some(frame) => frame,
                None => panic!("document symbol stack unbalanced"),
            };
            let symbol_node = RangeBasedDocumentSymbol {
                // A pushed frame always carries its declaration range.
                id: frame.range.unwrap_or_default(),
                children: frame.children,
            };
            match self.frames.last_mut() {
                Some(parent) => parent.children.push(symbol_node),
                None => panic!("document symbol stack unbalanced"),
            }
        }

        self.manager.node_processed(&mut self.ctx, node)
    }

    fn record_definition(
        &mut self,
        handle: SymbolHandle,
        sym: SymbolRef,
        node: NodeId,
        name_node: NodeId,
        file_name: &str,
        span: Span,
    ) -> Result<Id> {
        let tag = RangeTag::Definition {
            text: self.oracle.node_text(name_node),
            kind: self.oracle.symbol_kind(sym),
            full_range: self.oracle.node_span(node),
        };
        let vertex = self.ctx.builder.range(span, Some(tag));
        let range = self.ctx.vertex(vertex)?;
        self.manager.document_mut(file_name).add_range(range);
        self.manager
            .add_definition(&mut self.ctx, handle, file_name, range, span)?;
        self.manager.record_definition_info(
            handle,
            DefinitionInfo {
                file: file_name.to_string(),
                span,
            },
        );

        if !self.manager.has_hover(handle) {
            if let Some(info) = self.oracle.quick_info(name_node) {
                self.manager.add_hover(&mut self.ctx, handle, info)?;
            }
        }
        Ok(range)
    }

    fn visit_identifier(&mut self, node: NodeId) -> Result<()> {
        let Some(sym) = self.oracle.symbol_at(node) else {
            return Ok(());
        };
        let file_name = match &self.current_file {
            Some(current) => current.clone(),
            None => return Ok(()),
        };
        let mut sem = SemanticContext {
            oracle: self.oracle,
            symbols: &mut self.symbols,
            paths: &self.project_paths,
        };
        let handle =
            self.manager
                .get_or_create_symbol_data(&mut self.ctx, &mut sem, sym, Some(node))?;

        let span = self.oracle.node_span(node);
        // An identifier sitting on a declaration name it already represents
        // folds into the definition record instead of becoming a reference.
        if self.manager.has_definition_info(handle, &file_name, span)
            || self.manager.find_definition(handle, &file_name, span).is_some()
        {
            return Ok(());
        }

        let tag = RangeTag::Reference {
            text: self.oracle.node_text(node),
        };
        let vertex = self.ctx.builder.range(span, Some(tag));
        let range = self.ctx.vertex(vertex)?;
        self.manager.document_mut(&file_name).add_range(range);
        self.manager.add_reference(
            &mut self.ctx,
            handle,
            &file_name,
            ReferenceTarget::Range {
                id: range,
                property: ItemProperty::References,
            },
        )
    }
}
