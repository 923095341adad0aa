//! Emission sinks for the linearized element stream.

use crate::error::Result;
use crate::model::builder::Builder;
use crate::model::protocol::{Edge, Element, Id, Vertex};
use std::io::Write;

/// Receives elements one at a time, in emission order.
pub trait Emitter {
    fn emit(&mut self, element: &Element) -> Result<()>;
}

/// Newline-delimited JSON over any writer.
pub struct JsonLineEmitter<W: Write> {
    out: W,
}

impl<W: Write> JsonLineEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for JsonLineEmitter<W> {
    fn emit(&mut self, element: &Element) -> Result<()> {
        serde_json::to_writer(&mut self.out, element)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

/// Buffers the stream in memory; used by the reconstruction consumer and the
/// test suites.
#[derive(Default)]
pub struct MemoryEmitter {
    elements: Vec<Element>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, element: &Element) -> Result<()> {
        self.elements.push(element.clone());
        Ok(())
    }
}

/// Builder plus sink; the only handle the engine emits through.
pub struct EmitterContext<'a> {
    pub builder: Builder,
    emitter: &'a mut dyn Emitter,
}

impl<'a> EmitterContext<'a> {
    pub fn new(builder: Builder, emitter: &'a mut dyn Emitter) -> Self {
        Self { builder, emitter }
    }

    pub fn vertex(&mut self, vertex: Vertex) -> Result<Id> {
        let id = vertex.id;
        self.emitter.emit(&Element::Vertex(vertex))?;
        Ok(id)
    }

    pub fn edge(&mut self, edge: Edge) -> Result<()> {
        self.emitter.emit(&Element::Edge(edge))
    }
}
