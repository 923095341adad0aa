//! Reconstruction of the emitted stream into a queryable graph.
//!
//! The `IndexGraph` is the dual consumer of the element stream: folding an
//! emission back through it must reproduce the same topology. It also doubles
//! as a validator, rejecting streams whose edges name unknown ids or whose
//! ids do not strictly increase.

use crate::error::{LsifscopeError, Result};
use crate::model::protocol::{Edge, EdgeData, Element, Id, Vertex, VertexData};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

#[derive(Debug)]
pub struct IndexGraph {
    topology: StableDiGraph<Vertex, EdgeData>,
    id_index: HashMap<Id, NodeIndex>,
}

impl IndexGraph {
    pub fn from_elements(elements: &[Element]) -> Result<Self> {
        let mut graph = Self {
            topology: StableDiGraph::new(),
            id_index: HashMap::new(),
        };
        let mut last_id: Option<Id> = None;
        for element in elements {
            if let Some(last) = last_id {
                if element.id() <= last {
                    return Err(LsifscopeError::Graph(format!(
                        "id {} emitted after id {last}",
                        element.id()
                    )));
                }
            }
            last_id = Some(element.id());
            match element {
                Element::Vertex(vertex) => graph.add_vertex(vertex)?,
                Element::Edge(edge) => graph.add_edge(edge)?,
            }
        }
        Ok(graph)
    }

    fn add_vertex(&mut self, vertex: &Vertex) -> Result<()> {
        if self.id_index.contains_key(&vertex.id) {
            return Err(LsifscopeError::Graph(format!(
                "duplicate vertex id {}",
                vertex.id
            )));
        }
        let index = self.topology.add_node(vertex.clone());
        self.id_index.insert(vertex.id, index);
        Ok(())
    }

    fn add_edge(&mut self, edge: &Edge) -> Result<()> {
        for id in edge.referenced_ids() {
            if !self.id_index.contains_key(&id) {
                return Err(LsifscopeError::Graph(format!(
                    "edge {} references unknown id {id}",
                    edge.id
                )));
            }
        }
        let source = self.id_index[&edge.out_v()];
        for in_v in edge.in_vs() {
            let target = self.id_index[&in_v];
            self.topology.add_edge(source, target, edge.data.clone());
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    pub fn vertex(&self, id: Id) -> Option<&Vertex> {
        self.id_index
            .get(&id)
            .and_then(|index| self.topology.node_weight(*index))
    }

    /// Ids attached to `id` through outgoing edges with the given label
    /// predicate.
    fn outgoing_where(&self, id: Id, matches: impl Fn(&EdgeData) -> bool) -> Vec<Id> {
        let Some(&index) = self.id_index.get(&id) else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut edges = self
            .topology
            .neighbors_directed(index, petgraph::Direction::Outgoing)
            .detach();
        while let Some((edge_index, neighbor)) = edges.next(&self.topology) {
            if matches(&self.topology[edge_index]) {
                if let Some(vertex) = self.topology.node_weight(neighbor) {
                    found.push(vertex.id);
                }
            }
        }
        found
    }

    /// Every id the document `contains`-links to.
    pub fn contained_in(&self, document: Id) -> Vec<Id> {
        self.outgoing_where(document, |edge| matches!(edge, EdgeData::Contains { .. }))
    }

    /// Resolves a range to its owning result set: the first `resultSet`
    /// vertex reached along the `next` chain.
    pub fn result_set_of(&self, range: Id) -> Option<Id> {
        let mut current = range;
        loop {
            let nexts = self.outgoing_where(current, |edge| matches!(edge, EdgeData::Next { .. }));
            let &next = nexts.first()?;
            if matches!(self.vertex(next)?.data, VertexData::ResultSet) {
                return Some(next);
            }
            current = next;
        }
    }

    /// The result set an aliasing result set forwards to, if any.
    pub fn next_of(&self, result_set: Id) -> Option<Id> {
        self.outgoing_where(result_set, |edge| matches!(edge, EdgeData::Next { .. }))
            .first()
            .copied()
    }

    /// Item edges attached to `result`, as (document, targets, property).
    pub fn items_of(&self, result: Id) -> Vec<&EdgeData> {
        let Some(&index) = self.id_index.get(&result) else {
            return Vec::new();
        };
        let mut items = Vec::new();
        let mut edges = self
            .topology
            .neighbors_directed(index, petgraph::Direction::Outgoing)
            .detach();
        while let Some((edge_index, _)) = edges.next(&self.topology) {
            if matches!(self.topology[edge_index], EdgeData::Item { .. }) {
                items.push(&self.topology[edge_index]);
            }
        }
        items
    }
}
