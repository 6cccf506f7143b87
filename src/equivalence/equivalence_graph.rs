use std::{
    collections::VecDeque,
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EquivalenceError, Result};

/// A lemma as it is written under one naming convention. Two nodes are the
/// same node when both the display string and the convention match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LemmaNode {
    pub display: String,
    pub convention: String,
}

impl LemmaNode {
    pub fn new(display: impl Into<String>, convention: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            convention: convention.into(),
        }
    }
}

impl fmt::Display for LemmaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.convention, self.display)
    }
}

// On-disk form of the graph. Edges are kept in insertion order so that
// neighbour order, and with it ambiguous resolution, survives a reload.
#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    nodes: Vec<LemmaNode>,
    edges: Vec<(u32, u32)>,
}

#[derive(Debug, Serialize)]
pub struct AdjacencyEntry<'a> {
    pub lemma: &'a LemmaNode,
    pub equivalents: Vec<&'a LemmaNode>,
}

/// Undirected simple graph linking the names one lemma has under different
/// conventions.
///
/// Each node keeps its neighbours in the order the edges were added, so a
/// traversal from a given node always visits nodes in the same order.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceGraph {
    nodes: Vec<LemmaNode>,
    node_ids: FxHashMap<LemmaNode, u32>,
    neighbors: Vec<Vec<u32>>,
    edges: FxHashSet<(u32, u32)>,
    edge_order: Vec<(u32, u32)>,
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

impl EquivalenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn contains(&self, node: &LemmaNode) -> bool {
        self.node_ids.contains_key(node)
    }

    pub fn add_node(&mut self, node: LemmaNode) -> u32 {
        if let Some(&id) = self.node_ids.get(&node) {
            return id;
        }
        let id = self.nodes.len() as u32;
        self.node_ids.insert(node.clone(), id);
        self.nodes.push(node);
        self.neighbors.push(Vec::new());
        id
    }

    /// Links two nodes, adding them if needed. Returns false when the edge
    /// already exists or both ends are the same node.
    pub fn add_edge(&mut self, a: LemmaNode, b: LemmaNode) -> bool {
        if a == b {
            return false;
        }
        let a = self.add_node(a);
        let b = self.add_node(b);
        self.link(a, b)
    }

    fn link(&mut self, a: u32, b: u32) -> bool {
        if a == b || !self.edges.insert(edge_key(a, b)) {
            return false;
        }
        self.neighbors[a as usize].push(b);
        self.neighbors[b as usize].push(a);
        self.edge_order.push((a, b));
        true
    }

    /// Imports one row of an equivalence table: every pair of filled cells
    /// becomes an edge. Cells are `(convention, display)` pairs; blank
    /// displays are skipped. Returns the number of new edges.
    pub fn import_row<C, D>(&mut self, cells: &[(C, D)]) -> usize
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        let ids: Vec<u32> = cells
            .iter()
            .map(|(convention, display)| (convention.as_ref().trim(), display.as_ref().trim()))
            .filter(|(_, display)| !display.is_empty())
            .map(|(convention, display)| self.add_node(LemmaNode::new(display, convention)))
            .collect();

        let mut added = 0;
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                if self.link(a, b) {
                    added += 1;
                }
            }
        }
        added
    }

    pub fn neighbors(&self, node: &LemmaNode) -> Vec<&LemmaNode> {
        match self.node_ids.get(node) {
            Some(&id) => self.neighbors[id as usize]
                .iter()
                .map(|&n| &self.nodes[n as usize])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Breadth-first traversal from `source`, not including `source`.
    pub fn traverse(&self, source: &LemmaNode) -> Traversal<'_> {
        Traversal::new(self, self.node_ids.get(source).copied())
    }

    /// Finds the name of `source` under `target` convention.
    ///
    /// Every node reachable from `source` is a candidate. With
    /// `allow_ambiguous` the first candidate in traversal order wins;
    /// otherwise there must be exactly one.
    pub fn resolve(
        &self,
        source: &LemmaNode,
        target: &str,
        allow_ambiguous: bool,
    ) -> std::result::Result<&LemmaNode, EquivalenceError> {
        if !self.contains(source) {
            return Err(EquivalenceError::UnknownLemma {
                display: source.display.clone(),
                convention: source.convention.clone(),
            });
        }

        let mut candidates = self
            .traverse(source)
            .filter(|node| node.convention == target);

        if allow_ambiguous {
            return candidates.next().ok_or_else(|| EquivalenceError::NoEquivalent {
                display: source.display.clone(),
                target: target.to_string(),
            });
        }

        let candidates: Vec<&LemmaNode> = candidates.collect();
        match candidates.len() {
            0 => Err(EquivalenceError::NoEquivalent {
                display: source.display.clone(),
                target: target.to_string(),
            }),
            1 => Ok(candidates[0]),
            count => Err(EquivalenceError::Ambiguous {
                display: source.display.clone(),
                target: target.to_string(),
                count,
            }),
        }
    }

    pub fn adjacency(&self) -> Vec<AdjacencyEntry<'_>> {
        self.nodes
            .iter()
            .zip(&self.neighbors)
            .map(|(lemma, neighbors)| AdjacencyEntry {
                lemma,
                equivalents: neighbors.iter().map(|&n| &self.nodes[n as usize]).collect(),
            })
            .collect()
    }

    pub fn export_adjacency<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.adjacency())?;
        Ok(())
    }

    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        let snapshot = GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edge_order.clone(),
        };
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let snapshot: GraphSnapshot = serde_json::from_reader(reader)?;
        let mut graph = Self::new();
        for (position, node) in snapshot.nodes.into_iter().enumerate() {
            let id = graph.add_node(node);
            if id as usize != position {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("node {} repeats node {}", position, id),
                )
                .into());
            }
        }
        for (a, b) in snapshot.edges {
            if a as usize >= graph.len() || b as usize >= graph.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("edge ({}, {}) refers to a missing node", a, b),
                )
                .into());
            }
            graph.link(a, b);
        }
        Ok(graph)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.save(BufWriter::new(file))?;
        info!(
            path = %path.as_ref().display(),
            lemmata = self.len(),
            edges = self.edge_count(),
            "saved equivalence graph"
        );
        Ok(())
    }

    /// Loads the graph stored at `path`, or starts an empty one when the
    /// file does not exist yet.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no equivalence graph found, starting a new one");
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };
        let graph = Self::load(BufReader::new(file))?;
        info!(path = %path.display(), lemmata = graph.len(), "loaded equivalence graph");
        Ok(graph)
    }
}

/// Breadth-first walk over an [`EquivalenceGraph`]. Every node is visited at
/// most once, so cycles terminate.
pub struct Traversal<'a> {
    graph: &'a EquivalenceGraph,
    visited: Vec<bool>,
    queue: VecDeque<u32>,
    // next neighbour of the node at the front of the queue
    cursor: usize,
}

impl<'a> Traversal<'a> {
    fn new(graph: &'a EquivalenceGraph, source: Option<u32>) -> Self {
        let mut visited = vec![false; graph.len()];
        let mut queue = VecDeque::new();
        if let Some(source) = source {
            visited[source as usize] = true;
            queue.push_back(source);
        }
        Self {
            graph,
            visited,
            queue,
            cursor: 0,
        }
    }
}

impl<'a> Iterator for Traversal<'a> {
    type Item = &'a LemmaNode;

    fn next(&mut self) -> Option<Self::Item> {
        // Nodes are yielded when first discovered, so the source itself,
        // which starts at the front of the queue, is never yielded.
        let graph = self.graph;
        loop {
            let current = *self.queue.front()?;
            let neighbors = &graph.neighbors[current as usize];
            while self.cursor < neighbors.len() {
                let neighbor = neighbors[self.cursor];
                self.cursor += 1;
                if !self.visited[neighbor as usize] {
                    self.visited[neighbor as usize] = true;
                    self.queue.push_back(neighbor);
                    return Some(&graph.nodes[neighbor as usize]);
                }
            }
            self.queue.pop_front();
            self.cursor = 0;
        }
    }
}
