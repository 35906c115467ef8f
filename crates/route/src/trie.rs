//! Segment trie backing the [`Router`](crate::Router).
//!
//! Nodes live in a single arena and refer to each other by index, every node owns its own child and
//! handler maps. A node has any number of literal children keyed by their exact segment text and at most
//! one variable child, which captures whatever segment is found at its position.

use crate::handler::{Handler, Middleware};
use crate::Context;
use http::Method;
use std::collections::HashMap;
use tracing::warn;

/// Marks a pattern segment as a captured variable, `:name`.
pub const VARIABLE_MARKER: char = ':';

pub(crate) type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Default)]
pub(crate) struct RouteNode {
    segment: Option<String>,
    children: HashMap<String, NodeId>,
    variable_child: Option<NodeId>,
    variable_name: String,
    handlers: HashMap<Method, Handler>,
    middlewares: HashMap<Method, Vec<Middleware>>,
}

impl RouteNode {
    fn new(segment: &str) -> Self {
        Self { segment: Some(segment.to_owned()), ..Self::default() }
    }

    pub(crate) fn handler(&self, method: &Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub(crate) fn middlewares(&self, method: &Method) -> &[Middleware] {
        self.middlewares.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    /// The pattern segment this node was created for, `None` for the root.
    pub(crate) fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }
}

#[derive(Debug)]
pub(crate) struct RouteTrie {
    nodes: Vec<RouteNode>,
}

impl RouteTrie {
    pub(crate) fn new() -> Self {
        Self { nodes: vec![RouteNode::default()] }
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &RouteNode {
        &self.nodes[id]
    }

    /// Number of nodes, the root included.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the pattern from the root, creating the missing nodes, and stores the handler and
    /// middleware for `method` on the terminal node. An existing registration is replaced.
    pub(crate) fn insert(&mut self, method: Method, pattern: &str, handler: Handler, middlewares: Vec<Middleware>) {
        let mut current = ROOT;
        for segment in pattern.split('/') {
            current = match segment.strip_prefix(VARIABLE_MARKER) {
                Some(name) => self.variable_child(current, segment, name),
                None => self.literal_child(current, segment),
            };
        }

        let node = &mut self.nodes[current];
        node.handlers.insert(method.clone(), handler);
        node.middlewares.insert(method, middlewares);
    }

    /// Walks `path` greedily: a literal child always wins over the variable child and a choice is never
    /// revisited. Captured segments are bound on `ctx` as the walk goes, so a failed walk leaves the
    /// variables bound so far in place.
    pub(crate) fn find(&self, path: &str, ctx: &mut Context) -> Option<NodeId> {
        let mut current = ROOT;
        for segment in path.split('/') {
            let node = &self.nodes[current];
            current = match node.children.get(segment) {
                Some(&child) => child,
                None => {
                    let child = node.variable_child?;
                    ctx.set_path_variable(&self.nodes[child].variable_name, segment);
                    child
                }
            };
        }
        Some(current)
    }

    fn literal_child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        if let Some(&child) = self.nodes[parent].children.get(segment) {
            return child;
        }

        let child = self.push(RouteNode::new(segment));
        self.nodes[parent].children.insert(segment.to_owned(), child);
        child
    }

    fn variable_child(&mut self, parent: NodeId, segment: &str, name: &str) -> NodeId {
        match self.nodes[parent].variable_child {
            Some(child) => {
                let node = &mut self.nodes[child];
                if node.variable_name != name {
                    warn!(
                        previous = %node.variable_name,
                        current = %name,
                        "path variable renamed, last registration wins"
                    );
                    node.variable_name = name.to_owned();
                    node.segment = Some(segment.to_owned());
                }
                child
            }
            None => {
                let mut node = RouteNode::new(segment);
                node.variable_name = name.to_owned();
                let child = self.push(node);
                self.nodes[parent].variable_child = Some(child);
                child
            }
        }
    }

    fn push(&mut self, node: RouteNode) -> NodeId {
        self.nodes.push(node);
        self.nodes.len() - 1
    }
}
