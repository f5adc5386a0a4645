// Constraint-based ordering
//
//  Copyright (C) 2014-2021 Ryan Specialty Group, LLC.
//
//  This file is part of instld.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Deterministic ordering of items under "must follow" constraints.
//!
//! A [`ConstraintGraph`] holds a set of string ids and constraints of the
//!   form "`id` after `after`".
//! [`ConstraintGraph::order`] produces a total order of every id that
//!   satisfies every constraint,
//!     breaking ties by ordinal string comparison so that the output is
//!     reproducible.
//!
//! Ordering proceeds in stages:
//!
//! ```text
//!   build --> detect cycles --> flatten --> sort --> rewrite
//!                  |
//!                  `--> (any cycle) --> stop; nothing is rewritten
//! ```
//!
//! Cycle detection does not stop at the first cycle;
//!   every distinct cycle is reported as its own
//!   [`OrderError::CircularConstraint`],
//!     so disjoint cycles are all found in one pass.
//!
//! Graph Representation
//! ====================
//! Constraints are edges of a [`petgraph`] directed graph,
//!   with an edge from `id` to each id it must follow.
//! Following outgoing edges therefore walks toward ids that must come
//!   _earlier_.
//!
//! The sort is a topological sort that always emits the ordinally smallest
//!   id whose constraints have all been satisfied.
//! Where constraints are absent this is simply ordinal order,
//!   and constrained ids are placed as early as their constraints allow.
//!
//! [`reorder`] and [`reorder_searches`] apply the computed order to a
//!   collection of items.

use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic, Diagnostics},
    global,
    ld::section::{Row, Table},
    span::Span,
};
use fixedbitset::FixedBitSet;
use fxhash::{FxHashMap, FxHashSet};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::Dfs,
    Direction,
};
use std::{cmp::Reverse, collections::BinaryHeap};
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// Table of search definitions ordered by [`reorder_searches`].
pub const SEARCH_TABLE: &str = "WixSearch";

/// Table of `(id, parent id)` relations between searches;
///   each search is ordered after its parent.
pub const SEARCH_RELATION_TABLE: &str = "WixSearchRelation";

/// Collector of [`OrderError`]s.
pub type OrderDiagnostics = Diagnostics<OrderError>;

/// Error preventing a [`ConstraintGraph`] from being ordered.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum OrderError {
    /// Constraints require an id to follow itself.
    ///
    /// The chain begins and ends with the same id.
    #[error(
        "circular constraint: {}",
        .chain.join(global::CYCLE_CHAIN_SEPARATOR)
    )]
    CircularConstraint { chain: Vec<String>, span: Span },
}

impl Diagnostic for OrderError {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        match self {
            Self::CircularConstraint { chain, span } => {
                let first = chain.first().map(String::as_str).unwrap_or("");

                span.error(format!("`{first}` is required to follow itself"))
                    .with_help("remove one of the constraints in this chain")
                    .into()
            }
        }
    }
}

/// Ids and the constraints between them.
///
/// Ids are kept in the order in which they were first added,
///   as are the constraints of each id.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, Clone, Default)]
pub struct ConstraintGraph {
    /// Edge from each id to each id it must follow.
    ///
    /// Edge weights are the locations of the constraints;
    ///   constraints implied by [`ConstraintGraph::flatten`] have none.
    graph: DiGraph<String, Option<Span>>,

    index: FxHashMap<String, NodeIndex>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Every id in the order it was first added.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.graph
            .node_indices()
            .map(move |node| self.graph[node].as_str())
    }

    /// Add `id` if it is not already present.
    pub fn add_id(&mut self, id: &str) {
        self.node(id);
    }

    /// Constrain `id` to follow `after`,
    ///   adding either id if not already present.
    ///
    /// Repeated constraints are ignored;
    ///   returns whether this constraint is new.
    pub fn add_constraint(
        &mut self,
        id: &str,
        after: &str,
        span: Span,
    ) -> bool {
        let from = self.node(id);
        let to = self.node(after);

        match self.graph.find_edge(from, to) {
            // A constraint implied by flattening is now explicit.
            Some(edge) => match self.graph.edge_weight_mut(edge) {
                Some(weight) if weight.is_none() => {
                    *weight = Some(span);
                    true
                }
                _ => false,
            },

            None => {
                self.graph.add_edge(from, to, Some(span));
                true
            }
        }
    }

    /// Ids that `id` must follow,
    ///   in the order the constraints were added.
    ///
    /// After [`ConstraintGraph::flatten`],
    ///   this includes every id that `id` must follow transitively.
    pub fn after(&self, id: &str) -> Vec<&str> {
        self.index
            .get(id)
            .map(|&node| {
                self.after_nodes(node)
                    .into_iter()
                    .map(|after| self.graph[after].as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(id) {
            return node;
        }

        let node = self.graph.add_node(id.into());
        self.index.insert(id.into(), node);
        node
    }

    /// Outgoing neighbors of `node` in insertion order.
    ///
    /// Petgraph yields the most recently added edge first.
    fn after_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();

        nodes.reverse();
        nodes
    }

    /// Report each distinct cycle,
    ///   returning the number of cycles found.
    ///
    /// A depth-first search is performed from every id along its
    ///   constraints,
    ///     never expanding an id twice within the same search.
    /// If the search returns to the id it started from,
    ///   the path is a cycle.
    /// The same cycle found from different starting ids is reported only
    ///   once.
    #[instrument(skip_all)]
    pub fn detect_cycles(&self, diags: &mut OrderDiagnostics) -> usize {
        let mut reported: FxHashSet<Vec<NodeIndex>> = FxHashSet::default();

        for start in self.graph.node_indices() {
            let Some(cycle) = self.find_cycle(start) else {
                continue;
            };

            if !reported.insert(canonical_rotation(&cycle)) {
                trace!(id = %self.graph[start], "cycle already reported");
                continue;
            }

            // Location of the first constraint in the chain.
            let next = cycle.get(1).copied().unwrap_or(start);
            let span = self
                .graph
                .find_edge(start, next)
                .and_then(|edge| self.graph.edge_weight(edge).cloned())
                .flatten()
                .unwrap_or_default();

            let chain = cycle
                .iter()
                .chain(Some(&start))
                .map(|&node| self.graph[node].clone())
                .collect();

            diags.push(OrderError::CircularConstraint { chain, span });
        }

        debug!(cycles = reported.len(), "cycle detection complete");

        reported.len()
    }

    /// First cycle through `start`,
    ///   as the path of nodes beginning with `start` and not repeating it.
    fn find_cycle(&self, start: NodeIndex) -> Option<Vec<NodeIndex>> {
        let mut seen = FixedBitSet::with_capacity(self.graph.node_count());
        let mut stack = vec![(start, self.after_nodes(start).into_iter())];

        seen.insert(start.index());

        loop {
            let (_, afters) = stack.last_mut()?;

            let Some(next) = afters.next() else {
                stack.pop();
                continue;
            };

            if next == start {
                return Some(stack.iter().map(|(node, _)| *node).collect());
            }

            if !seen.put(next.index()) {
                stack.push((next, self.after_nodes(next).into_iter()));
            }
        }
    }

    /// Add a constraint from each id to every id it follows transitively.
    ///
    /// This must only be done on a graph without cycles;
    ///   ids on a cycle are left untouched.
    #[instrument(skip_all)]
    pub fn flatten(&mut self) {
        let mut added = 0;

        for node in self.graph.node_indices() {
            if self.find_cycle(node).is_some() {
                continue;
            }

            let mut dfs = Dfs::new(&self.graph, node);
            let mut reachable = Vec::new();

            // The first node visited is `node` itself.
            while let Some(next) = dfs.next(&self.graph) {
                if next != node {
                    reachable.push(next);
                }
            }

            for after in reachable {
                if self.graph.find_edge(node, after).is_none() {
                    self.graph.add_edge(node, after, None);
                    added += 1;
                }
            }
        }

        debug!(added, "constraints flattened");
    }

    /// Every id in constraint order,
    ///   choosing the ordinally smallest available id at each step.
    ///
    /// Ids on a cycle can never become available and are omitted;
    ///   use [`ConstraintGraph::order`] to check for cycles first.
    pub fn sort(&self) -> Vec<String> {
        let graph = &self.graph;

        // Number of ids each id is still waiting on.
        let mut waiting: Vec<usize> = graph
            .node_indices()
            .map(|node| {
                graph.neighbors_directed(node, Direction::Outgoing).count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = graph
            .node_indices()
            .filter(|node| waiting[node.index()] == 0)
            .map(|node| Reverse((graph[node].as_str(), node)))
            .collect();

        let mut sorted = Vec::with_capacity(graph.node_count());

        while let Some(Reverse((id, node))) = ready.pop() {
            sorted.push(id.to_string());

            for follower in graph.neighbors_directed(node, Direction::Incoming)
            {
                let count = &mut waiting[follower.index()];
                *count -= 1;

                if *count == 0 {
                    ready.push(Reverse((graph[follower].as_str(), follower)));
                }
            }
        }

        sorted
    }

    /// Order every id,
    ///   or report each cycle and return [`None`].
    ///
    /// See the [module-level documentation](self) for more information.
    #[instrument(skip_all, fields(ids = self.len()))]
    pub fn order(
        &mut self,
        diags: &mut OrderDiagnostics,
    ) -> Option<Vec<String>> {
        if self.detect_cycles(diags) > 0 {
            return None;
        }

        self.flatten();
        Some(self.sort())
    }
}

/// Rotate the cycle `path` so that it begins with its smallest node.
fn canonical_rotation(path: &[NodeIndex]) -> Vec<NodeIndex> {
    let start = path
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| **node)
        .map(|(i, _)| i)
        .unwrap_or(0);

    path[start..].iter().chain(&path[..start]).copied().collect()
}

/// Rewrite `items` in the order of their ids,
///   as given by `key`.
///
/// Each item id is added to `graph` before ordering.
/// Ids of the graph without a corresponding item are ordered but
///   contribute nothing;
///     items sharing an id keep their relative order.
///
/// If any cycle is found,
///   `items` is left untouched and `false` is returned.
pub fn reorder<T, F>(
    items: &mut [T],
    graph: &mut ConstraintGraph,
    key: F,
    diags: &mut OrderDiagnostics,
) -> bool
where
    F: Fn(&T) -> &str,
{
    for item in items.iter() {
        graph.add_id(key(item));
    }

    let Some(order) = graph.order(diags) else {
        return false;
    };

    let rank: FxHashMap<String, usize> = order
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    items.sort_by_key(|item| {
        rank.get(key(item)).copied().unwrap_or(usize::MAX)
    });

    true
}

/// Order the rows of the search table `searches` so that each search
///   follows its parent according to `relations`.
///
/// Searches are keyed by their first column;
///   each row of `relations` is an `(id, parent id)` pair.
/// Relation rows missing either id are ignored.
///
/// Returns `false` and leaves `searches` untouched if the relations are
///   circular.
#[instrument(skip_all, fields(searches = searches.rows().len()))]
pub fn reorder_searches(
    searches: &mut Table,
    relations: &Table,
    diags: &mut OrderDiagnostics,
) -> bool {
    let mut graph = ConstraintGraph::new();

    for row in relations.rows() {
        let (id, parent) = (row.field_str(0), row.field_str(1));

        if id.is_empty() || parent.is_empty() {
            trace!(span = %row.span(), "ignoring incomplete search relation");
            continue;
        }

        graph.add_constraint(id, parent, row.span().clone());
    }

    reorder(searches.rows_mut(), &mut graph, search_id, diags)
}

fn search_id(row: &Row) -> &str {
    row.field_str(0)
}
