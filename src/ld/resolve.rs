// Transitive reference resolution
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

//! Reachability of sections from the entry section.
//!
//! Starting at the entry section,
//!   every [`SimpleReference`] is looked up in the [`SymbolTable`] and the
//!   section owning the referenced symbol is visited in turn.
//! Sections that are never reached are not part of the link output.
//!
//! This is a depth-first search (DFS) using an explicit stack,
//!   so arbitrarily deep reference chains cannot overflow the call stack.
//! Each stack frame holds the remaining references of one section,
//!   which visits sections and references in the same order that a
//!   recursive traversal would.
//! A section is visited at most once;
//!   cycles and diamonds are therefore harmless.
//!
//! References are never fatal here.
//! A reference to a symbol that does not exist is recorded as an
//!   [`UnresolvedReference`] and the traversal continues,
//!     so that the caller can report every one of them at once.

use super::{
    policy::TablePolicy,
    section::{Section, SectionIndex, SimpleReference, SimpleReferences},
    symbol::{Symbol, SymbolIndex, SymbolTable},
};
use crate::global;
use fixedbitset::FixedBitSet;
use tracing::{debug, instrument, trace};

/// A [`SimpleReference`] whose target symbol does not exist.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct UnresolvedReference<'a> {
    /// Section containing the reference.
    pub section: SectionIndex,

    pub reference: SimpleReference<'a>,
}

/// Result of [`resolve`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Resolution<'a> {
    /// Sections that have been visited,
    ///   by index.
    resolved: FixedBitSet,

    /// Sections in the order they were first visited.
    order: Vec<SectionIndex>,

    /// Symbols that have been successfully looked up,
    ///   by index.
    referenced: FixedBitSet,

    /// Symbols in the order they were first looked up.
    referenced_order: Vec<SymbolIndex>,

    unresolved: Vec<UnresolvedReference<'a>>,
}

impl<'a> Resolution<'a> {
    fn new(section_count: usize, symbol_count: usize) -> Self {
        Self {
            resolved: FixedBitSet::with_capacity(section_count),
            order: Vec::new(),
            referenced: FixedBitSet::with_capacity(symbol_count),
            referenced_order: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    /// Whether `section` is reachable from the entry section.
    pub fn is_resolved(&self, section: SectionIndex) -> bool {
        self.resolved.contains(section.index())
    }

    /// Reachable sections in the order they were first visited;
    ///   the entry section is always first.
    pub fn sections(&self) -> &[SectionIndex] {
        &self.order
    }

    /// Whether `symbol` was looked up by any reference.
    pub fn is_referenced(&self, symbol: SymbolIndex) -> bool {
        self.referenced.contains(symbol.index())
    }

    /// Every symbol successfully looked up during traversal,
    ///   in the order of first lookup.
    pub fn referenced_symbols(&self) -> &[SymbolIndex] {
        &self.referenced_order
    }

    /// References to symbols that do not exist,
    ///   in traversal order.
    pub fn unresolved(&self) -> &[UnresolvedReference<'a>] {
        &self.unresolved
    }

    /// Mark `section` as visited,
    ///   returning `false` if it was already.
    fn visit(&mut self, section: SectionIndex) -> bool {
        if self.resolved.put(section.index()) {
            return false;
        }

        self.order.push(section);
        true
    }

    fn reference(&mut self, symbol: SymbolIndex) {
        if !self.referenced.put(symbol.index()) {
            self.referenced_order.push(symbol);
        }
    }
}

/// Resolve every section reachable from `entry`.
///
/// When `building_merge_module` is set,
///   references into [media tables](TablePolicy::is_media) are skipped,
///     since merge modules never carry media.
///
/// See the [module-level documentation](self) for more information.
#[instrument(skip_all, fields(entry = %entry))]
pub fn resolve<'a>(
    sections: &'a [Section],
    entry: SectionIndex,
    symbols: &SymbolTable<'a>,
    building_merge_module: bool,
    policy: &'a TablePolicy,
) -> Resolution<'a> {
    let mut resolution = Resolution::new(sections.len(), symbols.len());
    let mut stack: Vec<(SectionIndex, SimpleReferences<'a>)> =
        Vec::with_capacity(global::RESOLVE_INIT_STACK_CAP);

    if let Some(section) = entry.get(sections) {
        resolution.visit(entry);
        stack.push((entry, section.simple_references(policy)));
    }

    loop {
        let (section, reference) = match stack.last_mut() {
            Some((section, refs)) => match refs.next() {
                Some(reference) => (*section, reference),
                None => {
                    stack.pop();
                    continue;
                }
            },
            None => break,
        };

        if building_merge_module && policy.is_media(reference.table()) {
            trace!(table = reference.table(), "skipping media reference");
            continue;
        }

        let Some(index) = symbols.lookup(&reference.target_name()) else {
            resolution.unresolved.push(UnresolvedReference {
                section,
                reference,
            });

            continue;
        };

        resolution.reference(index);

        let owner = symbols.get(index).map(Symbol::section);

        if let Some((owner, next)) =
            owner.and_then(|owner| Some((owner, owner.get(sections)?)))
        {
            if resolution.visit(owner) {
                stack.push((owner, next.simple_references(policy)));
            }
        }
    }

    debug!(
        resolved = resolution.order.len(),
        referenced = resolution.referenced_order.len(),
        unresolved = resolution.unresolved.len(),
        "references resolved"
    );

    resolution
}
