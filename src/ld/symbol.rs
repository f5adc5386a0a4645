// Global symbol table
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

//! Global symbol table and entry section location.
//!
//! Every row of a symbol-creating table defines a [`Symbol`] named after
//!   the row's table and primary keys
//!     (see [`Table::symbol_name`]).
//! [`load_symbols`] walks the sections in input order and builds a
//!   [`SymbolTable`] in which each name has exactly one _owning_ symbol;
//!     every later definition of the same name is kept in the owner's
//!     duplicate list rather than discarded,
//!       so that conflicts can be reported later for only those symbols
//!       that turn out to be reachable.
//!
//! While doing so it also locates the entry section:
//!   the first section whose type [is entry-capable](SectionType::is_entry).
//!
//! ```text
//!   sections (input order)          SymbolTable
//!   ----------------------          -----------
//!   #0 Product  File:a  ------>     File:a  (owner #0)
//!   #1 Fragment File:b  ------>     File:b  (owner #1)
//!   #2 Fragment File:a  ------>       `-- duplicate #2
//! ```

use super::{
    error::{LinkDiagnostics, LinkMessage},
    section::{Row, Section, SectionIndex, SectionType, Table},
};
use crate::span::Span;
use fxhash::FxHashMap;
use std::fmt::{self, Display};
use tracing::{debug, instrument, trace};

/// Handle to an owning [`Symbol`] within a [`SymbolTable`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SymbolIndex(usize);

impl SymbolIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A named definition that may be referenced from other sections.
///
/// A symbol borrows its defining row from the caller's sections and
///   refers to its section only by [`SectionIndex`],
///     so symbols never keep sections alive.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Symbol<'a> {
    name: String,
    section: SectionIndex,
    table: &'a Table,
    row: &'a Row,
    duplicates: Vec<Symbol<'a>>,
}

impl<'a> Symbol<'a> {
    pub fn new(section: SectionIndex, table: &'a Table, row: &'a Row) -> Self {
        Self {
            name: table.symbol_name(row),
            section,
            table,
            row,
            duplicates: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Section containing the defining row.
    pub fn section(&self) -> SectionIndex {
        self.section
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn row(&self) -> &'a Row {
        self.row
    }

    pub fn span(&self) -> &'a Span {
        self.row.span()
    }

    /// Other definitions of this symbol's name that were not chosen as the
    ///   owner,
    ///     in the order they were encountered.
    pub fn duplicates(&self) -> &[Symbol<'a>] {
        &self.duplicates
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

impl<'a> Display for Symbol<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`", self.name)
    }
}

/// Mapping of symbol names to their owning [`Symbol`].
///
/// Owners are stored in definition order,
///   so iteration order is deterministic for a given input.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable<'a> {
    symbols: Vec<Symbol<'a>>,
    index: FxHashMap<String, SymbolIndex>,
    with_duplicates: Vec<SymbolIndex>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of owning symbols
    ///   (duplicates are not counted).
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolIndex> {
        self.index.get(name).copied()
    }

    pub fn get(&self, index: SymbolIndex) -> Option<&Symbol<'a>> {
        self.symbols.get(index.0)
    }

    /// Owning symbol for `name`,
    ///   if any.
    pub fn find(&self, name: &str) -> Option<&Symbol<'a>> {
        self.lookup(name).and_then(|index| self.get(index))
    }

    /// Owning symbols in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.symbols.iter()
    }

    /// Owning symbols that acquired at least one duplicate,
    ///   in the order they acquired their first.
    pub fn with_duplicates(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.with_duplicates
            .iter()
            .filter_map(move |&index| self.get(index))
    }

    /// Define `symbol`,
    ///   or add it to the duplicates of the existing owner of its name.
    ///
    /// If `allow_identical_rows` is set and the row of `symbol` is
    ///   identical to that of the existing owner,
    ///     the definition is tolerated with a warning and recorded
    ///     nowhere else.
    fn define(
        &mut self,
        symbol: Symbol<'a>,
        allow_identical_rows: bool,
        diags: &mut LinkDiagnostics,
    ) {
        let Some(existing) = self.lookup(symbol.name()) else {
            let index = SymbolIndex(self.symbols.len());

            self.index.insert(symbol.name.clone(), index);
            self.symbols.push(symbol);
            return;
        };

        let owner = &mut self.symbols[existing.0];

        if allow_identical_rows && owner.row.is_identical(symbol.row) {
            trace!(name = %symbol.name, "tolerating identical row");

            diags.push(LinkMessage::IdenticalDuplicateRow {
                name: symbol.name,
                span: symbol.row.span().clone(),
                original_span: owner.span().clone(),
            });

            return;
        }

        if !owner.has_duplicates() {
            self.with_duplicates.push(existing);
        }

        owner.duplicates.push(symbol);
    }
}

assert_impl_all!(SymbolTable<'static>: Send, Sync);

/// Result of [`load_symbols`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct LoadedSymbols<'a> {
    /// The first entry-capable section,
    ///   if any.
    pub entry: Option<SectionIndex>,

    /// Every symbol defined by `sections`.
    pub symbols: SymbolTable<'a>,
}

/// Locate the entry section and build the global symbol table from
///   `sections`.
///
/// Sections are processed strictly in input order:
///   the first entry-capable section becomes the entry section and the
///   first definition of each symbol name becomes its owner.
/// This makes the result reproducible for the same input.
///
/// Diagnostics
/// ===========
/// - [`LinkMessage::UnexpectedEntryType`] (warning) for each
///     entry-capable section whose type differs from `expected`,
///     unless `expected` is [`SectionType::Unknown`].
/// - [`LinkMessage::AmbiguousEntryPoint`] (error) for each entry-capable
///     section after the first.
/// - [`LinkMessage::IdenticalDuplicateRow`] (warning) for each tolerated
///     identical row when `allow_identical_rows` is set.
///
/// None of these stop processing;
///   the symbol table is always complete.
#[instrument(skip_all, fields(sections = sections.len()))]
pub fn load_symbols<'a>(
    sections: &'a [Section],
    allow_identical_rows: bool,
    expected: SectionType,
    diags: &mut LinkDiagnostics,
) -> LoadedSymbols<'a> {
    let mut entry: Option<SectionIndex> = None;
    let mut symbols = SymbolTable::new();

    for (i, section) in sections.iter().enumerate() {
        let index = SectionIndex::new(i);

        if section.ty().is_entry() {
            if expected != SectionType::Unknown && expected != section.ty() {
                diags.push(LinkMessage::UnexpectedEntryType {
                    section: section.id().into(),
                    span: section.span().clone(),
                    expected,
                    found: section.ty(),
                });
            }

            match entry.and_then(|first| first.get(sections)) {
                None => {
                    debug!(section = section.id(), "entry section found");
                    entry = Some(index);
                }

                Some(first) => {
                    diags.push(LinkMessage::AmbiguousEntryPoint {
                        first: first.id().into(),
                        first_span: first.span().clone(),
                        second: section.id().into(),
                        second_span: section.span().clone(),
                    });
                }
            }
        }

        for table in section.symbol_tables() {
            for row in table.rows() {
                symbols.define(
                    Symbol::new(index, table, row),
                    allow_identical_rows,
                    diags,
                );
            }
        }
    }

    debug!(
        symbols = symbols.len(),
        with_duplicates = symbols.with_duplicates.len(),
        "symbol table built"
    );

    LoadedSymbols { entry, symbols }
}

#[cfg(test)]
mod test;
