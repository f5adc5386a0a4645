// Compiled sections handed to the linker
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

//! Sections, tables, and rows produced by the compiler.
//!
//! A [`Section`] is the unit of compiled output:
//!   a typed, named collection of [`Table`]s,
//!     each holding [`Row`]s of [`Field`]s.
//! Sections are created once by the compiler and are never modified by
//!   the linker;
//!     every linker phase borrows them from the caller's section list
//!     and refers to them by [`SectionIndex`].

use super::policy::TablePolicy;
use crate::{global, span::Span};
use std::{
    fmt::{self, Display},
    slice,
    sync::Arc,
};

/// Type of a compiled [`Section`].
///
/// Every type but [`SectionType::Fragment`] and [`SectionType::Unknown`]
///   is _entry-capable_,
///     meaning that it may serve as the root of the reference graph
///     (see [`SectionType::is_entry`]).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Default)]
pub enum SectionType {
    #[default]
    Unknown,
    Product,
    Module,
    PatchCreation,
    Patch,
    Bundle,
    Fragment,
}

impl SectionType {
    /// Whether sections of this type may serve as the entry section of a
    ///   link.
    pub fn is_entry(self) -> bool {
        use SectionType::*;

        match self {
            Product | Module | PatchCreation | Patch | Bundle => true,
            Fragment | Unknown => false,
        }
    }
}

impl Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SectionType::*;

        match self {
            Unknown => write!(f, "unknown"),
            Product => write!(f, "product"),
            Module => write!(f, "module"),
            PatchCreation => write!(f, "patch creation"),
            Patch => write!(f, "patch"),
            Bundle => write!(f, "bundle"),
            Fragment => write!(f, "fragment"),
        }
    }
}

/// Kind of value held by a column.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ColumnKind {
    String,
    Number,
}

/// Definition of a single table column.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ColumnDefinition {
    name: String,
    kind: ColumnKind,
    primary_key: bool,
}

impl ColumnDefinition {
    pub fn new<S: Into<String>>(
        name: S,
        kind: ColumnKind,
        primary_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            primary_key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }
}

/// Definition of a [`Table`].
///
/// Definitions come from the table schema,
///   which the linker does not validate;
///     it only cares whether a table's rows create symbols and which
///     columns make up its primary key.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TableDefinition {
    name: String,
    columns: Vec<ColumnDefinition>,
    creates_symbols: bool,
}

impl TableDefinition {
    pub fn new<S: Into<String>>(name: S, creates_symbols: bool) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            creates_symbols,
        }
    }

    /// Append a column to the definition.
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Definition of a cross-reference table holding
    ///   [`SimpleReference`] facts.
    ///
    /// Its rows are `(target table name, primary keys)` and do not
    ///   create symbols.
    pub fn simple_reference<S: Into<String>>(name: S) -> Self {
        Self::new(name, false)
            .with_column(ColumnDefinition::new(
                "Table",
                ColumnKind::String,
                true,
            ))
            .with_column(ColumnDefinition::new(
                "PrimaryKeys",
                ColumnKind::String,
                true,
            ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Whether each row of this table defines a global symbol.
    pub fn creates_symbols(&self) -> bool {
        self.creates_symbols
    }

    /// Indexes of the primary key columns,
    ///   in column order.
    ///
    /// A table without any primary key columns is keyed by its first
    ///   column.
    pub fn primary_key_indexes(&self) -> Vec<usize> {
        let keys: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.is_primary_key())
            .map(|(i, _)| i)
            .collect();

        if keys.is_empty() {
            vec![0]
        } else {
            keys
        }
    }
}

/// A typed field value of a [`Row`].
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum Field {
    Null,
    Number(i64),
    String(String),
}

impl Field {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for Field {
    /// Render the field as it would appear in a symbol name;
    ///   [`Field::Null`] renders as the empty string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Number(n) => Display::fmt(n, f),
            Self::String(s) => Display::fmt(s, f),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Field {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Field::Null)
    }
}

/// An ordered sequence of field values belonging to one [`Table`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Row {
    fields: Vec<Field>,
    span: Span,
}

impl Row {
    pub fn new<I, F>(fields: I, span: Span) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Field>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            span,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// String value of the field at `index`,
    ///   or the empty string if the field is missing or not a string.
    pub fn field_str(&self, index: usize) -> &str {
        self.field(index).and_then(Field::as_str).unwrap_or("")
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Whether every field of this row compares equal to the
    ///   corresponding field of `other`.
    ///
    /// Source locations are not compared.
    pub fn is_identical(&self, other: &Row) -> bool {
        self.fields == other.fields
    }
}

/// A named collection of [`Row`]s within a [`Section`].
///
/// The definition is shared,
///   since every section containing a given table uses the same one.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Table {
    def: Arc<TableDefinition>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(def: Arc<TableDefinition>) -> Self {
        Self {
            def,
            rows: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.def
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable access to rows for post-link rewriting
    ///   (see [`crate::order::reorder_searches`]).
    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    /// Name of the symbol that `row` of this table would define.
    ///
    /// The name is `"<table>:<pk1>/<pk2>/..."` using the primary key
    ///   columns of the table definition.
    pub fn symbol_name(&self, row: &Row) -> String {
        let keys = self
            .def
            .primary_key_indexes()
            .into_iter()
            .map(|i| row.field(i).map(ToString::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(global::SYMBOL_KEY_SEPARATOR);

        format!("{}{}{}", self.name(), global::SYMBOL_TABLE_SEPARATOR, keys)
    }
}

/// Handle to a [`Section`] in the caller's section list.
///
/// Handles are plain indexes,
///   so holding one never keeps a section alive;
///     resolve them against the same slice that produced them.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct SectionIndex(usize);

impl SectionIndex {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Look up the section this handle refers to.
    pub fn get(self, sections: &[Section]) -> Option<&Section> {
        sections.get(self.0)
    }
}

impl Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named, typed unit of compiled output.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Section {
    id: String,
    ty: SectionType,
    tables: Vec<Table>,
    span: Span,
}

impl Section {
    pub fn new<S: Into<String>>(id: S, ty: SectionType, span: Span) -> Self {
        Self {
            id: id.into(),
            ty,
            tables: Vec::new(),
            span,
        }
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ty(&self) -> SectionType {
        self.ty
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// First table with the given name,
    ///   if any.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name() == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|table| table.name() == name)
    }

    /// Tables whose rows define symbols.
    pub fn symbol_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables
            .iter()
            .filter(|table| table.definition().creates_symbols())
    }

    /// [`SimpleReference`] facts recorded in this section,
    ///   in row order,
    ///   read from every table that `policy` names as the cross-reference
    ///   table.
    pub fn simple_references<'a>(
        &'a self,
        policy: &'a TablePolicy,
    ) -> SimpleReferences<'a> {
        SimpleReferences {
            policy,
            tables: self.tables.iter(),
            rows: (&[] as &[Row]).iter(),
        }
    }
}

// Sections are shared read-only between concurrent links.
assert_impl_all!(Section: Send, Sync);

/// A fact stating that the section containing it requires a symbol of the
///   given name to exist.
///
/// These are rows of the cross-reference table and are used only for
///   traversal;
///     they never create symbols themselves.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct SimpleReference<'a> {
    table: &'a str,
    primary_keys: &'a str,
    span: &'a Span,
}

impl<'a> SimpleReference<'a> {
    pub fn new(table: &'a str, primary_keys: &'a str, span: &'a Span) -> Self {
        Self {
            table,
            primary_keys,
            span,
        }
    }

    fn from_row(row: &'a Row) -> Self {
        Self::new(row.field_str(0), row.field_str(1), row.span())
    }

    /// Name of the table that the target symbol originates from.
    pub fn table(&self) -> &'a str {
        self.table
    }

    pub fn primary_keys(&self) -> &'a str {
        self.primary_keys
    }

    pub fn span(&self) -> &'a Span {
        self.span
    }

    /// Name of the referenced symbol,
    ///   formed the same way as [`Table::symbol_name`].
    pub fn target_name(&self) -> String {
        format!(
            "{}{}{}",
            self.table,
            global::SYMBOL_TABLE_SEPARATOR,
            self.primary_keys
        )
    }
}

/// Iterator over the [`SimpleReference`]s of a [`Section`].
///
/// This should be created with [`Section::simple_references`].
#[derive(Debug, Clone)]
pub struct SimpleReferences<'a> {
    policy: &'a TablePolicy,
    tables: slice::Iter<'a, Table>,
    rows: slice::Iter<'a, Row>,
}

impl<'a> Iterator for SimpleReferences<'a> {
    type Item = SimpleReference<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.rows.next() {
                return Some(SimpleReference::from_row(row));
            }

            let table = self.tables.next()?;

            if self.policy.is_simple_reference(table.name()) {
                self.rows = table.rows().iter();
            }
        }
    }
}

#[cfg(test)]
mod test;
