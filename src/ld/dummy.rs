// Dummy linker input for testing
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

//! Terse constructors for sections used throughout the linker tests.
//!
//! Symbol tables built here have an `Id` primary key column followed by a
//!   `Value` column,
//!     so the symbol `"Component:foo"` is the row `["foo", value]` of
//!     table `Component`.

use super::{
    policy::SIMPLE_REFERENCE_TABLE,
    section::{
        ColumnDefinition, ColumnKind, Row, Section, SectionType, Table,
        TableDefinition,
    },
};
use crate::span::{dummy::dl, Context, Span};
use std::sync::Arc;

/// Definition of a symbol-creating table named `name`.
pub fn sym_def(name: &str) -> Arc<TableDefinition> {
    Arc::new(
        TableDefinition::new(name, true)
            .with_column(ColumnDefinition::new("Id", ColumnKind::String, true))
            .with_column(ColumnDefinition::new(
                "Value",
                ColumnKind::String,
                false,
            )),
    )
}

/// A symbol-creating table `name` with a row `[id, value]` per pair,
///   each on its own line of the dummy context.
pub fn sym_table(name: &str, rows: &[(&str, &str)]) -> Table {
    let def = sym_def(name);

    rows.iter().enumerate().fold(Table::new(def), |table, (i, (id, val))| {
        table.with_row(Row::new([*id, *val], dl(i as u32 + 1)))
    })
}

/// A cross-reference table referencing each `(table, keys)` pair.
pub fn ref_table(targets: &[(&str, &str)]) -> Table {
    let def =
        Arc::new(TableDefinition::simple_reference(SIMPLE_REFERENCE_TABLE));

    targets
        .iter()
        .enumerate()
        .fold(Table::new(def), |table, (i, (target, keys))| {
            table.with_row(Row::new([*target, *keys], dl(100 + i as u32)))
        })
}

/// Span of the section `id`.
pub fn section_span(id: &str) -> Span {
    Context::from(format!("{id}.wxs")).line(1)
}

pub fn section(id: &str, ty: SectionType, tables: Vec<Table>) -> Section {
    tables
        .into_iter()
        .fold(Section::new(id, ty, section_span(id)), Section::with_table)
}

/// A section `id` of type `ty` defining `Component:<def>` for each of
///   `defs` and referencing `Component:<r>` for each of `refs`.
pub fn component_section(
    id: &str,
    ty: SectionType,
    defs: &[&str],
    refs: &[&str],
) -> Section {
    let rows: Vec<(&str, &str)> = defs.iter().map(|&d| (d, id)).collect();
    let targets: Vec<(&str, &str)> =
        refs.iter().map(|&r| ("Component", r)).collect();

    section(
        id,
        ty,
        vec![sym_table("Component", &rows), ref_table(&targets)],
    )
}
