// Tests for the global symbol table
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

use super::*;
use crate::ld::{
    dummy::*,
    section::{ColumnDefinition, ColumnKind, Field, TableDefinition},
};
use crate::span::dummy::dl;
use std::sync::Arc;

use SectionType::*;

fn load(
    sections: &[Section],
    allow_identical_rows: bool,
    expected: SectionType,
) -> (LoadedSymbols, LinkDiagnostics) {
    let mut diags = LinkDiagnostics::new();
    let loaded =
        load_symbols(sections, allow_identical_rows, expected, &mut diags);

    (loaded, diags)
}

#[test]
fn single_entry_section_is_chosen() {
    let sections = vec![
        component_section("frag1", Fragment, &["a"], &[]),
        component_section("prod", Product, &["b"], &[]),
        component_section("frag2", Fragment, &["c"], &[]),
    ];

    let (loaded, diags) = load(&sections, false, Unknown);

    assert_eq!(Some(SectionIndex::new(1)), loaded.entry);
    assert!(diags.is_empty());
}

#[test]
fn no_entry_section() {
    let sections = vec![component_section("frag", Fragment, &["a"], &[])];

    let (loaded, diags) = load(&sections, false, Product);

    assert_eq!(None, loaded.entry);
    assert_eq!(1, loaded.symbols.len());
    assert!(diags.is_empty());
}

#[test]
fn each_extra_entry_section_is_ambiguous() {
    let sections = vec![
        component_section("prod", Product, &["a"], &[]),
        component_section("frag", Fragment, &["b"], &[]),
        component_section("bundle", Bundle, &["c"], &[]),
        component_section("module", Module, &["d"], &[]),
    ];

    let (loaded, diags) = load(&sections, false, Unknown);

    // First one wins.
    assert_eq!(Some(SectionIndex::new(0)), loaded.entry);

    assert_eq!(
        diags.into_vec(),
        vec![
            LinkMessage::AmbiguousEntryPoint {
                first: "prod".into(),
                first_span: section_span("prod"),
                second: "bundle".into(),
                second_span: section_span("bundle"),
            },
            LinkMessage::AmbiguousEntryPoint {
                first: "prod".into(),
                first_span: section_span("prod"),
                second: "module".into(),
                second_span: section_span("module"),
            },
        ]
    );

    // Symbol table work still completes for every section.
    assert_eq!(4, loaded.symbols.len());
}

#[test]
fn mismatched_entry_type_warns_but_continues() {
    let sections = vec![component_section("mod", Module, &["a"], &[])];

    let (loaded, diags) = load(&sections, false, Product);

    assert_eq!(Some(SectionIndex::new(0)), loaded.entry);
    assert!(!diags.has_errors());
    assert_eq!(
        diags.into_vec(),
        vec![LinkMessage::UnexpectedEntryType {
            section: "mod".into(),
            span: section_span("mod"),
            expected: Product,
            found: Module,
        }]
    );
}

#[test]
fn matching_entry_type_does_not_warn() {
    let sections = vec![component_section("prod", Product, &[], &[])];

    let (_, diags) = load(&sections, false, Product);

    assert!(diags.is_empty());
}

#[test]
fn symbol_names_use_table_and_primary_keys() {
    use ColumnKind::{Number, String};

    let def = Arc::new(
        TableDefinition::new("Registry", true)
            .with_column(ColumnDefinition::new("Root", Number, true))
            .with_column(ColumnDefinition::new("Key", String, true))
            .with_column(ColumnDefinition::new("Value", String, false)),
    );

    let table = Table::new(def)
        .with_row(Row::new(
            [Field::Number(2), "Software".into(), "x".into()],
            dl(1),
        ))
        .with_row(Row::new([Field::Null, "Key".into(), "y".into()], dl(2)));

    let sections = vec![section("frag", Fragment, vec![table])];
    let (loaded, _) = load(&sections, false, Unknown);

    let names: Vec<_> = loaded.symbols.iter().map(Symbol::name).collect();
    assert_eq!(names, vec!["Registry:2/Software", "Registry:/Key"]);
}

#[test]
fn non_symbol_tables_are_ignored() {
    let sections = vec![section(
        "frag",
        Fragment,
        vec![ref_table(&[("Component", "a")])],
    )];

    let (loaded, _) = load(&sections, false, Unknown);

    assert!(loaded.symbols.is_empty());
}

#[test]
fn first_definition_owns_later_are_duplicates() {
    let sections = vec![
        component_section("prod", Product, &["a"], &[]),
        component_section("frag1", Fragment, &["a", "b"], &[]),
        component_section("frag2", Fragment, &["a"], &[]),
    ];

    let (loaded, diags) = load(&sections, false, Unknown);

    // Duplicates are not diagnosed here;
    //   that depends on reachability.
    assert!(diags.is_empty());
    assert_eq!(2, loaded.symbols.len());

    let owner = loaded.symbols.find("Component:a").expect("missing owner");
    assert_eq!(SectionIndex::new(0), owner.section());

    let dup_sections: Vec<_> =
        owner.duplicates().iter().map(Symbol::section).collect();
    assert_eq!(dup_sections, vec![SectionIndex::new(1), SectionIndex::new(2)]);

    let with_dups: Vec<_> =
        loaded.symbols.with_duplicates().map(Symbol::name).collect();
    assert_eq!(with_dups, vec!["Component:a"]);
}

#[test]
fn identical_rows_tolerated_when_allowed() {
    let sections = vec![
        section("prod", Product, vec![sym_table("Property", &[("P", "1")])]),
        section("frag", Fragment, vec![sym_table("Property", &[("P", "1")])]),
    ];

    let (loaded, diags) = load(&sections, true, Unknown);

    let owner = loaded.symbols.find("Property:P").expect("missing owner");
    assert_eq!(SectionIndex::new(0), owner.section());
    assert!(!owner.has_duplicates());
    assert_eq!(0, loaded.symbols.with_duplicates().count());

    assert_eq!(
        diags.into_vec(),
        vec![LinkMessage::IdenticalDuplicateRow {
            name: "Property:P".into(),
            span: dl(1),
            original_span: dl(1),
        }]
    );
}

#[test]
fn identical_rows_are_duplicates_when_not_allowed() {
    let sections = vec![
        section("prod", Product, vec![sym_table("Property", &[("P", "1")])]),
        section("frag", Fragment, vec![sym_table("Property", &[("P", "1")])]),
    ];

    let (loaded, diags) = load(&sections, false, Unknown);

    assert!(diags.is_empty());
    assert_eq!(1, loaded.symbols.with_duplicates().count());
}

#[test]
fn differing_rows_are_duplicates_even_when_identical_allowed() {
    let sections = vec![
        section("prod", Product, vec![sym_table("Property", &[("P", "1")])]),
        section("frag", Fragment, vec![sym_table("Property", &[("P", "2")])]),
    ];

    let (loaded, diags) = load(&sections, true, Unknown);

    assert!(diags.is_empty());
    assert_eq!(
        1,
        loaded
            .symbols
            .find("Property:P")
            .map(|sym| sym.duplicates().len())
            .unwrap_or_default()
    );
}

#[test]
fn loading_is_idempotent() {
    let sections = vec![
        component_section("frag", Fragment, &["a", "b"], &["c"]),
        component_section("prod", Product, &["c", "a"], &[]),
        component_section("bundle", Bundle, &["b"], &[]),
    ];

    let (first, first_diags) = load(&sections, false, Product);
    let (second, second_diags) = load(&sections, false, Product);

    assert_eq!(first, second);
    assert_eq!(first_diags, second_diags);
}
