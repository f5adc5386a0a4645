// Tests for compiled sections
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
use crate::ld::{dummy::*, policy::SIMPLE_REFERENCE_TABLE};
use crate::span::dummy::dl;

#[test]
fn entry_capable_types() {
    use SectionType::*;

    for ty in [Product, Module, PatchCreation, Patch, Bundle] {
        assert!(ty.is_entry(), "{ty} should be entry-capable");
    }

    assert!(!Fragment.is_entry());
    assert!(!Unknown.is_entry());
}

#[test]
fn primary_keys_default_to_first_column() {
    use ColumnKind::String;

    let def = TableDefinition::new("Property", true)
        .with_column(ColumnDefinition::new("Property", String, false))
        .with_column(ColumnDefinition::new("Value", String, false));

    assert_eq!(vec![0], def.primary_key_indexes());
}

#[test]
fn primary_keys_in_column_order() {
    use ColumnKind::{Number, String};

    let def = TableDefinition::new("Shortcut", true)
        .with_column(ColumnDefinition::new("Name", String, false))
        .with_column(ColumnDefinition::new("Dir", String, true))
        .with_column(ColumnDefinition::new("Seq", Number, true));

    assert_eq!(vec![1, 2], def.primary_key_indexes());
}

#[test]
fn symbol_name_joins_primary_keys() {
    use ColumnKind::{Number, String};

    let def = Arc::new(
        TableDefinition::new("Shortcut", true)
            .with_column(ColumnDefinition::new("Dir", String, true))
            .with_column(ColumnDefinition::new("Seq", Number, true))
            .with_column(ColumnDefinition::new("X", String, false)),
    );

    let table = Table::new(def);
    let row = Row::new(
        [Field::from("Desktop"), Field::Number(5), "ignored".into()],
        dl(1),
    );

    assert_eq!("Shortcut:Desktop/5", table.symbol_name(&row));
}

#[test]
fn symbol_name_of_short_row_uses_empty_keys() {
    let table = Table::new(sym_def("Component"));
    let row = Row::new(Vec::<Field>::new(), dl(1));

    assert_eq!("Component:", table.symbol_name(&row));
}

#[test]
fn field_str_of_missing_or_non_string_is_empty() {
    let row =
        Row::new([Field::from("a"), Field::Number(1), Field::Null], dl(1));

    assert_eq!("a", row.field_str(0));
    assert_eq!("", row.field_str(1));
    assert_eq!("", row.field_str(2));
    assert_eq!("", row.field_str(3));
}

#[test]
fn field_from_option() {
    assert_eq!(Field::Null, Field::from(None::<&str>));
    assert_eq!(Field::Number(3), Field::from(Some(3i64)));
    assert_eq!("", Field::Null.to_string());
}

#[test]
fn identical_rows_ignore_location() {
    let a = Row::new(["x", "y"], dl(1));
    let b = Row::new(["x", "y"], dl(50));
    let c = Row::new(["x", "z"], dl(1));

    assert!(a.is_identical(&b));
    assert!(!a.is_identical(&c));
}

#[test]
fn simple_references_read_only_reference_tables() {
    let policy = TablePolicy::default();

    let sut = section(
        "frag",
        SectionType::Fragment,
        vec![
            ref_table(&[("Component", "a")]),
            sym_table("Component", &[("b", "frag")]),
            ref_table(&[("File", "f1"), ("Directory", "d")]),
        ],
    );

    let refs: Vec<_> = sut
        .simple_references(&policy)
        .map(|r| (r.target_name(), r.span().clone()))
        .collect();

    assert_eq!(
        refs,
        vec![
            ("Component:a".to_string(), dl(100)),
            ("File:f1".to_string(), dl(100)),
            ("Directory:d".to_string(), dl(101)),
        ]
    );
}

#[test]
fn simple_references_follow_policy_table_name() {
    let policy = TablePolicy::empty("OtherRefs");
    let sut = component_section("frag", SectionType::Fragment, &[], &["a"]);

    assert_eq!(0, sut.simple_references(&policy).count());
}

#[test]
fn symbol_tables_exclude_reference_tables() {
    let sut = component_section("frag", SectionType::Fragment, &["a"], &["b"]);

    let names: Vec<_> = sut.symbol_tables().map(Table::name).collect();
    assert_eq!(names, vec!["Component"]);

    assert!(sut.table(SIMPLE_REFERENCE_TABLE).is_some());
    assert!(sut.table("Missing").is_none());
}
