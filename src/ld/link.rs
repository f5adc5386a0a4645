// Linker facade
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

//! Run each phase of the link in order.
//!
//! ```text
//!   sections --> load_symbols --> resolve --> report_conflicts --> Linked
//!                     |              |               |
//!                     v              v               v
//!                  diagnostics (warnings and errors, in order found)
//! ```
//!
//! The [`Linker`] never stops early because of an error;
//!   the caller inspects the [`LinkDiagnostics`] afterward and decides
//!   whether the [`Linked`] result is usable
//!     (see [`Diagnostics::has_errors`]).
//! The only case in which no result is produced is when there is no entry
//!   section to resolve from.
//!
//! [`Diagnostics::has_errors`]: crate::diagnose::Diagnostics::has_errors

use super::{
    conflict::report_conflicts,
    error::{LinkDiagnostics, LinkMessage},
    policy::TablePolicy,
    resolve::{resolve, Resolution},
    section::{Section, SectionIndex, SectionType},
    symbol::{load_symbols, LoadedSymbols, Symbol, SymbolTable},
};
use tracing::{debug, info_span};

/// Per-link configuration.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct LinkOptions {
    /// Tolerate rows that redefine a symbol with identical field values,
    ///   emitting a warning instead of recording a duplicate.
    pub allow_identical_rows: bool,

    /// Type of output expected from the link,
    ///   or [`SectionType::Unknown`] to accept any entry section.
    pub expected_type: SectionType,

    /// Whether a merge module is being built.
    ///
    /// If [`None`],
    ///   this is derived from the type of the entry section.
    pub building_merge_module: Option<bool>,

    pub policy: TablePolicy,
}

/// Links sections according to [`LinkOptions`].
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, Clone, Default)]
pub struct Linker {
    opts: LinkOptions,
}

impl Linker {
    pub fn new(opts: LinkOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.opts
    }

    /// Link `sections`,
    ///   pushing every warning and error into `diags`.
    ///
    /// Returns [`None`] only if no entry section exists,
    ///   in which case [`LinkMessage::MissingEntrySection`] is emitted.
    /// Otherwise a [`Linked`] result is always returned,
    ///   even if errors were emitted.
    pub fn link<'a>(
        &'a self,
        sections: &'a [Section],
        diags: &mut LinkDiagnostics,
    ) -> Option<Linked<'a>> {
        let _span = info_span!("link", sections = sections.len()).entered();
        let opts = &self.opts;

        let LoadedSymbols { entry, symbols } = load_symbols(
            sections,
            opts.allow_identical_rows,
            opts.expected_type,
            diags,
        );

        let Some(entry) = entry else {
            diags.push(LinkMessage::MissingEntrySection {
                expected: opts.expected_type,
            });

            return None;
        };

        let building_merge_module = opts.building_merge_module.unwrap_or_else(
            || {
                entry
                    .get(sections)
                    .map(|section| section.ty() == SectionType::Module)
                    .unwrap_or(false)
            },
        );

        debug!(building_merge_module, "resolving from entry section {entry}");

        let resolution = resolve(
            sections,
            entry,
            &symbols,
            building_merge_module,
            &opts.policy,
        );

        diags.extend(resolution.unresolved().iter().map(|unresolved| {
            LinkMessage::UnresolvedReference {
                name: unresolved.reference.target_name(),
                span: unresolved.reference.span().clone(),
            }
        }));

        report_conflicts(&symbols, &resolution, &opts.policy, diags);

        Some(Linked {
            sections,
            entry,
            symbols,
            resolution,
        })
    }
}

/// Result of a [`Linker::link`].
///
/// This borrows from the linked sections and can be handed to the next
///   stage of the toolchain to determine what to emit.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Linked<'a> {
    sections: &'a [Section],
    entry: SectionIndex,
    symbols: SymbolTable<'a>,
    resolution: Resolution<'a>,
}

impl<'a> Linked<'a> {
    pub fn entry(&self) -> SectionIndex {
        self.entry
    }

    pub fn entry_section(&self) -> Option<&'a Section> {
        self.entry.get(self.sections)
    }

    /// Sections reachable from the entry section,
    ///   in the order they were first visited.
    pub fn resolved_sections(
        &self,
    ) -> impl Iterator<Item = &'a Section> + '_ {
        let sections = self.sections;

        self.resolution
            .sections()
            .iter()
            .filter_map(move |index| index.get(sections))
    }

    pub fn is_resolved(&self, section: SectionIndex) -> bool {
        self.resolution.is_resolved(section)
    }

    /// The complete symbol table,
    ///   including symbols of unreachable sections.
    pub fn symbols(&self) -> &SymbolTable<'a> {
        &self.symbols
    }

    /// Symbols looked up by at least one reachable reference.
    pub fn referenced_symbols(&self) -> impl Iterator<Item = &Symbol<'a>> {
        self.resolution
            .referenced_symbols()
            .iter()
            .filter_map(|&index| self.symbols.get(index))
    }

    pub fn resolution(&self) -> &Resolution<'a> {
        &self.resolution
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ld::{dummy::*, policy::MEDIA_TABLE, section::SectionType::*};

    fn ids<'a>(linked: &Linked<'a>) -> Vec<&'a str> {
        linked.resolved_sections().map(Section::id).collect()
    }

    #[test]
    fn links_reachable_sections() {
        let sections = vec![
            component_section("prod", Product, &[], &["FeatureX"]),
            component_section("fragA", Fragment, &["FeatureX"], &["CompY"]),
            component_section("fragB", Fragment, &["CompY"], &[]),
            component_section("unused", Fragment, &["Z"], &[]),
        ];

        let sut = Linker::default();
        let mut diags = LinkDiagnostics::new();
        let linked = sut.link(&sections, &mut diags).expect("no result");

        assert!(diags.is_empty());
        assert_eq!(Some("prod"), linked.entry_section().map(Section::id));
        assert_eq!(ids(&linked), vec!["prod", "fragA", "fragB"]);
        assert_eq!(3, linked.symbols().len());

        let referenced: Vec<_> =
            linked.referenced_symbols().map(Symbol::name).collect();
        assert_eq!(referenced, vec!["Component:FeatureX", "Component:CompY"]);
    }

    #[test]
    fn missing_entry_section_is_fatal() {
        let sections = vec![component_section("frag", Fragment, &["a"], &[])];

        let sut = Linker::new(LinkOptions {
            expected_type: Product,
            ..Default::default()
        });

        let mut diags = LinkDiagnostics::new();

        assert_eq!(None, sut.link(&sections, &mut diags));
        assert_eq!(
            diags.into_vec(),
            vec![LinkMessage::MissingEntrySection { expected: Product }]
        );
    }

    #[test]
    fn unresolved_references_become_errors() {
        let sections = vec![
            component_section("prod", Product, &[], &["a", "missing"]),
            component_section("frag", Fragment, &["a"], &[]),
        ];

        let sut = Linker::default();
        let mut diags = LinkDiagnostics::new();
        let linked = sut.link(&sections, &mut diags);

        assert!(linked.is_some());
        assert!(diags.has_errors());
        assert_eq!(
            diags.into_vec(),
            vec![LinkMessage::UnresolvedReference {
                name: "Component:missing".into(),
                // Second reference row of the section.
                span: crate::span::dummy::dl(101),
            }]
        );
    }

    #[test]
    fn phases_report_in_order() {
        let sections = vec![
            component_section("prod", Product, &["a"], &["x", "nope"]),
            component_section("x", Fragment, &["x", "a"], &[]),
            component_section("bundle", Bundle, &[], &[]),
        ];

        let sut = Linker::default();
        let mut diags = LinkDiagnostics::new();
        sut.link(&sections, &mut diags);

        let kinds: Vec<_> = diags
            .iter()
            .map(|msg| match msg {
                LinkMessage::AmbiguousEntryPoint { .. } => "ambiguous",
                LinkMessage::UnresolvedReference { .. } => "unresolved",
                LinkMessage::ConflictingDuplicateSymbol { .. } => "conflict",
                LinkMessage::DuplicateSymbolLocation { .. } => "location",
                _ => "other",
            })
            .collect();

        assert_eq!(
            kinds,
            vec!["ambiguous", "unresolved", "conflict", "location"]
        );
    }

    fn module_with_media() -> Vec<Section> {
        vec![
            section("module", Module, vec![ref_table(&[(MEDIA_TABLE, "1")])]),
            section(
                "media",
                Fragment,
                vec![sym_table(MEDIA_TABLE, &[("1", "disk")])],
            ),
        ]
    }

    #[test]
    fn merge_module_derived_from_entry_type() {
        let sections = module_with_media();

        let sut = Linker::default();
        let mut diags = LinkDiagnostics::new();
        let linked = sut.link(&sections, &mut diags).expect("no result");

        assert_eq!(ids(&linked), vec!["module"]);
    }

    #[test]
    fn merge_module_can_be_overridden() {
        let sections = module_with_media();

        let sut = Linker::new(LinkOptions {
            building_merge_module: Some(false),
            ..Default::default()
        });

        let mut diags = LinkDiagnostics::new();
        let linked = sut.link(&sections, &mut diags).expect("no result");

        assert_eq!(ids(&linked), vec!["module", "media"]);
    }

    #[test]
    fn identical_rows_option_is_honored() {
        let sections = vec![
            section(
                "prod",
                Product,
                vec![
                    sym_table("Property", &[("P", "1")]),
                    ref_table(&[("Component", "c")]),
                ],
            ),
            section(
                "frag",
                Fragment,
                vec![
                    sym_table("Property", &[("P", "1")]),
                    sym_table("Component", &[("c", "frag")]),
                ],
            ),
        ];

        let strict = Linker::default();
        let mut diags = LinkDiagnostics::new();
        strict.link(&sections, &mut diags);
        assert!(diags.has_errors());

        let lenient = Linker::new(LinkOptions {
            allow_identical_rows: true,
            ..Default::default()
        });
        let mut diags = LinkDiagnostics::new();
        lenient.link(&sections, &mut diags);
        assert!(!diags.has_errors());
        assert_eq!(1, diags.warnings().count());
    }
}
