// Linker diagnostics
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

//! Messages produced while linking.
//!
//! None of these are returned as [`Err`];
//!   every phase pushes them into a [`LinkDiagnostics`] collector and keeps
//!   going,
//!     so that a single link reports every problem it can find.

use super::section::SectionType;
use crate::{
    diagnose::{Annotate, AnnotatedSpan, Diagnostic, Diagnostics, Level},
    span::Span,
};
use thiserror::Error;

/// Collector of [`LinkMessage`]s.
pub type LinkDiagnostics = Diagnostics<LinkMessage>;

/// A warning or error found while linking.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum LinkMessage {
    /// More than one entry-capable section was found.
    ///
    /// The first entry section wins;
    ///   one of these is reported for each additional one.
    #[error("multiple entry sections found: `{first}` and `{second}`")]
    AmbiguousEntryPoint {
        first: String,
        first_span: Span,
        second: String,
        second_span: Span,
    },

    /// An entry section's type does not match the type of output the
    ///   caller expected.
    #[error(
        "entry section `{section}` is a {found}, \
         but {expected} output was expected"
    )]
    UnexpectedEntryType {
        section: String,
        span: Span,
        expected: SectionType,
        found: SectionType,
    },

    /// A row redefined a symbol with exactly the same field values and
    ///   identical rows were permitted.
    #[error("identical rows define symbol `{name}`")]
    IdenticalDuplicateRow {
        name: String,
        span: Span,
        original_span: Span,
    },

    /// A reachable symbol is defined more than once.
    ///
    /// This is followed by a [`LinkMessage::DuplicateSymbolLocation`] for
    ///   each reachable duplicate definition.
    #[error("duplicate symbol `{name}`")]
    ConflictingDuplicateSymbol { name: String, span: Span },

    /// Location of one of the duplicates of a preceding
    ///   [`LinkMessage::ConflictingDuplicateSymbol`].
    #[error("location of duplicate symbol `{name}`")]
    DuplicateSymbolLocation { name: String, span: Span },

    /// A section references a symbol that no section defines.
    #[error("unresolved reference to symbol `{name}`")]
    UnresolvedReference { name: String, span: Span },

    /// No entry-capable section was provided.
    #[error("no entry section found for {expected} output")]
    MissingEntrySection { expected: SectionType },
}

impl Diagnostic for LinkMessage {
    fn describe(&self) -> Vec<AnnotatedSpan> {
        use LinkMessage::*;

        match self {
            AmbiguousEntryPoint {
                first,
                first_span,
                second_span,
                ..
            } => vec![
                second_span.error("this is an additional entry section"),
                first_span
                    .note(format!("`{first}` was already chosen as the entry")),
                second_span
                    .help("a link must have exactly one product, module, "),
                second_span.help("  patch, patch creation, or bundle section"),
            ],

            UnexpectedEntryType {
                span,
                expected,
                found,
                ..
            } => span
                .warning(format!("this {found} is the entry section"))
                .with_help(format!("expected a {expected} section"))
                .into(),

            IdenticalDuplicateRow {
                span,
                original_span,
                ..
            } => vec![
                span.warning("this row is identical to an earlier one"),
                original_span.note("first defined here"),
            ],

            ConflictingDuplicateSymbol { span, .. } => {
                vec![span.error("first defined here")]
            }

            DuplicateSymbolLocation { span, .. } => {
                vec![span.error("redefined here")]
            }

            UnresolvedReference { span, .. } => vec![
                span.error("referenced here"),
                span.help("no section included in the link defines it"),
            ],

            MissingEntrySection { .. } => vec![],
        }
    }

    fn level(&self) -> Level {
        use LinkMessage::*;

        match self {
            UnexpectedEntryType { .. } | IdenticalDuplicateRow { .. } => {
                Level::Warning
            }

            AmbiguousEntryPoint { .. }
            | ConflictingDuplicateSymbol { .. }
            | DuplicateSymbolLocation { .. }
            | UnresolvedReference { .. }
            | MissingEntrySection { .. } => Level::Error,
        }
    }
}
