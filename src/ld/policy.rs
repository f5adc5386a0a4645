// Table classification for linking
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

//! Which tables the linker treats specially.
//!
//! The linker knows nothing about the table schema,
//!   but a few table names carry meaning during linking:
//!
//!   - the cross-reference table holding [`SimpleReference`] facts;
//!   - media tables,
//!       whose references are skipped when building a merge module;
//!   - conflict-exempt tables,
//!       whose same-named rows are expected and are never reported as
//!       conflicting duplicates.
//!
//! These are policy data rather than code so that callers can adjust them.
//!
//! [`SimpleReference`]: super::section::SimpleReference

use fxhash::FxHashSet;

/// Default cross-reference table.
pub const SIMPLE_REFERENCE_TABLE: &str = "WixSimpleReference";

/// Default media table.
pub const MEDIA_TABLE: &str = "Media";

/// Action sequencing table;
///   duplicate actions are resolved by sequencing downstream.
pub const ACTION_TABLE: &str = "WixAction";

/// Variable table;
///   later values are expected to shadow earlier ones.
pub const VARIABLE_TABLE: &str = "WixVariable";

/// How the linker treats a table,
///   as classified by [`TablePolicy::classify`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TableKind {
    SimpleReference,
    Media,
    ConflictExempt,
    Other,
}

/// Table names with special meaning during linking.
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TablePolicy {
    simple_reference_table: String,
    media_tables: FxHashSet<String>,
    conflict_exempt_tables: FxHashSet<String>,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            simple_reference_table: SIMPLE_REFERENCE_TABLE.into(),
            media_tables: [MEDIA_TABLE].iter().map(|&s| s.into()).collect(),
            conflict_exempt_tables: [ACTION_TABLE, VARIABLE_TABLE]
                .iter()
                .map(|&s| s.into())
                .collect(),
        }
    }
}

impl TablePolicy {
    /// A policy with no special tables other than the cross-reference
    ///   table `simple_reference_table`.
    pub fn empty<S: Into<String>>(simple_reference_table: S) -> Self {
        Self {
            simple_reference_table: simple_reference_table.into(),
            media_tables: FxHashSet::default(),
            conflict_exempt_tables: FxHashSet::default(),
        }
    }

    pub fn with_media_table<S: Into<String>>(mut self, name: S) -> Self {
        self.media_tables.insert(name.into());
        self
    }

    pub fn with_conflict_exempt_table<S: Into<String>>(
        mut self,
        name: S,
    ) -> Self {
        self.conflict_exempt_tables.insert(name.into());
        self
    }

    /// Stop exempting `name` from conflict reporting.
    pub fn without_conflict_exempt_table(mut self, name: &str) -> Self {
        self.conflict_exempt_tables.remove(name);
        self
    }

    pub fn simple_reference_table(&self) -> &str {
        &self.simple_reference_table
    }

    pub fn is_simple_reference(&self, table: &str) -> bool {
        self.simple_reference_table == table
    }

    pub fn is_media(&self, table: &str) -> bool {
        self.media_tables.contains(table)
    }

    pub fn is_conflict_exempt(&self, table: &str) -> bool {
        self.conflict_exempt_tables.contains(table)
    }

    pub fn classify(&self, table: &str) -> TableKind {
        if self.is_simple_reference(table) {
            TableKind::SimpleReference
        } else if self.is_media(table) {
            TableKind::Media
        } else if self.is_conflict_exempt(table) {
            TableKind::ConflictExempt
        } else {
            TableKind::Other
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_policy_classifies_known_tables() {
        let sut = TablePolicy::default();

        assert_eq!(
            TableKind::SimpleReference,
            sut.classify("WixSimpleReference")
        );
        assert_eq!(TableKind::Media, sut.classify("Media"));
        assert_eq!(TableKind::ConflictExempt, sut.classify("WixAction"));
        assert_eq!(TableKind::ConflictExempt, sut.classify("WixVariable"));
        assert_eq!(TableKind::Other, sut.classify("Component"));
    }

    #[test]
    fn exemptions_are_configurable() {
        let sut = TablePolicy::default()
            .without_conflict_exempt_table(VARIABLE_TABLE)
            .with_conflict_exempt_table("Property");

        assert!(sut.is_conflict_exempt("WixAction"));
        assert!(sut.is_conflict_exempt("Property"));
        assert!(!sut.is_conflict_exempt("WixVariable"));
    }

    #[test]
    fn empty_policy_has_only_reference_table() {
        let sut = TablePolicy::empty("Refs");

        assert!(sut.is_simple_reference("Refs"));
        assert!(!sut.is_simple_reference(SIMPLE_REFERENCE_TABLE));
        assert!(!sut.is_media(MEDIA_TABLE));
        assert!(!sut.is_conflict_exempt(ACTION_TABLE));
    }
}
