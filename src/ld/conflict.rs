// Duplicate symbol conflict reporting
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

//! Report duplicate symbols that survive reachability.
//!
//! [`load_symbols`](super::symbol::load_symbols) records every duplicate
//!   definition without complaint,
//!     since at that point it is not yet known which sections will be
//!     linked.
//! Once [`resolve`](super::resolve::resolve) has determined the reachable
//!   sections,
//!     only duplicates where both the owner and at least one duplicate are
//!     reachable are conflicts.
//! Duplicates in sections that were never reached are not reported.
//!
//! Symbols of [conflict-exempt tables](TablePolicy::is_conflict_exempt)
//!   are never reported.

use super::{
    error::{LinkDiagnostics, LinkMessage},
    policy::TablePolicy,
    resolve::Resolution,
    symbol::SymbolTable,
};
use tracing::{debug, instrument};

/// Report each reachable symbol that has reachable duplicates.
///
/// For each such symbol,
///   a [`LinkMessage::ConflictingDuplicateSymbol`] is emitted at the
///   owner's location followed by one
///   [`LinkMessage::DuplicateSymbolLocation`] per reachable duplicate,
///     in the order that the duplicates were defined.
///
/// Returns the number of conflicting symbols reported.
#[instrument(skip_all)]
pub fn report_conflicts(
    symbols: &SymbolTable,
    resolution: &Resolution,
    policy: &TablePolicy,
    diags: &mut LinkDiagnostics,
) -> usize {
    let mut conflicts = 0;

    for owner in symbols.with_duplicates() {
        if policy.is_conflict_exempt(owner.table().name())
            || !resolution.is_resolved(owner.section())
        {
            continue;
        }

        let mut dups = owner
            .duplicates()
            .iter()
            .filter(|dup| resolution.is_resolved(dup.section()))
            .peekable();

        if dups.peek().is_none() {
            continue;
        }

        conflicts += 1;

        diags.push(LinkMessage::ConflictingDuplicateSymbol {
            name: owner.name().into(),
            span: owner.span().clone(),
        });

        diags.extend(dups.map(|dup| LinkMessage::DuplicateSymbolLocation {
            name: dup.name().into(),
            span: dup.span().clone(),
        }));
    }

    debug!(conflicts, "duplicate symbols checked");

    conflicts
}
