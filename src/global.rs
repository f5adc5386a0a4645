// Global constants across the entire crate
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.
//!
//! Per-link configuration is not global;
//!   see [`LinkOptions`](crate::ld::LinkOptions).

/// Initial capacity of the resolver's depth-first stack.
///
/// The stack holds one frame per section on the current reference path.
/// The number is arbitrary and only intended to reduce initial small
///   re-allocations.
pub const RESOLVE_INIT_STACK_CAP: usize = 32;

/// Separator between primary key values in a symbol name.
pub const SYMBOL_KEY_SEPARATOR: &str = "/";

/// Separator between a table name and its primary keys in a symbol name.
pub const SYMBOL_TABLE_SEPARATOR: &str = ":";

/// Separator between ids in a rendered constraint cycle.
pub const CYCLE_CHAIN_SEPARATOR: &str = " -> ";
