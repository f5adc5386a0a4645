// Installer section linker
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

//! The [linker][] is responsible for combining individually compiled
//!   [sections](section::Section) into a single consistent,
//!   duplicate-free set ready for binary generation.
//!
//! [linker]: https://en.wikipedia.org/wiki/Linker_(computing)
//!
//! Linking happens in three phases,
//!   each of which reads the output of the last:
//!
//!   1. [`symbol::load_symbols`] locates the entry section and builds the
//!        global [symbol table](symbol::SymbolTable);
//!   2. [`resolve::resolve`] determines which sections are reachable from
//!        the entry section by following
//!        [simple references](section::SimpleReference);
//!   3. [`conflict::report_conflicts`] reports duplicate symbols among the
//!        reachable sections.
//!
//! [`Linker`] runs all three in order.
//!
//! Sections are never modified by the linker and no phase takes ownership
//!   of them;
//!     symbols and results refer back to sections by
//!     [`SectionIndex`](section::SectionIndex).
//!
//! Diagnostics
//! -----------
//! No phase fails outright.
//! Warnings and errors are pushed into a [`LinkDiagnostics`] collector
//!   owned by the caller,
//!     and each phase runs to completion so that every problem is reported
//!     in a single pass.

pub mod conflict;
pub mod error;
pub mod link;
pub mod policy;
pub mod resolve;
pub mod section;
pub mod symbol;

#[cfg(test)]
mod dummy;

pub use error::{LinkDiagnostics, LinkMessage};
pub use link::{LinkOptions, Linked, Linker};
pub use policy::TablePolicy;
