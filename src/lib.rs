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

//! Linking stage of an installer package toolchain.
//!
//! Independently compiled [sections](ld::section::Section) are combined by
//!   the [linker](ld) into a single set of reachable,
//!   duplicate-free sections;
//!     see [`ld::Linker`].
//!
//! Independently of linking,
//!   [`order`] provides deterministic ordering of items under
//!   "must follow" constraints with cycle detection.
//!
//! Neither writes to a terminal or log file;
//!   problems are returned as [`diagnose::Diagnostics`] and events are
//!   emitted through [`tracing`] for the embedding tool to collect.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod diagnose;
pub mod ld;
pub mod order;
pub mod span;
