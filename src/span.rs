// Source locations of linker inputs
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

//! Mapping of linker inputs back to authored source lines.
//!
//! A [`Span`] is the location of some section, row, or reference within
//!   the authoring source that the compiler was given.
//! Unlike compiler spans,
//!   which are byte intervals to be resolved lazily,
//!   the compiler has already resolved everything we receive into a source
//!   file ([`Context`]) and an optional 1-indexed line number.
//! That is all the diagnostic system needs to point the user at the
//!   offending authoring construct.
//!
//! ```
//! use instld::span::{Context, Span};
//!
//! let ctx = Context::from("product.wxs");
//! let span = ctx.line(12);
//!
//! assert_eq!(Some(12), span.line_num());
//! assert_eq!(&ctx, span.context());
//! assert_eq!("product.wxs:12", span.to_string());
//!
//! // Line numbers are optional.
//! assert_eq!("product.wxs", ctx.span().to_string());
//! ```
//!
//! Spans order first by [`Context`] and then by line,
//!   which gives diagnostic output a stable order when callers choose to
//!   sort it.
//!
//! A [`Context`] is reference-counted rather than interned,
//!   so that independent link operations share nothing but immutable
//!   data and can run on separate threads.

use std::{
    fmt::{self, Display},
    num::NonZeroU32,
    path::Path,
    sync::Arc,
};

/// Source file (or other named origin) of linker input.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Context(Arc<str>);

impl Context {
    /// Produce a [`Span`] referencing the given 1-indexed line of this
    ///   context.
    ///
    /// A line of `0` is not a line;
    ///   it produces a span covering the entire context.
    pub fn line(&self, line: u32) -> Span {
        Span {
            ctx: self.clone(),
            line: NonZeroU32::new(line),
        }
    }

    /// Produce a [`Span`] for the context as a whole.
    pub fn span(&self) -> Span {
        Span {
            ctx: self.clone(),
            line: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Context {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for Context {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl AsRef<Path> for Context {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

/// Name of the context used when an origin is not known.
const UNKNOWN_CONTEXT_NAME: &str = "<unknown>";

/// Location of some linker input within its [`Context`].
///
/// See the [module-level documentation](self) for more information.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Span {
    ctx: Context,
    line: Option<NonZeroU32>,
}

impl Span {
    /// A placeholder span indicating that a span is expected but is not
    ///   known.
    pub fn unknown() -> Self {
        Context::from(UNKNOWN_CONTEXT_NAME).span()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// 1-indexed line number,
    ///   if known.
    pub fn line_num(&self) -> Option<u32> {
        self.line.map(NonZeroU32::get)
    }

    /// Whether this span is [`Span::unknown`].
    pub fn is_unknown(&self) -> bool {
        self.line.is_none() && self.ctx.as_str() == UNKNOWN_CONTEXT_NAME
    }
}

assert_eq_size!(Span, Option<Span>);

impl Default for Span {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.ctx, line),
            None => Display::fmt(&self.ctx, f),
        }
    }
}
