/*
 * mailfmt - lib.rs
 *
 * Copyright 2024 mailfmt Contributors
 *
 * This file is part of mailfmt.
 *
 * mailfmt is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * mailfmt is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with mailfmt. If not, see <http://www.gnu.org/licenses/>.
 */

#![deny(
    rustdoc::redundant_explicit_links,
    unsafe_op_in_unsafe_fn,
    /* groups */
    clippy::correctness,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    /* restriction */
    clippy::dbg_macro,
    clippy::rc_buffer,
    clippy::as_underscore,
    /* rustdoc */
    rustdoc::broken_intra_doc_links
)]
#![allow(clippy::option_if_let_else, clippy::missing_const_for_fn)]
#![doc = include_str!("../README.md")]
//!
//! ## Description
//!
//! Everything here is a pure function over caller-supplied values; the only
//! shared state is the read-only [`CONTACT_PALETTE`](color::CONTACT_PALETTE)
//! constant, which any number of threads may read without synchronization.
//!
//! - Render structured addresses and recipient lists (see module
//!   [`address`])
//! - Render message timestamps relative to the current instant (see module
//!   [`datetime`])
//! - Assign a deterministic palette color per contact name (see module
//!   [`color`])

pub mod address;
pub use address::*;
pub mod color;
pub use color::*;
pub mod datetime;
pub use datetime::{
    format_date_brief, format_date_detailed, format_date_smart, UnixTimestamp,
};
pub mod error;
pub use error::*;

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate serde_derive;
pub extern crate log;
pub extern crate smallvec;
