// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SV-COMP style harness API on top of `crucible`.
//!
//! These shims carry no source location in their signatures; they are
//! `#[track_caller]` so findings point at the harness line that called them.

use std::ffi::c_char;
use std::panic::Location;

extern crate self as verifier;

pub use crucible::Symbolic;

#[cfg(feature = "ffi")]
pub mod ffi;

/// Message of the finding raised by [`error`].
pub const REACH_ERROR: &str = "reach_error";

/// Non-zero means true.
#[inline(never)]
#[track_caller]
pub fn assume(cond: i32) {
    let caller = Location::caller();
    crucible::assume(cond != 0, caller.file(), caller.line());
}

/// Reaching this call is a failure.
#[inline(never)]
#[track_caller]
pub fn error() -> ! {
    let caller = Location::caller();
    crucible::fail(REACH_ERROR, caller.file(), caller.line())
}

/// Unnamed: every call is a new value, whatever the name binding.
#[inline(never)]
pub fn nondet_uint() -> u32 {
    crucible::unnamed(|| crucible::uint32("__VERIFIER_nondet_uint"))
}

#[allow(clippy::unnecessary_cast)]
#[inline(never)]
pub fn nondet_char() -> c_char {
    crucible::unnamed(|| crucible::int8("__VERIFIER_nondet_char")) as c_char
}

/// Unnamed value of any symbolic type.
pub fn nondet<T: Symbolic>() -> T {
    crucible::unnamed(|| T::symbolic(std::any::type_name::<T>()))
}
