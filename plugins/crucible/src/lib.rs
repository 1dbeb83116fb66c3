//! Verification harness API.
//!
//! Harnesses describe the inputs they care about with symbolic values,
//! narrow them with [`assume`], and state what must hold with [`assert`].
//! The reference engine in this crate ([`Runner`]) executes a harness many
//! times, drawing every symbolic value from a seeded strategy, and reports
//! each violated assertion together with the values that led to it.
//!
//! ```
//! use crucible::{assuming, check};
//!
//! let report = crucible::Runner::default().run("div", || {
//!     let x = crucible::int32("x");
//!     assuming!(x != 0);
//!     check!(x / x == 1);
//! });
//! assert!(report.is_success());
//! ```

extern crate self as crucible;

pub use crucible_macros::*;

mod config;
mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
mod report;
mod runner;
mod session;
mod strategy;
mod symbolic;

pub use config::{NameBinding, RunConfig};
pub use error::{Error, Result};
pub use report::{Binding, Finding, FindingKind, Location, Model, Report};
pub use runner::Runner;
pub use symbolic::{prefix, Symbolic};

/// Only paths on which `cond` holds are of interest; the current path is
/// discarded otherwise.
#[inline(never)]
pub fn assume(cond: bool, file: &str, line: u32) {
    session::assume(cond, Location::new(file, line));
}

/// `cond` must hold; a violation is reported against `file:line` and ends
/// the current path.
#[inline(never)]
pub fn assert(cond: bool, file: &str, line: u32) {
    session::assert(cond, Location::new(file, line));
}

/// Report an unconditional failure at `file:line`.
#[inline(never)]
pub fn fail(message: &str, file: &str, line: u32) -> ! {
    session::fail(
        FindingKind::Error {
            message: message.to_string(),
        },
        Location::new(file, line),
    )
}

#[inline(never)]
pub fn int8(name: &str) -> i8 {
    session::draw(name, 8, true) as u8 as i8
}

#[inline(never)]
pub fn int16(name: &str) -> i16 {
    session::draw(name, 16, true) as u16 as i16
}

#[inline(never)]
pub fn int32(name: &str) -> i32 {
    session::draw(name, 32, true) as u32 as i32
}

#[inline(never)]
pub fn int64(name: &str) -> i64 {
    session::draw(name, 64, true) as i64
}

#[inline(never)]
pub fn size(name: &str) -> usize {
    session::draw(name, usize::BITS, false) as usize
}

pub fn uint8(name: &str) -> u8 {
    u8::from_ne_bytes(int8(name).to_ne_bytes())
}

pub fn uint16(name: &str) -> u16 {
    u16::from_ne_bytes(int16(name).to_ne_bytes())
}

pub fn uint32(name: &str) -> u32 {
    u32::from_ne_bytes(int32(name).to_ne_bytes())
}

pub fn uint64(name: &str) -> u64 {
    u64::from_ne_bytes(int64(name).to_ne_bytes())
}

/// Run `f` so that the values it draws are never bound to their names:
/// under [`NameBinding::Shared`] each draw is still fresh.
pub fn unnamed<T>(f: impl FnOnce() -> T) -> T {
    session::unnamed(f)
}

pub fn any<T: Symbolic>(name: &str) -> T {
    T::symbolic(name)
}

#[inline(always)]
#[track_caller]
pub fn any_where<T: Symbolic, F: FnOnce(&T) -> bool>(name: &str, f: F) -> T {
    T::symbolic_where(name, f)
}

/// Install a `tracing` subscriber filtered by `RUST_LOG` that writes through
/// the test harness's captured output. Does nothing if one is already set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Assume `cond` at the current source location.
#[macro_export]
macro_rules! assuming {
    ($cond:expr $(,)?) => {
        $crate::assume($cond, file!(), line!())
    };
}

/// Assert `cond` at the current source location.
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        $crate::assert($cond, file!(), line!())
    };
}
