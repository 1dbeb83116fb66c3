// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `__VERIFIER_*` symbols for C harnesses. Findings raised through these
//! are attributed to this file, since C callers carry no location.

#![allow(non_snake_case)]

use std::ffi::{c_char, c_int, c_uint};

#[no_mangle]
pub extern "C-unwind" fn __VERIFIER_assume(cond: c_int) {
    verifier::assume(cond);
}

#[no_mangle]
pub extern "C-unwind" fn __VERIFIER_error() -> ! {
    verifier::error()
}

#[no_mangle]
pub extern "C-unwind" fn __VERIFIER_nondet_uint() -> c_uint {
    verifier::nondet_uint()
}

#[no_mangle]
pub extern "C-unwind" fn __VERIFIER_nondet_char() -> c_char {
    verifier::nondet_char()
}
