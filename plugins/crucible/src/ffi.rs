//! C entry points matching `crucible.h`.
//!
//! All functions use the `C-unwind` ABI: ending a path unwinds through the
//! calling C frames back to the runner.

use std::borrow::Cow;
use std::ffi::{c_char, c_int, CStr};

/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned value.
unsafe fn c_str<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("<unknown>")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

fn c_line(line: c_int) -> u32 {
    u32::try_from(line).unwrap_or(0)
}

/// # Safety
///
/// `file` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C-unwind" fn crucible_assume(x: u8, file: *const c_char, line: c_int) {
    crate::assume(x != 0, &c_str(file), c_line(line));
}

/// # Safety
///
/// `file` must be null or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C-unwind" fn crucible_assert(x: u8, file: *const c_char, line: c_int) {
    crate::assert(x != 0, &c_str(file), c_line(line));
}

macro_rules! c_factory {
    ($($symbol:ident => $factory:ident: $ty:ty;)*) => {
        $(
            /// # Safety
            ///
            /// `name` must be null or a valid NUL-terminated string.
            #[no_mangle]
            pub unsafe extern "C-unwind" fn $symbol(name: *const c_char) -> $ty {
                crate::$factory(&c_str(name))
            }
        )*
    };
}

c_factory! {
    crucible_int8_t => int8: i8;
    crucible_int16_t => int16: i16;
    crucible_int32_t => int32: i32;
    crucible_int64_t => int64: i64;
    crucible_size_t => size: usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FindingKind, RunConfig, Runner};
    use std::ffi::CString;

    fn runner() -> Runner {
        Runner::new(RunConfig {
            iterations: 16,
            seed: Some(2),
            ..RunConfig::default()
        })
    }

    #[test]
    fn assert_attributes_c_location() {
        let file = CString::new("harness.c").unwrap();
        let report = runner().run("c_assert", || unsafe {
            crucible_assert(0, file.as_ptr(), 27);
        });
        let finding = &report.findings()[0];
        assert_eq!(finding.kind, FindingKind::AssertionFailed);
        assert_eq!(finding.location.to_string(), "harness.c:27");
    }

    #[test]
    fn null_strings_are_accepted() {
        let report = runner().run("c_null", || unsafe {
            let x = crucible_int8_t(std::ptr::null());
            crucible_assume((x >= 0) as u8, std::ptr::null(), -1);
            crucible_assert((x >= 0) as u8, std::ptr::null(), -1);
        });
        assert!(report.is_success());
    }

    #[test]
    fn names_reach_the_model() {
        let name = CString::new("len").unwrap();
        let file = CString::new("harness.c").unwrap();
        let report = runner().run("c_names", || unsafe {
            let n = crucible_size_t(name.as_ptr());
            crucible_assert((n == usize::MAX) as u8, file.as_ptr(), 3);
        });
        assert_eq!(report.findings()[0].model.bindings()[0].name, "len");
    }
}
