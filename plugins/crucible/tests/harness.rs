//! Harnesses driven through `#[crucible::test]`.

use crucible::{assuming, check};

#[crucible::test]
fn assume_bool() {
    let b: bool = crucible::any("b");
    assuming!(b);
    if !b {
        panic!("Assumption failed");
    }
}

#[crucible::test]
fn assume_i32() {
    let x = crucible::int32("x");
    assuming!(x != 0);
    let _ = 11 / x; // cannot panic
}

#[crucible::test]
#[crucible::expect_fail]
fn assert_false() {
    let b: bool = crucible::any("b");
    crucible::assert(b, file!(), line!());
}

#[crucible::test]
#[crucible::expect_fail]
fn override_assert_macro() {
    let b: bool = crucible::any("b");
    assert!(b, "I used \"assert!\"");
}

#[crucible::test]
#[crucible::expect_fail]
#[crucible::seed(7)]
fn override_asserteq_macro() {
    let a = crucible::uint32("a");
    let b = crucible::uint32("b");
    assert_eq!(a, b, "I used \"assert_eq!\"");
}

/// A classic overflow when checking before adding two numbers.
#[crucible::test]
#[crucible::expect_fail]
fn overflow() -> u32 {
    let a = crucible::uint32("a");
    let b = crucible::uint32("b");
    if a + b < u32::MAX {
        a + b
    } else {
        u32::MAX
    }
}

#[crucible::test]
#[crucible::iterations(512)]
fn overflow_fixed() -> u32 {
    let a = crucible::uint32("a");
    let b = crucible::uint32("b");
    if a < u32::MAX - b {
        a + b
    } else {
        u32::MAX
    }
}

#[crucible::test]
#[crucible::name_binding(shared)]
fn shared_names_are_bit_consistent() {
    let signed = crucible::int16("x");
    let unsigned = crucible::uint16("x");
    check!(signed.to_ne_bytes() == unsigned.to_ne_bytes());
}

#[crucible::test]
fn bounded_loop() {
    let n = crucible::uint8("n");
    assuming!(n < 10);
    let mut i = 0;
    while i < n {
        i += 1;
    }
    check!(i == n);
}

#[crucible::test]
fn symbolic_where_holds() {
    let x = crucible::any_where::<i64, _>("x", |x| (-5..5).contains(x));
    check!(x.abs() < 5);
}

#[crucible::test]
fn prefix_is_bounded() {
    let data = [1u8, 2, 3, 4];
    let head = crucible::prefix("len", &data);
    check!(head.len() <= data.len());
    check!(data.starts_with(head));
}
