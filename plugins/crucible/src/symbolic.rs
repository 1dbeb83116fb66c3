//! The `Symbolic` trait: unconstrained values of common types.

use crate::session;

/// Types that can be produced as unconstrained values.
pub trait Symbolic: Sized {
    /// Create a new symbolic value of this type. `name` is used to refer to
    /// the value when printing counterexamples.
    fn symbolic(name: &str) -> Self;

    /// Create a new symbolic value on which `f` returns `true`. Paths where
    /// it does not are pruned.
    #[track_caller]
    fn symbolic_where<F: FnOnce(&Self) -> bool>(name: &str, f: F) -> Self {
        let value = Self::symbolic(name);
        let location = std::panic::Location::caller();
        crate::assume(f(&value), location.file(), location.line());
        value
    }
}

macro_rules! integer_symbolic {
    ($($ty:ty, $factory:ident;)*) => {
        $(
            impl Symbolic for $ty {
                #[inline(always)]
                fn symbolic(name: &str) -> Self {
                    crate::$factory(name)
                }
            }
        )*
    };
}

integer_symbolic! {
    i8, int8;
    i16, int16;
    i32, int32;
    i64, int64;
    u8, uint8;
    u16, uint16;
    u32, uint32;
    u64, uint64;
    usize, size;
}

impl Symbolic for isize {
    fn symbolic(name: &str) -> Self {
        isize::from_ne_bytes(crate::size(name).to_ne_bytes())
    }
}

impl Symbolic for () {
    fn symbolic(_name: &str) -> Self {}
}

impl Symbolic for bool {
    fn symbolic(name: &str) -> Self {
        session::draw(name, 1, false) == 1
    }
}

impl Symbolic for char {
    /// Any Unicode scalar value. Surrogates and out-of-range code points are
    /// folded back into range rather than pruned.
    fn symbolic(name: &str) -> Self {
        let raw = crate::uint32(name) % (char::MAX as u32 + 1);
        char::from_u32(raw).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl<T: Symbolic> Symbolic for Option<T> {
    fn symbolic(name: &str) -> Self {
        if bool::symbolic(&format!("{name}?")) {
            Some(T::symbolic(name))
        } else {
            None
        }
    }
}

impl<T: Symbolic, E: Symbolic> Symbolic for Result<T, E> {
    fn symbolic(name: &str) -> Self {
        if bool::symbolic(&format!("{name}?")) {
            Ok(T::symbolic(name))
        } else {
            Err(E::symbolic(name))
        }
    }
}

impl<T: Symbolic, const N: usize> Symbolic for [T; N] {
    fn symbolic(name: &str) -> Self {
        std::array::from_fn(|i| T::symbolic(&format!("{name}[{i}]")))
    }
}

macro_rules! tuple_symbolic {
    ($(($($idx:tt $ty:ident),*);)*) => {
        $(
            impl<$($ty: Symbolic),*> Symbolic for ($($ty,)*) {
                fn symbolic(name: &str) -> Self {
                    ($($ty::symbolic(&format!("{}.{}", name, $idx)),)*)
                }
            }
        )*
    };
}

tuple_symbolic! {
    (0 A);
    (0 A, 1 B);
    (0 A, 1 B, 2 C);
    (0 A, 1 B, 2 C, 3 D);
    (0 A, 1 B, 2 C, 3 D, 4 E);
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
}

/// Take a symbolic-length prefix of `xs`; the length is anywhere in
/// `0..=xs.len()`.
pub fn prefix<'a, T>(name: &str, xs: &'a [T]) -> &'a [T] {
    let len = crate::size(name) % (xs.len() + 1);
    &xs[..len]
}
