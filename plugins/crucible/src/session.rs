//! Per-thread state of the path currently executing.
//!
//! A [`Session`] is installed by the runner for the duration of one path.
//! The public harness API consults it to draw values and to end the path
//! early. Paths end by unwinding with a [`PathSignal`] payload through
//! `resume_unwind`, which bypasses the panic hook.

use std::cell::{Cell, RefCell};
use std::panic::{self, PanicHookInfo};
use std::sync::Once;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::config::NameBinding;
use crate::error::Error;
use crate::report::{Binding, Finding, FindingKind, Location, Model};
use crate::strategy::{mask, Strategy};

/// Unwind payload used to end a path.
pub(crate) struct PathSignal;

/// How a path ended, when it did not simply return.
pub(crate) enum PathOutcome {
    Pruned(Location),
    Failed(Finding),
    Diverged(Error),
}

pub(crate) struct Session {
    strategy: Box<dyn Strategy>,
    name_binding: NameBinding,
    model: Model,
    shared: FxHashMap<String, u64>,
    outcome: Option<PathOutcome>,
    panic_location: Option<Location>,
}

impl Session {
    pub(crate) fn new(strategy: Box<dyn Strategy>, name_binding: NameBinding) -> Self {
        Self {
            strategy,
            name_binding,
            model: Model::new(),
            shared: FxHashMap::default(),
            outcome: None,
            panic_location: None,
        }
    }

    pub(crate) fn model(&self) -> &Model {
        &self.model
    }

    pub(crate) fn take_outcome(&mut self) -> Option<PathOutcome> {
        self.outcome.take()
    }

    pub(crate) fn take_panic_location(&mut self) -> Option<Location> {
        self.panic_location.take()
    }

    pub(crate) fn into_model(self) -> Model {
        self.model
    }

    /// Checks that the strategy has nothing left to hand out.
    pub(crate) fn finish(&mut self) -> Result<(), Error> {
        self.strategy.finish()
    }

    fn draw(&mut self, name: &str, width: u32, signed: bool) -> Result<u64, Error> {
        let shared = self.name_binding == NameBinding::Shared && UNNAMED.with(|depth| depth.get() == 0);
        if shared {
            if let Some(bits) = self.shared.get(name) {
                return Ok(bits & mask(width));
            }
        }

        let bits = self.strategy.choose(name, width, signed)? & mask(width);
        self.model.push(Binding {
            name: name.to_string(),
            width,
            signed,
            bits,
        });
        if shared {
            self.shared.insert(name.to_string(), bits);
        }
        Ok(bits)
    }
}

thread_local! {
    static SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
    static DETACHED_RNG: RefCell<Option<SmallRng>> = const { RefCell::new(None) };
    static UNNAMED: Cell<usize> = const { Cell::new(0) };
}

struct UnnamedScope;

impl Drop for UnnamedScope {
    fn drop(&mut self) {
        UNNAMED.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Runs `f` with every draw bypassing the shared-name cache. The scope is
/// left even when `f` ends the path.
pub(crate) fn unnamed<T>(f: impl FnOnce() -> T) -> T {
    UNNAMED.with(|depth| depth.set(depth.get() + 1));
    let _scope = UnnamedScope;
    f()
}

/// Installs `session` on this thread, returning whatever was installed before.
pub(crate) fn enter(session: Session) -> Option<Session> {
    SESSION.with(|cell| cell.borrow_mut().replace(session))
}

/// Removes this thread's session and reinstates `previous`.
pub(crate) fn exit(previous: Option<Session>) -> Option<Session> {
    SESSION.with(|cell| std::mem::replace(&mut *cell.borrow_mut(), previous))
}

pub(crate) fn is_active() -> bool {
    SESSION.with(|cell| cell.borrow().is_some())
}

fn end_path(outcome: impl FnOnce(&Session) -> PathOutcome) -> ! {
    SESSION.with(|cell| {
        if let Some(session) = cell.borrow_mut().as_mut() {
            let outcome = outcome(&*session);
            session.outcome = Some(outcome);
        }
    });
    panic::resume_unwind(Box::new(PathSignal))
}

/// Raw bits for a symbolic value. Never fails: outside a session the value
/// comes from a thread-local generator, and a replay error ends the path.
pub(crate) fn draw(name: &str, width: u32, signed: bool) -> u64 {
    let drawn = SESSION.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|session| session.draw(name, width, signed))
    });
    match drawn {
        Some(Ok(bits)) => bits,
        Some(Err(err)) => {
            tracing::warn!(name, width, error = %err, "replay diverged");
            end_path(|_| PathOutcome::Diverged(err))
        }
        None => detached_bits() & mask(width),
    }
}

fn detached_bits() -> u64 {
    DETACHED_RNG.with(|cell| {
        cell.borrow_mut()
            .get_or_insert_with(SmallRng::from_entropy)
            .gen::<u64>()
    })
}

pub(crate) fn assume(cond: bool, location: Location) {
    if cond {
        return;
    }
    if !is_active() {
        panic!("assumption violated outside of a harness at {location}");
    }
    tracing::trace!(%location, "path pruned");
    end_path(|_| PathOutcome::Pruned(location))
}

pub(crate) fn assert(cond: bool, location: Location) {
    if cond {
        return;
    }
    fail(FindingKind::AssertionFailed, location)
}

pub(crate) fn fail(kind: FindingKind, location: Location) -> ! {
    if !is_active() {
        panic!("{kind} at {location}");
    }
    tracing::debug!(%location, %kind, "finding");
    end_path(|session| PathOutcome::Failed(Finding::new(kind, location, session.model().clone())))
}

static HOOK: Once = Once::new();

/// Chains a panic hook that records the location of panics raised inside a
/// session and keeps them quiet. Panics on threads without a session go to
/// the previous hook.
pub(crate) fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            let captured = SESSION.with(|cell| match cell.try_borrow_mut() {
                Ok(mut slot) => match slot.as_mut() {
                    Some(session) => {
                        session.panic_location = info.location().map(Location::from);
                        true
                    }
                    None => false,
                },
                Err(_) => false,
            });
            if !captured {
                previous(info);
            }
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::RandomStrategy;

    fn session(binding: NameBinding) -> Session {
        Session::new(Box::new(RandomStrategy::from_seed(5)), binding)
    }

    #[test]
    fn fresh_binding_records_every_draw() {
        let mut s = session(NameBinding::Fresh);
        s.draw("x", 8, true).unwrap();
        s.draw("x", 8, true).unwrap();
        assert_eq!(s.model().len(), 2);
    }

    #[test]
    fn shared_binding_reuses_and_truncates() {
        let mut s = session(NameBinding::Shared);
        let wide = s.draw("x", 32, true).unwrap();
        let again = s.draw("x", 32, false).unwrap();
        let narrow = s.draw("x", 8, true).unwrap();
        assert_eq!(wide, again);
        assert_eq!(narrow, wide & 0xff);
        assert_eq!(s.model().len(), 1);
    }

    #[test]
    fn unnamed_draws_skip_the_shared_cache() {
        let mut s = session(NameBinding::Shared);
        let _ = unnamed(|| s.draw("n", 32, false).unwrap());
        let _ = unnamed(|| s.draw("n", 32, false).unwrap());
        assert_eq!(s.model().len(), 2);
        assert!(s.shared.is_empty());

        let named = s.draw("n", 32, false).unwrap();
        assert_eq!(s.draw("n", 32, false).unwrap(), named);
        assert_eq!(s.model().len(), 3);
    }

    #[test]
    fn unnamed_scope_survives_unwinding() {
        let result = panic::catch_unwind(|| {
            unnamed::<()>(|| panic::resume_unwind(Box::new(PathSignal)));
        });
        assert!(result.is_err());
        assert_eq!(UNNAMED.with(Cell::get), 0);
    }

    #[test]
    fn detached_draws_respect_width() {
        assert!(!is_active());
        for _ in 0..100 {
            assert!(draw("free", 16, true) <= 0xffff);
        }
    }

    #[test]
    #[should_panic(expected = "assumption violated outside of a harness at lib.rs:9")]
    fn detached_assume_panics() {
        assume(false, Location::new("lib.rs", 9));
    }

    #[test]
    #[should_panic(expected = "assertion failed at lib.rs:4")]
    fn detached_assert_panics() {
        assert(false, Location::new("lib.rs", 4));
    }

    #[test]
    fn enter_and_exit_nest() {
        assert!(enter(session(NameBinding::Fresh)).is_none());
        let outer = enter(session(NameBinding::Shared));
        assert!(outer.is_some());
        let inner = exit(outer).unwrap();
        assert_eq!(inner.name_binding, NameBinding::Shared);
        let restored = exit(None).unwrap();
        assert_eq!(restored.name_binding, NameBinding::Fresh);
        assert!(!is_active());
    }
}
