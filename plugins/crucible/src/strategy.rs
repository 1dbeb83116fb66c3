//! Sources of symbolic values for the reference engine.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::report::{Binding, Model};

/// Chooses the raw bits of every symbolic value drawn on a path.
pub(crate) trait Strategy {
    /// Bits for a `width`-bit value named `name`. Bits above `width` are
    /// ignored by the caller.
    fn choose(&mut self, name: &str, width: u32, signed: bool) -> Result<u64>;

    /// Called once the path is over.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

pub(crate) fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Uniform bits, biased towards the edges of the value range.
pub(crate) struct RandomStrategy {
    rng: SmallRng,
}

impl RandomStrategy {
    pub(crate) fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn boundary(&mut self, width: u32) -> u64 {
        let all = mask(width);
        let sign = 1u64 << (width - 1);
        match self.rng.gen_range(0..5) {
            0 => 0,
            1 => 1,
            2 => all,
            3 => sign,
            _ => all & !sign,
        }
    }
}

impl Strategy for RandomStrategy {
    fn choose(&mut self, _name: &str, width: u32, _signed: bool) -> Result<u64> {
        let bits = if self.rng.gen_ratio(1, 4) {
            self.boundary(width)
        } else {
            self.rng.gen::<u64>()
        };
        Ok(bits & mask(width))
    }
}

/// Replays the bindings of a recorded model in order.
pub(crate) struct ReplayStrategy {
    pending: VecDeque<Binding>,
    index: usize,
}

impl ReplayStrategy {
    pub(crate) fn new(model: &Model) -> Self {
        Self {
            pending: model.bindings().iter().cloned().collect(),
            index: 0,
        }
    }
}

impl Strategy for ReplayStrategy {
    fn choose(&mut self, name: &str, width: u32, _signed: bool) -> Result<u64> {
        let index = self.index;
        let binding = self.pending.pop_front().ok_or_else(|| Error::ReplayExhausted {
            index,
            name: name.to_string(),
        })?;
        self.index += 1;

        if binding.name != name || binding.width != width {
            return Err(Error::ReplayDivergence {
                index,
                expected: format!("{:?} ({} bits)", binding.name, binding.width),
                found: format!("{name:?} ({width} bits)"),
            });
        }
        Ok(binding.bits & mask(width))
    }

    fn finish(&mut self) -> Result<()> {
        match self.pending.front() {
            Some(binding) => Err(Error::ReplayUnconsumed {
                index: self.index,
                name: binding.name.clone(),
            }),
            None => Ok(()),
        }
    }
}
