use std::fmt;
use std::iter::{FusedIterator, Peekable};

use super::domain::UnitPayload;

type PayloadIter = Box<dyn Iterator<Item = UnitPayload> + Send>;

enum GeneratorState {
    Active(Peekable<PayloadIter>),
    Exhausted,
}

/// Lazy, externally supplied sequence of screening unit payloads.
///
/// Once the underlying iterator reports the end the generator moves to a
/// terminal exhausted state and never polls it again.
pub struct UnitDataGenerator {
    state: GeneratorState,
    produced: u64,
}

impl UnitDataGenerator {
    pub fn new<I>(payloads: I) -> Self
    where
        I: IntoIterator<Item = UnitPayload>,
        I::IntoIter: Send + 'static,
    {
        let iter: PayloadIter = Box::new(payloads.into_iter());
        Self {
            state: GeneratorState::Active(iter.peekable()),
            produced: 0,
        }
    }

    /// Build a generator from a closure; returning `None` ends the sequence.
    pub fn from_fn<F>(produce: F) -> Self
    where
        F: FnMut() -> Option<UnitPayload> + Send + 'static,
    {
        Self::new(std::iter::from_fn(produce))
    }

    pub fn has_next(&mut self) -> bool {
        let available = match &mut self.state {
            GeneratorState::Active(iter) => iter.peek().is_some(),
            GeneratorState::Exhausted => return false,
        };
        if !available {
            self.state = GeneratorState::Exhausted;
        }
        available
    }

    pub fn next_payload(&mut self) -> Option<UnitPayload> {
        let next = match &mut self.state {
            GeneratorState::Active(iter) => iter.next(),
            GeneratorState::Exhausted => return None,
        };
        match next {
            Some(payload) => {
                self.produced += 1;
                Some(payload)
            }
            None => {
                self.state = GeneratorState::Exhausted;
                None
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, GeneratorState::Exhausted)
    }

    /// Number of payloads handed out so far.
    pub fn produced(&self) -> u64 {
        self.produced
    }
}

impl Iterator for UnitDataGenerator {
    type Item = UnitPayload;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_payload()
    }
}

impl FusedIterator for UnitDataGenerator {}

impl fmt::Debug for UnitDataGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitDataGenerator")
            .field("exhausted", &self.is_exhausted())
            .field("produced", &self.produced)
            .finish()
    }
}
