use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::UnitPayload;
use super::generator::UnitDataGenerator;

/// Shared count of screening units actually dispatched to workers.
///
/// The launch path increments it; the unit source only reads it. Reads are not
/// coordinated with in-flight launches, so the cap is a soft bound: concurrent
/// dispatchers can overshoot it by the number of units in flight.
#[derive(Debug, Clone, Default)]
pub struct LaunchCounter(Arc<AtomicU64>);

impl LaunchCounter {
    /// Record one dispatched screening unit and return the new total.
    pub fn record_launch(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn launched(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }
}

/// Capped source of screening unit payloads for a single run.
#[derive(Debug)]
pub struct ScreeningUnitSource {
    generator: Option<UnitDataGenerator>,
    cap: u64,
    launched: LaunchCounter,
}

impl ScreeningUnitSource {
    pub fn new(generator: Option<UnitDataGenerator>, cap: u64) -> Self {
        Self {
            generator,
            cap,
            launched: LaunchCounter::default(),
        }
    }

    /// Whether screening units are generated on the fly. Without a generator
    /// the caller must supply screening units by other means.
    pub fn should_generate(&self) -> bool {
        self.generator.is_some()
    }

    /// Next screening payload, or `None` when the cap is exceeded or the
    /// generator is exhausted.
    ///
    /// The check is `launched > cap`, so one unit beyond the nominal cap may
    /// still go out while it is in flight.
    pub fn next_unit(&mut self) -> Option<UnitPayload> {
        let launched = self.launched.launched();
        if launched > self.cap {
            warn!(launched, cap = self.cap, "screening unit cap exceeded");
            return None;
        }

        let generator = self.generator.as_mut()?;
        let payload = generator.next_payload();
        match &payload {
            Some(_) => debug!(
                launched,
                produced = generator.produced(),
                "generated screening unit"
            ),
            None => debug!(launched, "screening unit generator exhausted"),
        }
        payload
    }

    pub fn launch_counter(&self) -> LaunchCounter {
        self.launched.clone()
    }

    pub fn launched(&self) -> u64 {
        self.launched.launched()
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }
}
