//! Host wall-clock and callback-backed stats

use crate::next_stat_id;
use std::time::{Duration, Instant};
use tally_core::stats::{Flags, Stat, StatInfo, StatValue};

/// Host seconds elapsed since the last reset, sampled at prepare time.
#[derive(Debug)]
pub struct HostSeconds {
    info: StatInfo,
    started: Instant,
    elapsed: Duration,
}

impl HostSeconds {
    pub fn new(name: impl Into<String>, desc: impl Into<String>) -> Self {
        Self {
            info: StatInfo::new(next_stat_id(), name, desc, Flags::visible()),
            started: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Elapsed time captured by the last prepare.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Stat for HostSeconds {
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Scalar(self.elapsed.as_secs_f64())
    }

    fn prepare(&mut self) {
        self.elapsed = self.started.elapsed();
    }

    fn reset(&mut self) {
        self.started = Instant::now();
        self.elapsed = Duration::ZERO;
    }
}

/// A stat whose value comes from a callback, sampled at prepare time.
pub struct Value<F> {
    info: StatInfo,
    sample: F,
    cached: f64,
}

impl<F> Value<F>
where
    F: Fn() -> f64,
{
    pub fn new(name: impl Into<String>, desc: impl Into<String>, sample: F) -> Self {
        Self {
            info: StatInfo::new(next_stat_id(), name, desc, Flags::visible()),
            sample,
            cached: 0.0,
        }
    }
}

impl<F> Stat for Value<F>
where
    F: Fn() -> f64,
{
    fn info(&self) -> &StatInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut StatInfo {
        &mut self.info
    }

    fn value(&self) -> StatValue {
        StatValue::Scalar(self.cached)
    }

    fn prepare(&mut self) {
        self.cached = (self.sample)();
    }

    // The source owns the state.
    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn host_seconds_sampled_on_prepare() {
        let mut host = HostSeconds::new("host_seconds", "");
        assert_eq!(host.value(), StatValue::Scalar(0.0));

        std::thread::sleep(Duration::from_millis(2));
        host.prepare();
        assert!(host.elapsed() >= Duration::from_millis(2));

        host.reset();
        assert_eq!(host.elapsed(), Duration::ZERO);
    }

    #[test]
    fn value_follows_source() {
        let source = Rc::new(Cell::new(7.0));
        let sampled = Rc::clone(&source);
        let mut value = Value::new("ticks", "", move || sampled.get());

        value.prepare();
        assert_eq!(value.value(), StatValue::Scalar(7.0));

        source.set(9.0);
        value.reset();
        assert_eq!(value.value(), StatValue::Scalar(7.0));
        value.prepare();
        assert_eq!(value.value(), StatValue::Scalar(9.0));
    }
}
