//! Scheduled and periodic stat events
//!
//! Events fire in tick order; events scheduled for the same tick fire in
//! the order they were scheduled. A repeating event is re-queued at the
//! first multiple of its period past the servicing tick.

use crate::stats::{CountingEngine, DumpScope, Statistics, StatsError};
use crate::time::Tick;
use std::collections::BTreeMap;
use tracing::debug;

/// A pending dump and/or reset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatEvent {
    pub when: Tick,
    pub dump: bool,
    pub reset: bool,
    /// Re-queue period. `None` (or zero) fires once.
    pub repeat: Option<Tick>,
}

#[derive(Debug, Default)]
pub struct StatEventQueue {
    events: BTreeMap<(Tick, u64), StatEvent>,
    next_seq: u64,
}

impl StatEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a dump and/or reset at `when`.
    pub fn schedule(&mut self, dump: bool, reset: bool, when: Tick, repeat: Option<Tick>) {
        let repeat = repeat.filter(|period| *period > 0);
        self.push(StatEvent {
            when,
            dump,
            reset,
            repeat,
        });
    }

    /// Dump every `period` ticks starting at `now + period`. A zero period
    /// schedules nothing.
    pub fn periodic_dump(&mut self, period: Tick, now: Tick) {
        if period == 0 {
            return;
        }
        self.schedule(true, false, now + period, Some(period));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Tick of the earliest pending event.
    pub fn next_due(&self) -> Option<Tick> {
        self.events.keys().next().map(|(when, _)| *when)
    }

    /// Fire every event due at or before `now`. Returns how many fired.
    ///
    /// Stats only hold their current values, so an overdue event dumps at
    /// `now` (or at the last dump tick, if that is later) rather than at the
    /// tick it was due. Overdue periods of a repeating event collapse into a
    /// single firing, and the next occurrence is queued before the event
    /// runs so a failed dump does not drop it.
    pub fn service<E: CountingEngine>(
        &mut self,
        now: Tick,
        stats: &mut Statistics<E>,
    ) -> Result<usize, StatsError> {
        let mut fired = 0;
        while self.next_due().is_some_and(|when| when <= now) {
            let Some((_, event)) = self.events.pop_first() else {
                break;
            };
            if let Some(period) = event.repeat {
                let elapsed = (now - event.when) / period + 1;
                self.push(StatEvent {
                    when: event.when + elapsed * period,
                    ..event
                });
            }

            let at = now.max(stats.last_dump());
            debug!(
                due = event.when,
                tick = at,
                dump = event.dump,
                reset = event.reset,
                "firing stat event"
            );
            if event.dump {
                stats.dump(at, DumpScope::Root)?;
            }
            if event.reset {
                stats.reset()?;
            }
            fired += 1;
        }
        Ok(fired)
    }

    fn push(&mut self, event: StatEvent) {
        self.events.insert((event.when, self.next_seq), event);
        self.next_seq += 1;
    }
}
