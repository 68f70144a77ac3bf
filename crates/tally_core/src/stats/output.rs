//! Output sink contract
//!
//! A sink receives one bracketed traversal per dump:
//!
//! ```text
//! begin
//!   visit(stat)*
//!   begin_group(name) ... end_group     (nested, any depth)
//! end
//! ```
//!
//! Sinks must accept an empty traversal (no stats, no groups).

use crate::stats::{StatInfo, StatValue};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Errors raised by a sink while a dump is in progress.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("end_group called with no open group")]
    UnbalancedGroup,

    #[error("encoder error: {0}")]
    Encode(String),
}

/// Destination for stat dumps.
pub trait Output: fmt::Debug {
    /// Sinks that report themselves invalid are skipped for the whole dump.
    fn valid(&self) -> bool {
        true
    }

    fn begin(&mut self) -> Result<(), SinkError>;

    fn end(&mut self) -> Result<(), SinkError>;

    fn begin_group(&mut self, name: &str) -> Result<(), SinkError>;

    fn end_group(&mut self) -> Result<(), SinkError>;

    fn visit(&mut self, info: &StatInfo, value: &StatValue) -> Result<(), SinkError>;
}

/// One step of a traversal as seen by a [`Recorder`].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    Begin,
    BeginGroup(String),
    Stat { name: String, value: StatValue },
    EndGroup,
    End,
}

/// Shared view of everything a [`Recorder`] has received.
pub type EventLog = Rc<RefCell<Vec<RecordedEvent>>>;

/// Sink that records the traversal instead of encoding it.
///
/// Handy for debugging a registry layout and for asserting on traversal
/// order. The log and validity switch stay reachable after the recorder
/// has been handed to the controller.
#[derive(Debug)]
pub struct Recorder {
    log: EventLog,
    valid: Rc<Cell<bool>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            log: EventLog::default(),
            valid: Rc::new(Cell::new(true)),
        }
    }

    pub fn log(&self) -> EventLog {
        Rc::clone(&self.log)
    }

    /// Switch controlling what [`Output::valid`] reports.
    pub fn validity(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.valid)
    }

    fn push(&self, event: RecordedEvent) {
        self.log.borrow_mut().push(event);
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for Recorder {
    fn valid(&self) -> bool {
        self.valid.get()
    }

    fn begin(&mut self) -> Result<(), SinkError> {
        self.push(RecordedEvent::Begin);
        Ok(())
    }

    fn end(&mut self) -> Result<(), SinkError> {
        self.push(RecordedEvent::End);
        Ok(())
    }

    fn begin_group(&mut self, name: &str) -> Result<(), SinkError> {
        self.push(RecordedEvent::BeginGroup(name.to_string()));
        Ok(())
    }

    fn end_group(&mut self) -> Result<(), SinkError> {
        self.push(RecordedEvent::EndGroup);
        Ok(())
    }

    fn visit(&mut self, info: &StatInfo, value: &StatValue) -> Result<(), SinkError> {
        self.push(RecordedEvent::Stat {
            name: info.name().to_string(),
            value: value.clone(),
        });
        Ok(())
    }
}
