//! Tally Output - Sink configuration
//!
//! Turns sink URLs into [`Output`](tally_core::stats::Output) sinks and
//! loads the settings that say which sinks a run uses.

mod config_error;
mod factory;
mod settings;
mod sink_url;
mod text;

pub use config_error::ConfigError;
pub use factory::{SinkConstructor, SinkFactories, StructuredOptions};
pub use settings::StatsSettings;
pub use sink_url::{OptionValue, SinkOptions, SinkUrl};
pub use text::TextSink;
