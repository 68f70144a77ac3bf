//! Sink factory registry
//!
//! Maps URL schemes to sink constructors. The defaults route bare paths,
//! `file://` and `text://` to [`TextSink`]; `h5://` validates its options
//! and then reports that the structured backend is unavailable unless an
//! application registers one with [`SinkFactories::register_structured`].

use crate::{ConfigError, SinkOptions, SinkUrl, TextSink};
use std::collections::HashMap;
use tally_core::stats::Output;
use tracing::debug;

/// Constructor for a sink: receives the URL path and its decoded options.
pub type SinkConstructor = Box<dyn Fn(&str, SinkOptions) -> Result<Box<dyn Output>, ConfigError>>;

/// Options understood by the structured (`h5://`) format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StructuredOptions {
    /// Number of dumps buffered per chunk.
    pub chunking: u64,
    pub descriptions: bool,
    pub formulas: bool,
}

impl Default for StructuredOptions {
    fn default() -> Self {
        Self {
            chunking: 10,
            descriptions: true,
            formulas: true,
        }
    }
}

impl StructuredOptions {
    pub fn from_options(mut options: SinkOptions) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let parsed = Self {
            chunking: options.take_unsigned("chunking", defaults.chunking)?,
            descriptions: options.take_bool("desc", defaults.descriptions)?,
            formulas: options.take_bool("formulas", defaults.formulas)?,
        };
        options.finish()?;
        Ok(parsed)
    }
}

pub struct SinkFactories {
    constructors: HashMap<String, SinkConstructor>,
}

impl SinkFactories {
    /// A registry with no schemes at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry with the built-in text and structured schemes.
    pub fn new() -> Self {
        let mut factories = Self::empty();
        for scheme in ["", "file", "text"] {
            factories.register(scheme, |path, options| {
                let sink = TextSink::from_options(path, options)?;
                Ok(Box::new(sink) as Box<dyn Output>)
            });
        }
        factories.register("h5", |_path, options| {
            let url = options.url().to_string();
            StructuredOptions::from_options(options)?;
            Err(ConfigError::FormatUnavailable { format: "HDF5", url })
        });
        factories
    }

    /// Register (or replace) the constructor for `scheme`.
    pub fn register<F>(&mut self, scheme: impl Into<String>, constructor: F)
    where
        F: Fn(&str, SinkOptions) -> Result<Box<dyn Output>, ConfigError> + 'static,
    {
        let scheme = scheme.into();
        debug!(scheme = %scheme, "registering stat sink factory");
        self.constructors.insert(scheme, Box::new(constructor));
    }

    /// Install a structured-format backend under `h5`.
    pub fn register_structured<F>(&mut self, constructor: F)
    where
        F: Fn(&str, StructuredOptions) -> Result<Box<dyn Output>, ConfigError> + 'static,
    {
        self.register("h5", move |path, options| {
            constructor(path, StructuredOptions::from_options(options)?)
        });
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse `url` and construct the sink its scheme names.
    pub fn build(&self, url: &str) -> Result<Box<dyn Output>, ConfigError> {
        let SinkUrl {
            scheme,
            path,
            options,
        } = SinkUrl::parse(url)?;
        let constructor =
            self.constructors
                .get(&scheme)
                .ok_or_else(|| ConfigError::UnknownScheme {
                    scheme: scheme.clone(),
                    url: url.to_string(),
                })?;
        constructor(&path, options)
    }
}

impl Default for SinkFactories {
    fn default() -> Self {
        Self::new()
    }
}
