// text.rs - Plain-text stats sink
//
// One line per value, named by the full dotted group path. The file is
// created on the first dump and every later dump is appended as another
// Begin/End section.

use crate::{ConfigError, SinkOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tally_core::stats::{Flags, Output, SinkError, StatInfo, StatValue};
use tracing::debug;

const BEGIN_BANNER: &str = "---------- Begin Simulation Statistics ----------";
const END_BANNER: &str = "---------- End Simulation Statistics   ----------";

#[derive(Debug)]
pub struct TextSink {
    path: PathBuf,
    descriptions: bool,
    groups: Vec<String>,
    writer: Option<BufWriter<File>>,
}

impl TextSink {
    pub fn new(path: impl Into<PathBuf>, descriptions: bool) -> Self {
        Self {
            path: path.into(),
            descriptions,
            groups: Vec::new(),
            writer: None,
        }
    }

    /// Build from URL options. Understands `desc` (default `True`).
    pub fn from_options(path: &str, mut options: SinkOptions) -> Result<Self, ConfigError> {
        let descriptions = options.take_bool("desc", true)?;
        options.finish()?;
        Ok(Self::new(path, descriptions))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn descriptions(&self) -> bool {
        self.descriptions
    }

    fn writer(&mut self) -> Result<&mut BufWriter<File>, SinkError> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => {
                debug!(path = %self.path.display(), "opening text stats file");
                BufWriter::new(File::create(&self.path)?)
            }
        };
        Ok(self.writer.insert(writer))
    }

    fn full_name(&self, name: &str) -> String {
        let mut full = String::new();
        for group in &self.groups {
            full.push_str(group);
            full.push('.');
        }
        full.push_str(name);
        full
    }

    fn line(&mut self, name: &str, value: f64, desc: &str) -> Result<(), SinkError> {
        let descriptions = self.descriptions;
        let out = self.writer()?;
        let value = format_value(value);
        if descriptions && !desc.is_empty() {
            writeln!(out, "{name:<40} {value:>20}  # {desc}")?;
        } else {
            writeln!(out, "{name:<40} {value:>20}")?;
        }
        Ok(())
    }
}

fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else if value.is_finite() {
        format!("{value:.6}")
    } else {
        value.to_string()
    }
}

impl Output for TextSink {
    /// A sink without a path has nowhere to write.
    fn valid(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    fn begin(&mut self) -> Result<(), SinkError> {
        self.groups.clear();
        let out = self.writer()?;
        writeln!(out)?;
        writeln!(out, "{BEGIN_BANNER}")?;
        Ok(())
    }

    fn end(&mut self) -> Result<(), SinkError> {
        if !self.groups.is_empty() {
            return Err(SinkError::UnbalancedGroup);
        }
        let out = self.writer()?;
        writeln!(out)?;
        writeln!(out, "{END_BANNER}")?;
        out.flush()?;
        Ok(())
    }

    fn begin_group(&mut self, name: &str) -> Result<(), SinkError> {
        self.groups.push(name.to_string());
        Ok(())
    }

    fn end_group(&mut self) -> Result<(), SinkError> {
        self.groups.pop().map(|_| ()).ok_or(SinkError::UnbalancedGroup)
    }

    fn visit(&mut self, info: &StatInfo, value: &StatValue) -> Result<(), SinkError> {
        if !info.is_displayed() {
            return Ok(());
        }
        let flags = info.flags();
        if flags.contains(Flags::NOZERO) && value.is_zero() {
            return Ok(());
        }
        if flags.contains(Flags::NONAN) && value.is_nan() {
            return Ok(());
        }

        let name = self.full_name(info.name());
        match value {
            StatValue::Scalar(v) => self.line(&name, *v, info.desc()),
            StatValue::Vector(values) => {
                for (idx, v) in values.iter().enumerate() {
                    self.line(&format!("{name}::{idx}"), *v, info.desc())?;
                }
                if flags.contains(Flags::TOTAL) {
                    self.line(&format!("{name}::total"), value.total(), info.desc())?;
                }
                Ok(())
            }
        }
    }
}
