// src/progress/pattern.rs

use regex::Regex;

use crate::errors::{HostexecError, Result};

/// Regex that pulls a progress number out of a status line.
///
/// Capture group 1 is used when the pattern has groups, otherwise the whole
/// match. The number is divided by `scale` (100 by default, i.e. a percent)
/// and clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct PercentPattern {
    regex: Regex,
    scale: f32,
}

pub const DEFAULT_SCALE: f32 = 100.0;

impl PercentPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    pub fn from_regex(regex: Regex) -> Self {
        Self {
            regex,
            scale: DEFAULT_SCALE,
        }
    }

    /// Use `scale` as the value that means "100%".
    pub fn with_scale(mut self, scale: f32) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(HostexecError::ConfigError(format!(
                "progress scale must be a positive number (got {scale})"
            )));
        }
        self.scale = scale;
        Ok(self)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Fraction extracted from `text`, or `None` if the pattern does not
    /// match or the captured text is not a number.
    pub fn extract(&self, text: &str) -> Option<f32> {
        let caps = self.regex.captures(text)?;
        let group = if self.regex.captures_len() > 1 { 1 } else { 0 };
        let value: f32 = caps.get(group)?.as_str().trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some((value / self.scale).clamp(0.0, 1.0))
    }
}
