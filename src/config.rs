use crate::error::{MeterError, Result};
use std::time::Duration;

pub const DEFAULT_CLIENT_NAME: &str = "k20";
pub const DEFAULT_REFRESH_RATE: f32 = 30.0;

/// How readings leave the process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    /// One numeric line per audio block on stdout
    Dump,
    /// Full-screen bar graph
    Screen,
    /// Bar graph redrawn in place on the current line with ANSI escapes
    Ansi,
}

/// Configuration for a meter run
#[derive(Clone, Debug)]
pub struct MeterConfig {
    pub client_name: String,
    pub mode: OutputMode,
    pub refresh_rate: f32,
    pub verbose: bool,
    pub color: bool,
    pub bold: bool,
    pub sources: Vec<String>,
    pub monitor: bool,
    pub debug: bool,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            mode: OutputMode::Screen,
            refresh_rate: DEFAULT_REFRESH_RATE,
            verbose: false,
            color: true,
            bold: true,
            sources: Vec::new(),
            monitor: false,
            debug: false,
        }
    }
}

impl MeterConfig {
    /// Reject settings that would make the display loop meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.refresh_rate.is_finite() || self.refresh_rate <= 0.0 {
            return Err(MeterError::InvalidRefreshRate(self.refresh_rate));
        }
        Ok(())
    }

    /// Time between display refreshes
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.refresh_rate)
    }
}
