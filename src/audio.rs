//! Audio input: device selection and the cpal input stream.
//!
//! Opening happens in two steps so the meter state can be created from the
//! device's sample rate before any callback runs:
//! [`select_input`] picks the device and its configuration, then
//! [`InputSelection::start`] moves a [`MeterProcessor`] into the stream.

use crate::config::MeterConfig;
use crate::error::{MeterError, Result};
use crate::meter::{MeterProcessor, Notifier};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::process::Command;
use tracing::{debug, error, info, warn};

/// RAII guard that sends stderr to /dev/null while ALSA enumerates devices,
/// so its diagnostics do not land on the meter display.
struct StderrSuppressor {
    saved_fd: i32,
    _dev_null: File,
}

impl StderrSuppressor {
    fn new() -> Option<Self> {
        let dev_null = File::open("/dev/null").ok()?;

        let saved_fd = unsafe { libc::dup(2) };
        if saved_fd < 0 {
            return None;
        }

        if unsafe { libc::dup2(dev_null.as_raw_fd(), 2) } < 0 {
            unsafe {
                libc::close(saved_fd);
            }
            return None;
        }

        Some(Self {
            saved_fd,
            _dev_null: dev_null,
        })
    }
}

impl Drop for StderrSuppressor {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.saved_fd, 2);
            libc::close(self.saved_fd);
        }
    }
}

/// PulseAudio source names: alphanumerics plus `. - _ : @`
fn is_valid_source_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '@'))
}

fn pactl(args: &[&str]) -> Option<String> {
    Command::new("pactl")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Pick the monitor of the default sink (or any monitor) from
/// `pactl list sources short` output.
fn find_monitor_source(sources: &str, default_sink: Option<&str>) -> Option<String> {
    let names: Vec<&str> = sources
        .lines()
        .filter_map(|line| line.split('\t').nth(1))
        .filter(|name| is_valid_source_name(name))
        .collect();

    if let Some(sink) = default_sink {
        let expected = format!("{sink}.monitor");
        if let Some(name) = names.iter().find(|n| **n == expected) {
            return Some(name.to_string());
        }
    }

    names
        .into_iter()
        .find(|n| n.ends_with(".monitor"))
        .map(str::to_string)
}

/// Makes the system output monitor the default input while the meter runs,
/// restoring the previous default source on drop.
pub struct MonitorSourceGuard {
    original: Option<String>,
}

impl MonitorSourceGuard {
    /// Returns `None` when no monitor source could be selected.
    fn install() -> Option<Self> {
        let original = pactl(&["get-default-source"]).filter(|s| is_valid_source_name(s));
        let default_sink = pactl(&["get-default-sink"]).filter(|s| is_valid_source_name(s));
        let sources = pactl(&["list", "sources", "short"])?;

        let monitor = find_monitor_source(&sources, default_sink.as_deref())?;
        pactl(&["set-default-source", &monitor])?;
        info!(%monitor, ?original, "monitoring system output");

        Some(Self { original })
    }
}

impl Drop for MonitorSourceGuard {
    fn drop(&mut self) {
        if let Some(ref orig) = self.original {
            debug!(source = %orig, "restoring default source");
            let _ = pactl(&["set-default-source", orig]);
        }
    }
}

/// Names of the input devices on the default host
pub fn list_devices() -> Result<Vec<String>> {
    let _quiet = StderrSuppressor::new();
    let host = cpal::default_host();
    let names = host
        .input_devices()?
        .filter_map(|d| d.name().ok())
        .collect();
    Ok(names)
}

/// Resolve the requested sources to a single input device.
///
/// Every name must match an input device. Repeating the device already chosen
/// is accepted; a second, different device is not.
fn resolve_sources(
    host: &cpal::Host,
    sources: &[String],
) -> Result<Option<(String, cpal::Device)>> {
    let mut chosen: Option<(String, cpal::Device)> = None;

    for source in sources {
        let device = host
            .input_devices()?
            .find(|d| d.name().map(|n| n == *source).unwrap_or(false))
            .ok_or_else(|| MeterError::SourceNotFound(source.clone()))?;

        match &chosen {
            Some((name, _)) if name == source => {
                debug!(%source, "source already connected");
            }
            Some((name, _)) => {
                return Err(MeterError::MultipleSources {
                    first: name.clone(),
                    second: source.clone(),
                });
            }
            None => chosen = Some((source.clone(), device)),
        }
    }

    Ok(chosen)
}

/// A chosen input device and the configuration it will run with
pub struct InputSelection {
    device: cpal::Device,
    name: String,
    config: cpal::StreamConfig,
    monitor: Option<MonitorSourceGuard>,
}

/// Choose the input device for `config`.
pub fn select_input(config: &MeterConfig) -> Result<InputSelection> {
    let quiet = StderrSuppressor::new();
    let host = cpal::default_host();
    debug!(host = ?host.id(), "audio host");

    let mut monitor = None;
    let device = match resolve_sources(&host, &config.sources)? {
        Some((_, device)) => device,
        None => {
            if config.monitor {
                monitor = MonitorSourceGuard::install();
                if monitor.is_none() {
                    warn!("no monitor source found, using default input");
                }
            }
            host.default_input_device().ok_or(MeterError::NoInputDevice)?
        }
    };

    let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
    let supported = device.default_input_config()?;
    drop(quiet);

    let channels = supported.channels();
    if channels == 0 {
        return Err(MeterError::NoChannels(name));
    }

    let sample_rate = supported.sample_rate().0;
    info!(device = %name, sample_rate, channels, "selected input");

    Ok(InputSelection {
        device,
        name,
        config: cpal::StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        },
        monitor,
    })
}

impl InputSelection {
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    pub fn device_name(&self) -> &str {
        &self.name
    }

    /// Register the callback and start the stream.
    ///
    /// `ready` is closed when the device goes away or the returned
    /// [`AudioInput`] is dropped.
    pub fn start(self, mut processor: MeterProcessor, ready: Notifier) -> Result<AudioInput> {
        let _quiet = StderrSuppressor::new();

        let on_error = {
            let ready = ready.clone();
            move |err: cpal::StreamError| match err {
                cpal::StreamError::DeviceNotAvailable => {
                    error!("audio device disappeared");
                    ready.close();
                }
                other => warn!(error = %other, "audio stream error"),
            }
        };

        let stream = self.device.build_input_stream(
            &self.config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| processor.process(data),
            on_error,
            None,
        )?;
        stream.play()?;
        info!(device = %self.name, "stream started");

        Ok(AudioInput {
            _stream: stream,
            ready,
            _monitor: self.monitor,
        })
    }
}

/// A running input stream. Dropping it stops the stream.
pub struct AudioInput {
    _stream: cpal::Stream,
    ready: Notifier,
    _monitor: Option<MonitorSourceGuard>,
}

impl Drop for AudioInput {
    fn drop(&mut self) {
        self.ready.close();
        debug!("stream closed");
    }
}
