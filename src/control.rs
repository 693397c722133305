//! Control input: the user's reset and quit requests.
//!
//! The interactive loop makes one bounded wait per frame against a
//! [`ControlInput`]; whatever arrives (or the timeout) paces the refresh.

use crate::meter::SharedMeter;
use crate::terminal::wait_key;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use crossterm::event::{KeyCode, KeyModifiers};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Timeout elapsed with nothing to do
    Idle,
    /// Clear peaks and overs
    Reset,
    /// Toggle the key help
    Help,
    Quit,
}

pub trait ControlInput {
    /// Block for at most `timeout` waiting for the next request
    fn wait(&mut self, timeout: Duration) -> io::Result<Control>;
}

/// Keys in the full-screen display
pub fn key_to_control(code: KeyCode, modifiers: KeyModifiers) -> Control {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Control::Quit,
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char(' ') => Control::Reset,
        KeyCode::Char('?') => Control::Help,
        _ => Control::Idle,
    }
}

/// Key presses on the full-screen display
pub struct KeyControl;

impl ControlInput for KeyControl {
    fn wait(&mut self, timeout: Duration) -> io::Result<Control> {
        Ok(match wait_key(timeout)? {
            Some((code, modifiers)) => key_to_control(code, modifiers),
            None => Control::Idle,
        })
    }
}

/// Spawn a thread that calls `on_line` for every line read; it stops at EOF,
/// on a read error, or when `on_line` returns false.
fn spawn_line_reader<R, F>(reader: R, mut on_line: F) -> io::Result<()>
where
    R: BufRead + Send + 'static,
    F: FnMut() -> bool + Send + 'static,
{
    thread::Builder::new()
        .name("k20-control".to_string())
        .spawn(move || {
            for line in reader.lines() {
                if line.is_err() || !on_line() {
                    break;
                }
            }
            tracing::debug!("control input closed");
        })?;
    Ok(())
}

/// Line-oriented control channel: any line requests a reset.
pub struct LineControl {
    lines: Receiver<()>,
    open: bool,
}

impl LineControl {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> io::Result<Self> {
        let (tx, rx) = channel::unbounded();
        spawn_line_reader(reader, move || tx.send(()).is_ok())?;
        Ok(Self {
            lines: rx,
            open: true,
        })
    }
}

impl ControlInput for LineControl {
    fn wait(&mut self, timeout: Duration) -> io::Result<Control> {
        if !self.open {
            thread::sleep(timeout);
            return Ok(Control::Idle);
        }

        match self.lines.recv_timeout(timeout) {
            Ok(()) => Ok(Control::Reset),
            Err(RecvTimeoutError::Timeout) => Ok(Control::Idle),
            Err(RecvTimeoutError::Disconnected) => {
                // Input closed; keep the refresh cadence from here on
                self.open = false;
                thread::sleep(timeout);
                Ok(Control::Idle)
            }
        }
    }
}

/// Forward reset lines straight to the meter (dump mode, where the main
/// thread is parked on the readiness signal).
pub fn forward_resets<R: BufRead + Send + 'static>(
    reader: R,
    shared: Arc<SharedMeter>,
) -> io::Result<()> {
    spawn_line_reader(reader, move || {
        shared.request_reset();
        true
    })
}
