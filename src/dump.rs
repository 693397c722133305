//! Machine-readable dump: one line per processed audio block.
//!
//! ```text
//! # sec avg peak maxpeak overs (dB)
//! 0.0106667 -42.1 -35.2 -35.2 0
//! ```
//! Levels are shifted by +20 dB so that 0 is the K-20 reference.

use crate::meter::{MeterSnapshot, Waiter};
use rtrb::Consumer;
use std::io::{self, Write};

pub const HEADER: &str = "# sec avg peak maxpeak overs (dB)";

/// Offset from dBFS to the K-20 reference level
pub const K20_OFFSET_DB: f32 = 20.0;

/// Significant digits, as printf's `%g`
const PRECISION: i32 = 6;

/// Format a number the way printf's `%g` does: six significant digits,
/// scientific notation for very small or large magnitudes, trailing zeros
/// removed.
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // The exponent after rounding to PRECISION digits decides the notation
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= PRECISION {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `<elapsed> <rms> <peak> <maxpeak> <overs>` for one reading
pub fn format_line(snap: &MeterSnapshot) -> String {
    format!(
        "{} {} {} {} {}",
        format_g(snap.elapsed_secs()),
        format_g(f64::from(snap.rms + K20_OFFSET_DB)),
        format_g(f64::from(snap.peak + K20_OFFSET_DB)),
        format_g(f64::from(snap.max_peak + K20_OFFSET_DB)),
        snap.overs
    )
}

/// Print the header, then every queued reading as it is signalled, until the
/// signal closes. Returns the number of lines written.
pub fn run<W: Write>(
    out: &mut W,
    ready: &Waiter,
    readings: &mut Consumer<MeterSnapshot>,
) -> io::Result<u64> {
    writeln!(out, "{HEADER}")?;
    out.flush()?;

    let mut lines = 0;
    while ready.wait().is_ok() {
        while let Ok(snap) = readings.pop() {
            writeln!(out, "{}", format_line(&snap))?;
            lines += 1;
        }
        out.flush()?;
    }

    Ok(lines)
}
