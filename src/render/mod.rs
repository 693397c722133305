//! Meter display backends.
//!
//! Both renderers draw the same [`Bar`], built from a snapshot by a pure
//! function, plus the same legend and suffix.

pub mod ansi;
pub mod screen;

pub use ansi::AnsiRenderer;
pub use screen::ScreenRenderer;

use crate::meter::{scale, MeterSnapshot, Zone, METER_WIDTH};
use std::io;
use std::ops::Range;

/// Scale legend, aligned with the bar columns
pub const LEGEND: &str =
    "-70   60   50   40   30        20   15   10  6  3  0  3  6   10   15   20+";
/// Tick marks under the legend
pub const TICKS: &str =
    " |    |    |    |    |         |    |    |   |  |  |  |  |   |    |    |";

/// Column where the over count and readout start
pub const SUFFIX_COLUMN: usize = METER_WIDTH + 1;

const LIT: char = '#';
const UNLIT: char = ' ';

/// Columns of the bar in each color zone
pub const ZONES: [(Zone, Range<usize>); 3] = [
    (Zone::Normal, 0..50),
    (Zone::Caution, 50..55),
    (Zone::Hot, 55..METER_WIDTH),
];

/// One frame of the bar graph
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bar {
    cells: [bool; METER_WIDTH],
}

impl Bar {
    /// RMS fills the bar from the left; peak and max peak each light one
    /// marker just left of their scale column.
    pub fn from_snapshot(snap: &MeterSnapshot) -> Self {
        let mut cells = [false; METER_WIDTH];

        let fill = scale(snap.rms);
        cells[..fill].fill(true);

        for level in [snap.peak, snap.max_peak] {
            if let Some(col) = scale(level).checked_sub(1) {
                cells[col] = true;
            }
        }

        Self { cells }
    }

    pub fn is_lit(&self, column: usize) -> bool {
        self.cells.get(column).copied().unwrap_or(false)
    }

    pub fn char_at(&self, column: usize) -> char {
        if self.is_lit(column) {
            LIT
        } else {
            UNLIT
        }
    }

    /// Characters of the columns in `range`
    pub fn segment(&self, range: Range<usize>) -> String {
        range.map(|c| self.char_at(c)).collect()
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segment(0..METER_WIDTH))
    }
}

/// Over count shown after the bar, when there are any
pub fn overs_text(snap: &MeterSnapshot) -> Option<String> {
    (snap.overs > 0).then(|| format!("   {} ", snap.overs))
}

/// Verbose numeric readout: rms, peak, max peak in dBFS
pub fn readout_text(snap: &MeterSnapshot) -> String {
    format!(" {:.1} {:.1} {:.1}", snap.rms, snap.peak, snap.max_peak)
}

/// A display backend for the interactive loop
pub trait Renderer {
    /// Draw the static parts (legend)
    fn begin(&mut self) -> io::Result<()>;

    /// Draw one reading
    fn draw(&mut self, snap: &MeterSnapshot) -> io::Result<()>;

    /// A reset was requested
    fn on_reset(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn toggle_help(&mut self) {}

    /// Leave the output in a clean state
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::FLOOR_DB;

    fn snapshot(rms: f32, peak: f32, max_peak: f32) -> MeterSnapshot {
        MeterSnapshot {
            rms,
            peak,
            max_peak,
            ..MeterSnapshot::silent(48_000)
        }
    }

    #[test]
    fn silence_is_an_empty_bar() {
        let bar = Bar::from_snapshot(&snapshot(-90.0, -90.0, -90.0));
        assert_eq!(bar.to_string(), " ".repeat(METER_WIDTH));

        let bar = Bar::from_snapshot(&MeterSnapshot::silent(48_000));
        assert!(!bar.to_string().contains('#'));
    }

    #[test]
    fn rms_fills_up_to_its_column() {
        // -20 dBFS is column 51
        let bar = Bar::from_snapshot(&snapshot(-20.0, FLOOR_DB, FLOOR_DB));
        assert!(bar.is_lit(0));
        assert!(bar.is_lit(50));
        assert!(!bar.is_lit(51));
        assert_eq!(bar.to_string().matches('#').count(), 51);
    }

    #[test]
    fn peak_markers_sit_left_of_their_column() {
        // peak -10 -> column 61, max peak -5 -> column 66
        let bar = Bar::from_snapshot(&snapshot(-30.0, -10.0, -5.0));
        assert!(bar.is_lit(60));
        assert!(bar.is_lit(65));
        assert!(!bar.is_lit(61));
        assert!(!bar.is_lit(59));
        assert_eq!(bar.to_string().matches('#').count(), 41 + 2);
    }

    #[test]
    fn marker_inside_rms_fill_adds_nothing() {
        let bar = Bar::from_snapshot(&snapshot(-10.0, -20.0, -20.0));
        assert_eq!(bar.to_string().matches('#').count(), 61);
    }

    #[test]
    fn zones_cover_the_bar() {
        let total: usize = ZONES.iter().map(|(_, r)| r.len()).sum();
        assert_eq!(total, METER_WIDTH);
        for (zone, range) in ZONES {
            for col in range {
                assert_eq!(Zone::of(col), zone);
            }
        }
    }

    #[test]
    fn legend_marks_line_up() {
        // K-20 "0" is -20 dBFS, column 51
        assert_eq!(scale(-20.0), 51);
        assert_eq!(LEGEND.chars().nth(51), Some('0'));
        assert_eq!(TICKS.chars().nth(51), Some('|'));
        // "30" below reference is the -50 dBFS breakpoint
        assert_eq!(scale(-50.0), 21);
        assert_eq!(TICKS.chars().nth(21), Some('|'));
    }

    #[test]
    fn suffix_texts() {
        let mut snap = snapshot(-20.0, -10.04, -5.0);
        assert_eq!(overs_text(&snap), None);
        snap.overs = 4;
        assert_eq!(overs_text(&snap).as_deref(), Some("   4 "));
        assert_eq!(readout_text(&snap), " -20.0 -10.0 -5.0");
    }
}
