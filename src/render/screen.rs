//! Full-screen display on the alternate screen.

use super::{overs_text, readout_text, Bar, Renderer, LEGEND, SUFFIX_COLUMN, TICKS, ZONES};
use crate::colors::{Palette, Style};
use crate::help::{render_help_overlay, HELP};
use crate::meter::MeterSnapshot;
use crate::terminal::Terminal;
use std::io;

const LEGEND_ROW: i32 = 0;
const TICKS_ROW: i32 = 1;
const BAR_ROW: i32 = 2;
const HELP_ROW: usize = 4;

pub struct ScreenRenderer {
    term: Terminal,
    palette: Palette,
    verbose: bool,
    show_help: bool,
}

impl ScreenRenderer {
    /// Take over the terminal; it is restored when the renderer is dropped.
    pub fn new(palette: Palette, verbose: bool) -> io::Result<Self> {
        Ok(Self {
            term: Terminal::new()?,
            palette,
            verbose,
            show_help: false,
        })
    }

    fn draw_legend(&mut self) {
        let style = self.palette.legend();
        self.term.set_str(0, LEGEND_ROW, LEGEND, style);
        self.term.set_str(0, TICKS_ROW, TICKS, style);
    }
}

impl Renderer for ScreenRenderer {
    fn begin(&mut self) -> io::Result<()> {
        self.term.clear();
        self.draw_legend();
        self.term.render()
    }

    fn draw(&mut self, snap: &MeterSnapshot) -> io::Result<()> {
        if let Ok((width, height)) = crossterm::terminal::size() {
            if (width, height) != self.term.size() {
                self.term.resize(width, height);
            }
        }

        self.term.clear();
        self.draw_legend();

        let bar = Bar::from_snapshot(snap);
        for (zone, range) in ZONES {
            let style = self.palette.zone(zone);
            for col in range {
                let style = if bar.is_lit(col) { style } else { Style::PLAIN };
                self.term.set(col as i32, BAR_ROW, bar.char_at(col), style);
            }
        }

        let mut x = SUFFIX_COLUMN as i32;
        if let Some(text) = overs_text(snap) {
            self.term.set_str(x, BAR_ROW, &text, self.palette.overs());
            x += text.chars().count() as i32;
        }
        if self.verbose {
            self.term.set_str(x, BAR_ROW, &readout_text(snap), self.palette.readout());
        }

        if self.show_help {
            render_help_overlay(&mut self.term, HELP_ROW, HELP);
        }

        self.term.render()
    }

    fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }
}
