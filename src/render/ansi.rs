//! Line-oriented display: the bar is redrawn in place on one line with ANSI
//! escapes, leaving scrollback and stdin line editing alone.

use super::{overs_text, readout_text, Bar, Renderer, LEGEND, TICKS, ZONES};
use crate::colors::{Palette, Style};
use crossterm::{
    cursor::MoveUp,
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

use crate::meter::MeterSnapshot;

pub struct AnsiRenderer<W: Write> {
    out: W,
    palette: Palette,
    verbose: bool,
    echoed_input: bool,
}

impl<W: Write> AnsiRenderer<W> {
    /// `echoed_input` is set when control lines are typed on the same
    /// terminal, so each one leaves an echoed line below the bar.
    pub fn new(out: W, palette: Palette, verbose: bool, echoed_input: bool) -> Self {
        Self {
            out,
            palette,
            verbose,
            echoed_input,
        }
    }

    fn styled(&mut self, text: &str, style: Style) -> io::Result<()> {
        if style == Style::PLAIN {
            return queue!(self.out, Print(text));
        }
        if style.bold {
            queue!(self.out, SetAttribute(Attribute::Bold))?;
        }
        if let Some(fg) = style.fg {
            queue!(self.out, SetForegroundColor(fg))?;
        }
        if let Some(bg) = style.bg {
            queue!(self.out, SetBackgroundColor(bg))?;
        }
        queue!(self.out, Print(text), SetAttribute(Attribute::Reset), ResetColor)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for AnsiRenderer<W> {
    fn begin(&mut self) -> io::Result<()> {
        let style = self.palette.legend();
        self.styled(LEGEND, style)?;
        queue!(self.out, Print("\r\n"))?;
        self.styled(TICKS, style)?;
        queue!(self.out, Print("\r\n"))?;
        self.out.flush()
    }

    fn draw(&mut self, snap: &MeterSnapshot) -> io::Result<()> {
        let bar = Bar::from_snapshot(snap);
        queue!(self.out, Print('\r'))?;

        for (zone, range) in ZONES {
            let style = self.palette.zone(zone);
            // Split the zone into runs of lit and unlit cells
            let mut start = range.start;
            while start < range.end {
                let lit = bar.is_lit(start);
                let mut end = start + 1;
                while end < range.end && bar.is_lit(end) == lit {
                    end += 1;
                }
                let run = bar.segment(start..end);
                self.styled(&run, if lit { style } else { Style::PLAIN })?;
                start = end;
            }
        }

        queue!(self.out, Print(' '))?;
        if let Some(text) = overs_text(snap) {
            self.styled(&text, self.palette.overs())?;
        }
        if self.verbose {
            self.styled(&readout_text(snap), self.palette.readout())?;
        }
        queue!(self.out, Clear(ClearType::UntilNewLine))?;
        self.out.flush()
    }

    /// Step back over the echoed reset line; piped input leaves none
    fn on_reset(&mut self) -> io::Result<()> {
        if self.echoed_input {
            queue!(self.out, MoveUp(1))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor, Print("\r\n"))?;
        self.out.flush()
    }
}
