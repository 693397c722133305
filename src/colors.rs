use crate::meter::Zone;
use crossterm::style::Color;

/// Styling choices for the meter display
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub color: bool,
    pub bold: bool,
}

/// Foreground, background and bold flag for one drawn element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
}

impl Style {
    pub const PLAIN: Style = Style {
        fg: None,
        bg: None,
        bold: false,
    };
}

impl Palette {
    pub fn new(color: bool, bold: bool) -> Self {
        Self { color, bold }
    }

    /// Lit bar cells: solid green / yellow / red by zone
    pub fn zone(&self, zone: Zone) -> Style {
        if !self.color {
            return Style::PLAIN;
        }
        let c = match zone {
            Zone::Normal => Color::DarkGreen,
            Zone::Caution => Color::DarkYellow,
            Zone::Hot => Color::DarkRed,
        };
        Style {
            fg: Some(c),
            bg: Some(c),
            bold: false,
        }
    }

    /// Scale legend above the bar
    pub fn legend(&self) -> Style {
        Style {
            fg: None,
            bg: None,
            bold: self.bold,
        }
    }

    /// Over counter: white on red
    pub fn overs(&self) -> Style {
        if !self.color {
            return Style {
                fg: None,
                bg: None,
                bold: self.bold,
            };
        }
        Style {
            fg: Some(Color::White),
            bg: Some(Color::DarkRed),
            bold: self.bold,
        }
    }

    /// Verbose numeric readout
    pub fn readout(&self) -> Style {
        Style::PLAIN
    }
}
