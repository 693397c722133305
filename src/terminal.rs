use crate::colors::Style;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Full-screen terminal with a back buffer
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
}

/// A single cell in the terminal buffer
#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            style: Style::PLAIN,
        }
    }
}

impl Terminal {
    /// Take over the screen: raw mode, alternate screen, hidden cursor
    pub fn new() -> io::Result<Self> {
        let (width, height) = size()?;

        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;

        Ok(Self {
            width,
            height,
            buffer: vec![vec![Cell::default(); width as usize]; height as usize],
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![vec![Cell::default(); width as usize]; height as usize];
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Set a character at position; out-of-bounds writes are dropped
    pub fn set(&mut self, x: i32, y: i32, ch: char, style: Style) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, style };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, style: Style) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, style);
        }
    }

    /// Render the entire buffer to screen
    pub fn render(&self) -> io::Result<()> {
        let mut out = stdout().lock();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.style == Style::PLAIN {
                    queue!(out, Print(cell.ch))?;
                    continue;
                }

                if cell.style.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                if let Some(fg) = cell.style.fg {
                    queue!(out, SetForegroundColor(fg))?;
                }
                if let Some(bg) = cell.style.bg {
                    queue!(out, SetBackgroundColor(bg))?;
                }
                queue!(out, Print(cell.ch), SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }

        out.flush()
    }
}

/// Wait up to `timeout` for a key press
pub fn wait_key(timeout: Duration) -> io::Result<Option<(KeyCode, KeyModifiers)>> {
    if poll(timeout)? {
        if let Event::Key(key_event) = read()? {
            if key_event.kind != KeyEventKind::Release {
                return Ok(Some((key_event.code, key_event.modifiers)));
            }
        }
    }
    Ok(None)
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(stdout(), ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
