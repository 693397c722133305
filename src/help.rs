use crate::colors::Style;
use crate::terminal::Terminal;
use crossterm::style::Color;

/// Key help for the full-screen meter
pub const HELP: &str = "\
K-20 METER
─────────────────
Enter/r  Reset peaks & overs
?        Toggle help
q/Esc    Quit";

/// Size of the help box for `help_text`: (width, height)
fn box_size(help_text: &str) -> (usize, usize) {
    let lines = help_text.lines().count();
    let max_width = help_text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    (max_width + 4, lines + 2)
}

/// Draw a help box into the back buffer, `top` rows down, centered horizontally.
pub fn render_help_overlay(term: &mut Terminal, top: usize, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (width, _) = term.size();
    let (box_width, box_height) = box_size(help_text);
    let inner_width = box_width - 4;

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = top;

    let border = Style {
        fg: Some(Color::White),
        bg: None,
        bold: false,
    };
    let text = Style {
        fg: Some(Color::Grey),
        bg: None,
        bold: false,
    };

    let horizontal = "─".repeat(box_width - 2);
    term.set_str(start_x as i32, start_y as i32, &format!("┌{horizontal}┐"), border);

    for (i, line) in help_text.lines().enumerate() {
        let y = (start_y + 1 + i) as i32;
        let padding = inner_width.saturating_sub(line.chars().count());
        term.set(start_x as i32, y, '│', border);
        term.set_str(start_x as i32 + 1, y, &format!(" {}{} ", line, " ".repeat(padding)), text);
        term.set((start_x + box_width - 1) as i32, y, '│', border);
    }

    let bottom_y = (start_y + box_height - 1) as i32;
    term.set_str(start_x as i32, bottom_y, &format!("└{horizontal}┘"), border);
}
