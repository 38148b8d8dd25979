use nu_ansi_term::{Color, Style};
use std::io::IsTerminal;

use super::ColorMode;

pub struct Ui {
    paint: bool,
    write: Style,
    read: Style,
    dim: Style,
}

impl Ui {
    pub fn new(mode: ColorMode) -> Self {
        let paint = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => std::io::stdout().is_terminal(),
        };

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            paint,
            write: Color::Yellow.bold(),
            read: Color::Green.normal(),
            dim: Style::new().dimmed(),
        }
    }

    /// `write` or `read`, colored by classification.
    pub fn access(&self, write: bool) -> String {
        let (label, style) = if write {
            ("write", self.write)
        } else {
            ("read", self.read)
        };
        self.paint(style, label)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(self.dim, text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.paint {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_leaves_text_plain() {
        let ui = Ui::new(ColorMode::Never);
        assert_eq!(ui.access(true), "write");
        assert_eq!(ui.access(false), "read");
        assert_eq!(ui.muted("x"), "x");
    }

    #[test]
    fn always_emits_escape_codes() {
        let ui = Ui::new(ColorMode::Always);
        assert!(ui.access(true).contains("\u{1b}["));
    }
}
