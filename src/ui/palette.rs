use ratatui::style::Color;

use crate::config::Theme;

/// Colours used across every screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub status: Color,
    pub hint: Color,
    pub header: Color,
    pub chart: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            accent: Color::Cyan,
            correct: Color::Green,
            incorrect: Color::Red,
            status: Color::Yellow,
            hint: Color::Gray,
            header: Color::Yellow,
            chart: Color::Magenta,
        }
    }

    // bright yellow and cyan wash out on a light background
    pub fn light() -> Self {
        Self {
            accent: Color::Blue,
            correct: Color::Green,
            incorrect: Color::Red,
            status: Color::Magenta,
            hint: Color::DarkGray,
            header: Color::Blue,
            chart: Color::Magenta,
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        let hint = std::env::var("COLORFGBG").ok();
        match theme.resolve(hint.as_deref()) {
            Theme::Light => Self::light(),
            _ => Self::dark(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_themes_ignore_the_terminal() {
        assert_eq!(Palette::for_theme(Theme::Light), Palette::light());
        assert_eq!(Palette::for_theme(Theme::Dark), Palette::dark());
    }

    #[test]
    fn light_palette_avoids_pale_colours() {
        let light = Palette::light();
        assert_ne!(light.accent, Color::Cyan);
        assert_ne!(light.status, Color::Yellow);
        assert_ne!(light.hint, Color::Gray);
    }
}
