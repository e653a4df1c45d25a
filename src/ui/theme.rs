use ratatui::style::{Color, Modifier, Style};

/// Colour palettes selectable from the settings file. The names follow the
/// themes users already have in their config.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Theme {
    Darkly,
    Flatly,
    Cyborg,
    Solar,
    Superhero,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Darkly,
        Theme::Flatly,
        Theme::Cyborg,
        Theme::Solar,
        Theme::Superhero,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Darkly => "darkly",
            Theme::Flatly => "flatly",
            Theme::Cyborg => "cyborg",
            Theme::Solar => "solar",
            Theme::Superhero => "superhero",
        }
    }

    pub fn from_name(name: &str) -> Option<Theme> {
        let name = name.trim();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(name))
    }

    /// Next theme in the cycle, wrapping around.
    pub fn next(self) -> Theme {
        let idx = Theme::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Darkly => Palette {
                accent: Color::Cyan,
                border: Color::Gray,
                highlight: Color::Blue,
                marked: Color::Yellow,
                info: Color::Green,
                error: Color::Red,
            },
            Theme::Flatly => Palette {
                accent: Color::Green,
                border: Color::DarkGray,
                highlight: Color::LightBlue,
                marked: Color::Magenta,
                info: Color::Green,
                error: Color::LightRed,
            },
            Theme::Cyborg => Palette {
                accent: Color::LightCyan,
                border: Color::DarkGray,
                highlight: Color::DarkGray,
                marked: Color::LightYellow,
                info: Color::LightGreen,
                error: Color::LightRed,
            },
            Theme::Solar => Palette {
                accent: Color::Yellow,
                border: Color::Yellow,
                highlight: Color::Rgb(7, 54, 66),
                marked: Color::Rgb(203, 75, 22),
                info: Color::Rgb(133, 153, 0),
                error: Color::Rgb(220, 50, 47),
            },
            Theme::Superhero => Palette {
                accent: Color::Rgb(223, 105, 26),
                border: Color::Rgb(78, 93, 108),
                highlight: Color::Rgb(43, 62, 80),
                marked: Color::Rgb(240, 173, 78),
                info: Color::Rgb(92, 184, 92),
                error: Color::Rgb(217, 83, 79),
            },
        }
    }
}

/// Resolved colours for the widgets drawn by the app.
#[derive(Debug, Copy, Clone)]
pub struct Palette {
    pub accent: Color,
    pub border: Color,
    pub highlight: Color,
    pub marked: Color,
    pub info: Color,
    pub error: Color,
}

impl Palette {
    pub fn key(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn header(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn selected_row(&self) -> Style {
        Style::default().bg(self.highlight).add_modifier(Modifier::BOLD)
    }

    pub fn marked_row(&self) -> Style {
        Style::default().fg(self.marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_case_insensitively() {
        for theme in Theme::ALL {
            assert_eq!(Theme::from_name(theme.name()), Some(theme));
        }
        assert_eq!(Theme::from_name(" DARKLY "), Some(Theme::Darkly));
        assert_eq!(Theme::from_name("vapor"), None);
    }

    #[test]
    fn cycling_visits_every_theme() {
        let mut theme = Theme::Darkly;
        for _ in 0..Theme::ALL.len() {
            theme = theme.next();
        }
        assert_eq!(theme, Theme::Darkly);
    }
}
