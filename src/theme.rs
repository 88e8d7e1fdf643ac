use ratatui::style::Color;

/// Color palette for one named theme. Slot states map onto `correct`,
/// `error` and `extra_error`; `sub` is untyped/dim text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub main: Color,
    pub sub: Color,
    pub caret: Color,
    pub correct: Color,
    pub error: Color,
    pub extra_error: Color,
    pub accent: Color,
}

const DARK: Theme = Theme {
    name: "dark",
    main: Color::White,
    sub: Color::DarkGray,
    caret: Color::Yellow,
    correct: Color::Green,
    error: Color::Red,
    extra_error: Color::LightRed,
    accent: Color::Cyan,
};

const LIGHT: Theme = Theme {
    name: "light",
    main: Color::Black,
    sub: Color::Gray,
    caret: Color::Blue,
    correct: Color::Green,
    error: Color::Red,
    extra_error: Color::LightRed,
    accent: Color::Magenta,
};

const GRUVBOX: Theme = Theme {
    name: "gruvbox",
    main: Color::Rgb(235, 219, 178),
    sub: Color::Rgb(146, 131, 116),
    caret: Color::Rgb(250, 189, 47),
    correct: Color::Rgb(184, 187, 38),
    error: Color::Rgb(251, 73, 52),
    extra_error: Color::Rgb(204, 36, 29),
    accent: Color::Rgb(131, 165, 152),
};

const DRACULA: Theme = Theme {
    name: "dracula",
    main: Color::Rgb(248, 248, 242),
    sub: Color::Rgb(98, 114, 164),
    caret: Color::Rgb(241, 250, 140),
    correct: Color::Rgb(80, 250, 123),
    error: Color::Rgb(255, 85, 85),
    extra_error: Color::Rgb(255, 121, 198),
    accent: Color::Rgb(139, 233, 253),
};

const THEMES: [Theme; 4] = [DARK, LIGHT, GRUVBOX, DRACULA];

pub fn get(name: &str) -> Theme {
    THEMES
        .iter()
        .find(|t| t.name == name)
        .copied()
        .unwrap_or(DARK)
}

pub fn names() -> Vec<String> {
    THEMES.iter().map(|t| t.name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(get("gruvbox").name, "gruvbox");
        assert_eq!(get("light").caret, Color::Blue);
    }

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(get("solarized-disco").name, "dark");
    }

    #[test]
    fn names_are_unique() {
        let mut n = names();
        n.sort();
        n.dedup();
        assert_eq!(n.len(), THEMES.len());
    }
}
