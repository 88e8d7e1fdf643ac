use crate::config::{Config, Mode};
use crate::engine::{Difficulty, StopOnError};
use crate::theme;
use crate::words::{Language, QuoteLength};
use std::fmt::Display;
use strum::IntoEnumIterator;

/// One row on the settings screen: a label plus explicit read/write
/// accessors over the single `Config` record. A fixed table of these
/// replaces any per-field reflection; adding an option means adding one
/// descriptor here.
pub struct SettingDescriptor {
    pub label: &'static str,
    pub options: fn() -> Vec<String>,
    pub get: fn(&Config) -> String,
    pub set: fn(&mut Config, &str),
}

fn parse_variant<T: IntoEnumIterator + Display>(s: &str) -> Option<T> {
    T::iter().find(|v| v.to_string() == s)
}

fn variants<T: IntoEnumIterator + Display>() -> Vec<String> {
    T::iter().map(|v| v.to_string()).collect()
}

fn on_off(v: bool) -> String {
    if v { "on" } else { "off" }.to_string()
}

pub const DESCRIPTORS: &[SettingDescriptor] = &[
    SettingDescriptor {
        label: "Mode",
        options: variants::<Mode>,
        get: |c| c.mode.to_string(),
        set: |c, v| {
            if let Some(m) = parse_variant(v) {
                c.mode = m;
            }
        },
    },
    SettingDescriptor {
        label: "Time Duration",
        options: || vec!["15".into(), "30".into(), "60".into(), "120".into()],
        get: |c| c.duration.to_string(),
        set: |c, v| {
            if let Ok(d) = v.parse() {
                c.duration = d;
            }
        },
    },
    SettingDescriptor {
        label: "Word Count",
        options: || vec!["10".into(), "25".into(), "50".into(), "100".into()],
        get: |c| c.word_count.to_string(),
        set: |c, v| {
            if let Ok(n) = v.parse() {
                c.word_count = n;
            }
        },
    },
    SettingDescriptor {
        label: "Language",
        options: variants::<Language>,
        get: |c| c.language.to_string(),
        set: |c, v| {
            if let Some(l) = parse_variant(v) {
                c.language = l;
            }
        },
    },
    SettingDescriptor {
        label: "Punctuation",
        options: || vec!["off".into(), "on".into()],
        get: |c| on_off(c.punctuation),
        set: |c, v| c.punctuation = v == "on",
    },
    SettingDescriptor {
        label: "Numbers",
        options: || vec!["off".into(), "on".into()],
        get: |c| on_off(c.numbers),
        set: |c, v| c.numbers = v == "on",
    },
    SettingDescriptor {
        label: "Difficulty",
        options: variants::<Difficulty>,
        get: |c| c.difficulty.to_string(),
        set: |c, v| {
            if let Some(d) = parse_variant(v) {
                c.difficulty = d;
            }
        },
    },
    SettingDescriptor {
        label: "Stop On Error",
        options: variants::<StopOnError>,
        get: |c| c.stop_on_error.to_string(),
        set: |c, v| {
            if let Some(s) = parse_variant(v) {
                c.stop_on_error = s;
            }
        },
    },
    SettingDescriptor {
        label: "Freedom Mode",
        options: || vec!["off".into(), "on".into()],
        get: |c| on_off(c.freedom_mode),
        set: |c, v| c.freedom_mode = v == "on",
    },
    SettingDescriptor {
        label: "Quote Length",
        options: variants::<QuoteLength>,
        get: |c| c.quote_length.to_string(),
        set: |c, v| {
            if let Some(q) = parse_variant(v) {
                c.quote_length = q;
            }
        },
    },
    SettingDescriptor {
        label: "Live WPM",
        options: || vec!["off".into(), "on".into()],
        get: |c| on_off(c.live_wpm),
        set: |c, v| c.live_wpm = v == "on",
    },
    SettingDescriptor {
        label: "Live Accuracy",
        options: || vec!["off".into(), "on".into()],
        get: |c| on_off(c.live_accuracy),
        set: |c, v| c.live_accuracy = v == "on",
    },
    SettingDescriptor {
        label: "Theme",
        options: theme::names,
        get: |c| c.theme.clone(),
        set: |c, v| c.theme = v.to_string(),
    },
];

/// Cursor state for the settings screen; values cycle left/right through
/// each descriptor's option list.
#[derive(Debug, Default)]
pub struct SettingsScreen {
    pub cursor: usize,
}

impl SettingsScreen {
    pub fn move_up(&mut self) {
        self.cursor = self.cursor.checked_sub(1).unwrap_or(DESCRIPTORS.len() - 1);
    }

    pub fn move_down(&mut self) {
        self.cursor = (self.cursor + 1) % DESCRIPTORS.len();
    }

    /// Steps the selected option forward or backward, wrapping around.
    pub fn cycle(&self, cfg: &mut Config, forward: bool) {
        let desc = &DESCRIPTORS[self.cursor];
        let options = (desc.options)();
        if options.is_empty() {
            return;
        }
        let current = (desc.get)(cfg);
        let idx = options.iter().position(|o| *o == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % options.len()
        } else {
            idx.checked_sub(1).unwrap_or(options.len() - 1)
        };
        (desc.set)(cfg, &options[next]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(label: &str) -> &'static SettingDescriptor {
        DESCRIPTORS.iter().find(|d| d.label == label).unwrap()
    }

    #[test]
    fn every_descriptor_round_trips_its_current_value() {
        let mut cfg = Config::default();
        for desc in DESCRIPTORS {
            let value = (desc.get)(&cfg);
            assert!(
                (desc.options)().contains(&value),
                "{} default {:?} missing from options",
                desc.label,
                value
            );
            (desc.set)(&mut cfg, &value);
            assert_eq!((desc.get)(&cfg), value, "{} did not round trip", desc.label);
        }
    }

    #[test]
    fn set_updates_the_config_record() {
        let mut cfg = Config::default();
        (descriptor("Difficulty").set)(&mut cfg, "master");
        assert_eq!(cfg.difficulty, Difficulty::Master);
        (descriptor("Stop On Error").set)(&mut cfg, "letter");
        assert_eq!(cfg.stop_on_error, StopOnError::Letter);
        (descriptor("Freedom Mode").set)(&mut cfg, "on");
        assert!(cfg.freedom_mode);
    }

    #[test]
    fn unknown_values_leave_config_untouched() {
        let mut cfg = Config::default();
        (descriptor("Mode").set)(&mut cfg, "marathon");
        assert_eq!(cfg.mode, Mode::Time);
    }

    #[test]
    fn cycle_wraps_in_both_directions() {
        let mut cfg = Config::default();
        let screen = SettingsScreen {
            cursor: DESCRIPTORS
                .iter()
                .position(|d| d.label == "Difficulty")
                .unwrap(),
        };

        screen.cycle(&mut cfg, true);
        assert_eq!(cfg.difficulty, Difficulty::Expert);
        screen.cycle(&mut cfg, true);
        assert_eq!(cfg.difficulty, Difficulty::Master);
        screen.cycle(&mut cfg, true);
        assert_eq!(cfg.difficulty, Difficulty::Normal);

        screen.cycle(&mut cfg, false);
        assert_eq!(cfg.difficulty, Difficulty::Master);
    }

    #[test]
    fn cursor_wraps_over_the_table() {
        let mut screen = SettingsScreen::default();
        screen.move_up();
        assert_eq!(screen.cursor, DESCRIPTORS.len() - 1);
        screen.move_down();
        assert_eq!(screen.cursor, 0);
    }
}
