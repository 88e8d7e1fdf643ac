use crate::config::Mode;
use crate::engine::Difficulty;
use crate::words::{Language, QuoteLength};
use chrono::{DateTime, Local};
use directories::ProjectDirs;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One finished (or failed) session as it lands in the history file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestResult {
    pub date: DateTime<Local>,
    pub mode: Mode,
    pub duration: u64,
    pub word_count: usize,
    pub language: Language,
    pub punctuation: bool,
    pub numbers: bool,
    pub difficulty: Difficulty,
    pub net_wpm: f64,
    pub raw_wpm: f64,
    pub accuracy: f64,
    pub consistency: f64,
    pub correct: usize,
    pub incorrect: usize,
    pub extra: usize,
    pub missed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_length: Option<QuoteLength>,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStats {
    pub total_tests: usize,
    pub average_wpm: f64,
    pub best_wpm: f64,
    pub total_words: usize,
    pub last10_avg: f64,
    pub personal_best: Option<TestResult>,
}

pub fn calculate_stats(results: &[TestResult]) -> HistoryStats {
    if results.is_empty() {
        return HistoryStats::default();
    }

    let mut stats = HistoryStats {
        total_tests: results.len(),
        ..Default::default()
    };

    let mut total_wpm = 0.0;
    for r in results {
        total_wpm += r.net_wpm;
        if r.net_wpm > stats.best_wpm {
            stats.best_wpm = r.net_wpm;
            stats.personal_best = Some(r.clone());
        }
        stats.total_words += r.correct / 5; // approximate words
    }
    stats.average_wpm = total_wpm / results.len() as f64;

    let last10: Vec<&TestResult> = results
        .iter()
        .sorted_by(|a, b| b.date.cmp(&a.date))
        .take(10)
        .collect();
    stats.last10_avg = last10.iter().map(|r| r.net_wpm).sum::<f64>() / last10.len() as f64;

    stats
}

/// Best net WPM among results matching the given test parameters.
pub fn personal_best_for_config(
    results: &[TestResult],
    mode: Mode,
    language: Language,
    duration: u64,
    word_count: usize,
) -> Option<&TestResult> {
    results
        .iter()
        .filter(|r| r.mode == mode && r.language == language)
        .filter(|r| match mode {
            Mode::Time => r.duration == duration,
            Mode::Words => r.word_count == word_count,
            _ => true,
        })
        .max_by(|a, b| a.net_wpm.total_cmp(&b.net_wpm))
}

pub trait HistoryStore {
    fn load(&self) -> Vec<TestResult>;
    fn save(&self, results: &[TestResult]) -> std::io::Result<()>;

    fn append(&self, result: TestResult) -> std::io::Result<()> {
        let mut results = self.load();
        results.push(result);
        self.save(&results)
    }
}

#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tapr") {
            pd.data_dir().join("history.json")
        } else {
            PathBuf::from("tapr_history.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> Vec<TestResult> {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(results) = serde_json::from_slice::<Vec<TestResult>>(&bytes) {
                return results;
            }
        }
        Vec::new()
    }

    fn save(&self, results: &[TestResult]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(results).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::tempdir;

    fn result(net_wpm: f64, correct: usize) -> TestResult {
        TestResult {
            date: Local::now(),
            mode: Mode::Time,
            duration: 30,
            word_count: 50,
            language: Language::English,
            punctuation: false,
            numbers: false,
            difficulty: Difficulty::Normal,
            net_wpm,
            raw_wpm: net_wpm + 5.0,
            accuracy: 95.0,
            consistency: 80.0,
            correct,
            incorrect: 3,
            extra: 1,
            missed: 2,
            quote_length: None,
        }
    }

    #[test]
    fn append_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileHistoryStore::with_path(dir.path().join("history.json"));

        assert!(store.load().is_empty());
        store.append(result(60.0, 150)).unwrap();
        store.append(result(70.0, 180)).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].net_wpm, 70.0);
    }

    #[test]
    fn corrupt_history_reads_as_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, b"[{broken").unwrap();
        let store = FileHistoryStore::with_path(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn stats_over_empty_history() {
        let stats = calculate_stats(&[]);
        assert_eq!(stats.total_tests, 0);
        assert_eq!(stats.average_wpm, 0.0);
        assert!(stats.personal_best.is_none());
    }

    #[test]
    fn stats_track_best_and_average() {
        let results = vec![result(40.0, 100), result(80.0, 200), result(60.0, 150)];
        let stats = calculate_stats(&results);

        assert_eq!(stats.total_tests, 3);
        assert_eq!(stats.best_wpm, 80.0);
        assert_eq!(stats.average_wpm, 60.0);
        assert_eq!(stats.total_words, 20 + 40 + 30);
        assert_eq!(stats.personal_best.unwrap().net_wpm, 80.0);
    }

    #[test]
    fn last10_average_uses_most_recent() {
        let mut results = Vec::new();
        for i in 0..12 {
            let mut r = result(10.0 * i as f64, 100);
            r.date = Local::now() - TimeDelta::minutes(12 - i as i64);
            results.push(r);
        }
        let stats = calculate_stats(&results);
        // Most recent ten are 20..110 wpm
        let expected: f64 = (2..12).map(|i| 10.0 * i as f64).sum::<f64>() / 10.0;
        assert!((stats.last10_avg - expected).abs() < 1e-9);
    }

    #[test]
    fn personal_best_filters_by_mode_parameters() {
        let mut fast_but_short = result(90.0, 200);
        fast_but_short.duration = 15;
        let steady = result(70.0, 180);
        let mut word_mode = result(95.0, 220);
        word_mode.mode = Mode::Words;

        let results = vec![fast_but_short, steady, word_mode];
        let best = personal_best_for_config(&results, Mode::Time, Language::English, 30, 50);
        assert_eq!(best.unwrap().net_wpm, 70.0);

        let best15 = personal_best_for_config(&results, Mode::Time, Language::English, 15, 50);
        assert_eq!(best15.unwrap().net_wpm, 90.0);

        assert!(
            personal_best_for_config(&results, Mode::Time, Language::English1k, 30, 50).is_none()
        );
    }
}
