use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static WORDS_DIR: Dir = include_dir!("src/words");

/// Word corpora compiled into the binary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display, strum_macros::EnumIter)]
pub enum Language {
    #[default]
    #[serde(rename = "english")]
    #[strum(serialize = "english")]
    English,
    #[serde(rename = "english_1k")]
    #[strum(serialize = "english_1k")]
    English1k,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display, strum_macros::EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QuoteLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Deserialize, Clone, Debug)]
struct WordList {
    #[allow(dead_code)]
    name: String,
    words: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Quote {
    pub text: String,
    pub source: String,
    pub length: QuoteLength,
}

fn load_word_list(file_name: &str) -> WordList {
    let file = WORDS_DIR
        .get_file(file_name)
        .unwrap_or_else(|| panic!("word list {file_name} not embedded"));
    serde_json::from_str(file.contents_utf8().expect("word list is not utf-8"))
        .expect("malformed word list json")
}

fn word_list(language: Language) -> &'static WordList {
    static ENGLISH: OnceLock<WordList> = OnceLock::new();
    static ENGLISH_1K: OnceLock<WordList> = OnceLock::new();
    match language {
        Language::English => ENGLISH.get_or_init(|| load_word_list("english.json")),
        Language::English1k => ENGLISH_1K.get_or_init(|| load_word_list("english_1k.json")),
    }
}

fn quotes() -> &'static [Quote] {
    static QUOTES: OnceLock<Vec<Quote>> = OnceLock::new();
    QUOTES.get_or_init(|| {
        let file = WORDS_DIR.get_file("quotes.json").expect("quotes embedded");
        serde_json::from_str(file.contents_utf8().expect("quotes are not utf-8"))
            .expect("malformed quotes json")
    })
}

const PUNCTUATION_MARKS: [char; 6] = ['.', ',', ';', ':', '!', '?'];

/// Builds a space-joined target of `count` random words. With `numbers`
/// enabled a word is occasionally replaced by a 0-99 numeral; with
/// `punctuation` enabled words occasionally gain a trailing mark or a
/// leading capital.
pub fn generate_words(count: usize, language: Language, punctuation: bool, numbers: bool) -> String {
    let list = word_list(language);
    if list.words.is_empty() {
        return String::new();
    }

    let mut rng = rand::thread_rng();
    let mut result = Vec::with_capacity(count);
    for _ in 0..count {
        if numbers && rng.gen_bool(0.1) {
            result.push(rng.gen_range(0..100).to_string());
            continue;
        }

        let mut word = list.words[rng.gen_range(0..list.words.len())].clone();

        if punctuation && rng.gen_bool(0.15) {
            if rng.gen_bool(0.5) {
                word.push(PUNCTUATION_MARKS[rng.gen_range(0..PUNCTUATION_MARKS.len())]);
            } else {
                word = capitalize(&word);
            }
        }

        result.push(word);
    }

    result.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Word stream long enough for any timed session; the timer ends it.
pub fn generate_words_for_time(language: Language, punctuation: bool, numbers: bool) -> String {
    generate_words(200, language, punctuation, numbers)
}

pub fn random_quote(length: QuoteLength) -> Quote {
    let all = quotes();
    let mut rng = rand::thread_rng();

    let filtered: Vec<&Quote> = all.iter().filter(|q| q.length == length).collect();
    if !filtered.is_empty() {
        return filtered[rng.gen_range(0..filtered.len())].clone();
    }
    if !all.is_empty() {
        return all[rng.gen_range(0..all.len())].clone();
    }
    Quote {
        text: "No quotes available.".into(),
        source: "System".into(),
        length: QuoteLength::Short,
    }
}
