use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*").expect("valid regex");
    static ref ENGLISH: Stemmer = Stemmer::create(Algorithm::English);
}

/// Turns a raw query string into normalized terms. The ranking core never
/// looks inside terms; it only counts and matches them.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> Vec<String>;
}

/// NFKC, lowercase, letter-led words, English Snowball stems.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnowballNormalizer;

impl Normalizer for SnowballNormalizer {
    fn normalize(&self, raw: &str) -> Vec<String> {
        let folded = raw.nfkc().collect::<String>().to_lowercase();
        WORD.find_iter(&folded)
            .map(|m| ENGLISH.stem(m.as_str()).into_owned())
            .collect()
    }
}

/// Splits on whitespace and lowercases, nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceNormalizer;

impl Normalizer for WhitespaceNormalizer {
    fn normalize(&self, raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_lowercase).collect()
    }
}
