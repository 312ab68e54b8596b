use crate::app::MapReduceApp;
use crate::kv::KeyValue;

/// Word count: every maximal run of letters is a word.
pub struct WordCount;

/// Splits on anything that is not a letter.
pub fn words(contents: &str) -> impl Iterator<Item = &str> {
    contents
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
}

impl MapReduceApp for WordCount {
    fn name(&self) -> &str {
        "wc"
    }

    fn map(&self, _source: &str, contents: &str) -> Vec<KeyValue> {
        words(contents).map(|w| KeyValue::new(w, "1")).collect()
    }

    /// Sums the values; anything that is not a number counts as zero.
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        values
            .iter()
            .filter_map(|v| v.parse::<u64>().ok())
            .sum::<u64>()
            .to_string()
    }
}
