use std::collections::BTreeSet;

use crate::app::MapReduceApp;
use crate::kv::KeyValue;
use crate::wordcount::words;

/// Inverted index: for each word, the documents it appears in.
pub struct Indexer;

impl MapReduceApp for Indexer {
    fn name(&self) -> &str {
        "indexer"
    }

    fn map(&self, source: &str, contents: &str) -> Vec<KeyValue> {
        let distinct: BTreeSet<&str> = words(contents).collect();
        distinct
            .into_iter()
            .map(|w| KeyValue::new(w, source))
            .collect()
    }

    /// `"<count> doc1,doc2,..."` with documents sorted and deduplicated.
    fn reduce(&self, _key: &str, values: &[String]) -> String {
        let docs: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        let joined = docs.iter().copied().collect::<Vec<_>>().join(",");
        format!("{} {}", docs.len(), joined)
    }
}
