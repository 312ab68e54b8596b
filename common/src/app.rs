use std::sync::Arc;

use crate::indexer::Indexer;
use crate::kv::{sort_and_group, KeyValue};
use crate::wordcount::WordCount;

/// The user functions of a job.
///
/// `map` receives an input record name and its full contents and returns
/// key/value pairs in any order. `reduce` receives one key and every value
/// emitted for it and returns the aggregated value.
pub trait MapReduceApp: Send + Sync {
    fn name(&self) -> &str;

    fn map(&self, source: &str, contents: &str) -> Vec<KeyValue>;

    fn reduce(&self, key: &str, values: &[String]) -> String;
}

/// Adapts a pair of closures into a [`MapReduceApp`].
pub struct FnApp<M, R> {
    name: String,
    map: M,
    reduce: R,
}

impl<M, R> FnApp<M, R>
where
    M: Fn(&str, &str) -> Vec<KeyValue> + Send + Sync,
    R: Fn(&str, &[String]) -> String + Send + Sync,
{
    pub fn new(name: impl Into<String>, map: M, reduce: R) -> Self {
        Self {
            name: name.into(),
            map,
            reduce,
        }
    }
}

impl<M, R> MapReduceApp for FnApp<M, R>
where
    M: Fn(&str, &str) -> Vec<KeyValue> + Send + Sync,
    R: Fn(&str, &[String]) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self, source: &str, contents: &str) -> Vec<KeyValue> {
        (self.map)(source, contents)
    }

    fn reduce(&self, key: &str, values: &[String]) -> String {
        (self.reduce)(key, values)
    }
}

pub const BUILTIN_APPS: &[&str] = &["wc", "indexer"];

pub fn app_by_name(name: &str) -> Option<Arc<dyn MapReduceApp>> {
    match name {
        "wc" | "wordcount" => Some(Arc::new(WordCount)),
        "indexer" => Some(Arc::new(Indexer)),
        _ => None,
    }
}

/// Sorts, groups and reduces `pairs`: one output pair per distinct key,
/// ascending by key.
pub fn reduce_all(app: &dyn MapReduceApp, pairs: Vec<KeyValue>) -> Vec<KeyValue> {
    sort_and_group(pairs)
        .into_iter()
        .map(|(key, values)| {
            let value = app.reduce(&key, &values);
            KeyValue { key, value }
        })
        .collect()
}
