use std::hash::Hasher;
use std::io::{self, Read, Write};

use fnv::FnvHasher;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/* =========================
   Routing keys to buckets
   ========================= */

/// Stable across processes and builds, unlike `DefaultHasher`.
pub fn ihash(key: &str) -> u32 {
    let mut h = FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Bucket in `[0, n_reduce)` for `key`. `n_reduce` must be non-zero.
pub fn bucket_for(key: &str, n_reduce: usize) -> usize {
    ihash(key) as usize % n_reduce
}

/// Splits `pairs` into `n_reduce` buckets, keeping emission order inside each.
pub fn partition(pairs: Vec<KeyValue>, n_reduce: usize) -> Vec<Vec<KeyValue>> {
    let mut buckets: Vec<Vec<KeyValue>> = (0..n_reduce).map(|_| Vec::new()).collect();
    for kv in pairs {
        let bucket = bucket_for(&kv.key, n_reduce);
        buckets[bucket].push(kv);
    }
    buckets
}

/// Sorts by key and collects the values of each run of equal keys.
pub fn sort_and_group(mut pairs: Vec<KeyValue>) -> Vec<(String, Vec<String>)> {
    pairs.sort_by(|a, b| a.key.cmp(&b.key));
    pairs
        .chunk_by(|a, b| a.key == b.key)
        .map(|run| {
            let values = run.iter().map(|kv| kv.value.clone()).collect();
            (run[0].key.clone(), values)
        })
        .collect()
}

/* =========================
   Partition file encoding
   ========================= */

/// One JSON object per line.
pub fn write_pairs<W: Write + ?Sized>(writer: &mut W, pairs: &[KeyValue]) -> io::Result<()> {
    for kv in pairs {
        serde_json::to_writer(&mut *writer, kv)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Decodes records one at a time until the reader is exhausted.
pub fn read_pairs<R: Read>(reader: R) -> io::Result<Vec<KeyValue>> {
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<KeyValue>()
        .map(|rec| rec.map_err(io::Error::from))
        .collect()
}
