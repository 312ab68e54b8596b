use std::{env, fmt::Display, str::FromStr};

use anyhow::{anyhow, Result};

/// Reads and parses `name`, falling back to `default` when it is unset.
/// A value that is set but does not parse is an error.
pub fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid value {:?} for {}: {}", raw, name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_uses_default_when_unset() {
        let v: u64 = env_or("MR_COMMON_TEST_SURELY_UNSET", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn env_or_parses_and_rejects() {
        env::set_var("MR_COMMON_TEST_TIMEOUT", " 7 ");
        assert_eq!(env_or::<u64>("MR_COMMON_TEST_TIMEOUT", 1).unwrap(), 7);

        env::set_var("MR_COMMON_TEST_TIMEOUT", "seven");
        assert!(env_or::<u64>("MR_COMMON_TEST_TIMEOUT", 1).is_err());
        env::remove_var("MR_COMMON_TEST_TIMEOUT");
    }
}
