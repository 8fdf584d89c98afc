//! Environment-driven tuning for property-test suites.
//!
//! Suites call [`ProptestRunProfile::load`] with their own defaults so CI can
//! scale case counts without touching test code.

use std::env;

/// Environment variable overriding the number of cases per property.
pub const PROGTEST_CASES_ENV_KEY: &str = "PROGTEST_CASES";
/// Environment variable toggling forked proptest execution.
pub const COHORT_PBT_FORK_ENV_KEY: &str = "COHORT_PBT_FORK";

/// Case count and fork setting for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the process environment.
    ///
    /// # Examples
    /// ```
    /// use cohort_test_support::proptest_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to the defaults for
    /// missing or malformed values.
    ///
    /// # Examples
    /// ```
    /// use cohort_test_support::proptest_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::from_lookup(32, false, |key| {
    ///     (key == "PROGTEST_CASES").then(|| "8".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 8);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn from_lookup(
        default_cases: u32,
        default_fork: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let cases = override_or(&lookup, PROGTEST_CASES_ENV_KEY, default_cases, parse_cases);
        let fork = override_or(&lookup, COHORT_PBT_FORK_ENV_KEY, default_fork, parse_flag);
        Self { cases, fork }
    }

    #[rustfmt::skip]
    #[must_use]
    pub const fn cases(&self) -> u32 { self.cases }

    #[rustfmt::skip]
    #[must_use]
    pub const fn fork(&self) -> bool { self.fork }
}

fn override_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    parse: fn(&str) -> Result<T, &'static str>,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    parse(&raw).unwrap_or_else(|reason| {
        tracing::warn!(
            env = key,
            raw = %raw,
            reason,
            "ignoring malformed property-test override",
        );
        default
    })
}

fn parse_cases(raw: &str) -> Result<u32, &'static str> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err("case count must be positive"),
        Ok(cases) => Ok(cases),
        Err(_) => Err("case count must be an unsigned integer"),
    }
}

fn parse_flag(raw: &str) -> Result<bool, &'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true/false, 1/0, yes/no or on/off"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn profile_from(pairs: &[(&str, &str)]) -> ProptestRunProfile {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        ProptestRunProfile::from_lookup(64, false, |key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let profile = profile_from(&[]);
        assert_eq!(profile.cases(), 64);
        assert!(!profile.fork());
    }

    #[rstest]
    #[case("256", 256)]
    #[case(" 12 ", 12)]
    #[case("0", 64)]
    #[case("-3", 64)]
    #[case("many", 64)]
    fn case_overrides(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(profile_from(&[(PROGTEST_CASES_ENV_KEY, raw)]).cases(), expected);
    }

    #[rstest]
    #[case("1", true)]
    #[case("ON", true)]
    #[case("yes", true)]
    #[case("off", false)]
    #[case("0", false)]
    #[case("maybe", false)]
    fn fork_overrides(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(profile_from(&[(COHORT_PBT_FORK_ENV_KEY, raw)]).fork(), expected);
    }
}
