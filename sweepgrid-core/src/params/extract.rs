//! Folder-name parameter extraction.
//!
//! A folder name is decoded by an ordered list of [`Strategy`] values. Each strategy is a pure
//! `&str -> ParameterMap` function paired with a [`MergePolicy`] that states how its output
//! combines with the strategies before it:
//!
//! 1. `schedule_pair` ([`MergePolicy::Exclusive`]): a strength-schedule token followed by a
//!    cfg-scale-schedule token. When both are present their canonical names are the whole result.
//! 2. `token_pairs` ([`MergePolicy::Overwrite`]): every `name_value` / `name-value` substring,
//!    minus numeric names and stop-listed words with non-numeric values.
//! 3. `two_axis` ([`MergePolicy::Overwrite`]): the first XYZ-plot pattern that captures an
//!    `x_name/x_value/y_name/y_value` quadruple; its two keys overwrite `token_pairs` output.
//!
//! Timestamps (runs of [`ExtractorConfig::timestamp_digits`] digits plus one trailing `_`) are
//! stripped before any strategy runs. Extraction never fails: an unrecognized name yields an
//! empty or partial map.

use std::collections::BTreeSet;

use regex::Regex;

use crate::foundation::error::{SweepError, SweepResult};
use crate::params::map::ParameterMap;
use crate::params::value::{ParameterValue, is_numeric_token};

/// Fixed heuristics used by [`Extractor`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Words that are never parameter names unless their value is numeric. Case-insensitive.
    pub stop_words: BTreeSet<String>,
    /// Length of the digit run treated as a batch timestamp.
    pub timestamp_digits: usize,
    /// Canonical name of the strength schedule parameter.
    pub strength_key: String,
    /// Canonical name of the cfg-scale schedule parameter.
    pub cfg_scale_key: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            stop_words: [
                "seed", "iter", "fixed", "random", "date", "settings", "best", "new", "circle",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            timestamp_digits: 14,
            strength_key: "strength_schedule".to_string(),
            cfg_scale_key: "cfg_scale_schedule".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Reject an empty timestamp width or empty schedule keys.
    pub fn validate(&self) -> SweepResult<()> {
        if self.timestamp_digits == 0 {
            return Err(SweepError::validation(
                "extractor timestamp_digits must be > 0",
            ));
        }
        if self.strength_key.is_empty() || self.cfg_scale_key.is_empty() {
            return Err(SweepError::validation(
                "extractor schedule keys must be non-empty",
            ));
        }
        Ok(())
    }
}

/// How a strategy's output combines with what earlier strategies produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergePolicy {
    /// A non-empty result is the final answer; later strategies are skipped.
    Exclusive,
    /// Keys in the result replace the same keys from earlier strategies.
    Overwrite,
}

type StrategyFn = fn(&Patterns, &Rules, &str) -> ParameterMap;

/// One named extraction strategy.
#[derive(Clone, Copy)]
pub struct Strategy {
    /// Stable name used in logs.
    pub name: &'static str,
    /// How the result combines with earlier strategies.
    pub merge: MergePolicy,
    run: StrategyFn,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("merge", &self.merge)
            .finish()
    }
}

const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "schedule_pair",
        merge: MergePolicy::Exclusive,
        run: schedule_pair,
    },
    Strategy {
        name: "token_pairs",
        merge: MergePolicy::Overwrite,
        run: token_pairs,
    },
    Strategy {
        name: "two_axis",
        merge: MergePolicy::Overwrite,
        run: two_axis,
    },
];

#[derive(Debug)]
struct Patterns {
    timestamp: Regex,
    schedule_pair: Regex,
    token_pairs: Vec<Regex>,
    /// Pattern plus the capture groups holding `x_name, x_value, y_name, y_value`.
    two_axis: Vec<(Regex, [usize; 4])>,
}

#[derive(Debug)]
struct Rules {
    stop_words: BTreeSet<String>,
    strength_key: String,
    cfg_scale_key: String,
}

/// Decodes folder names into [`ParameterMap`]s.
#[derive(Debug)]
pub struct Extractor {
    patterns: Patterns,
    rules: Rules,
}

impl Extractor {
    /// Compile the strategy patterns for `config`.
    pub fn new(config: &ExtractorConfig) -> SweepResult<Self> {
        config.validate()?;
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                SweepError::validation(format!("invalid extractor pattern '{pattern}': {e}"))
            })
        };

        let strength = regex::escape(&config.strength_key);
        let cfg_scale = regex::escape(&config.cfg_scale_key);
        let patterns = Patterns {
            timestamp: compile(&format!(r"\d{{{}}}_?", config.timestamp_digits))?,
            schedule_pair: compile(&format!(
                r"(\w*{strength})_([^_]+).*?(\w*{cfg_scale})_([^_]+)"
            ))?,
            token_pairs: vec![
                compile(r"(\w+_schedule)_([^_]+)")?,
                compile(r"(\w+)_([^_\-]+)")?,
                compile(r"(\w+)-([^_\-]+)")?,
            ],
            two_axis: vec![
                (
                    compile(r"(\w+_schedule)_([^_]+)_(\w+_schedule)_([^_]+)")?,
                    [1, 2, 3, 4],
                ),
                // Leading group absorbs any prefix before the quadruple.
                (compile(r"(\w+)_(\w+)_([^_]+)_(\w+)_([^_]+)")?, [2, 3, 4, 5]),
                (compile(r"(\w+)-([^_]+)_(\w+)-([^_]+)")?, [1, 2, 3, 4]),
            ],
        };
        let rules = Rules {
            stop_words: config
                .stop_words
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            strength_key: config.strength_key.clone(),
            cfg_scale_key: config.cfg_scale_key.clone(),
        };
        Ok(Self { patterns, rules })
    }

    /// Strategies in the order they are applied.
    pub fn strategies(&self) -> &'static [Strategy] {
        &STRATEGIES
    }

    /// Remove every timestamp token (and one adjoining `_`) from `folder_name`.
    pub fn strip_timestamps(&self, folder_name: &str) -> String {
        self.patterns
            .timestamp
            .replace_all(folder_name, "")
            .into_owned()
    }

    /// Decode `folder_name` into a parameter map.
    pub fn extract(&self, folder_name: &str) -> ParameterMap {
        let cleaned = self.strip_timestamps(folder_name);
        let mut params = ParameterMap::new();
        for strategy in self.strategies() {
            let found = (strategy.run)(&self.patterns, &self.rules, &cleaned);
            if found.is_empty() {
                continue;
            }
            match strategy.merge {
                MergePolicy::Exclusive => {
                    tracing::trace!(folder_name, strategy = strategy.name, "exclusive match");
                    return found;
                }
                MergePolicy::Overwrite => params.overwrite_with(found),
            }
        }
        if params.is_empty() {
            tracing::debug!(folder_name, "no parameters recognized");
        }
        params
    }
}

fn schedule_pair(patterns: &Patterns, rules: &Rules, name: &str) -> ParameterMap {
    let Some(caps) = patterns.schedule_pair.captures(name) else {
        return ParameterMap::new();
    };
    let mut out = ParameterMap::new();
    out.insert(
        rules.strength_key.clone(),
        ParameterValue::parse(&caps[2]),
    );
    out.insert(
        rules.cfg_scale_key.clone(),
        ParameterValue::parse(&caps[4]),
    );
    out
}

fn token_pairs(patterns: &Patterns, rules: &Rules, name: &str) -> ParameterMap {
    let mut out = ParameterMap::new();
    for re in &patterns.token_pairs {
        for caps in re.captures_iter(name) {
            // `\w` spans `_`, so a dash match can start on the previous separator.
            let param = caps[1].trim_matches('_');
            let value = &caps[2];
            if param.is_empty() || param.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            if rules.stop_words.contains(&param.to_lowercase()) && !is_numeric_token(value) {
                continue;
            }
            out.insert(param, ParameterValue::parse(value));
        }
    }
    out
}

fn two_axis(patterns: &Patterns, _rules: &Rules, name: &str) -> ParameterMap {
    let mut out = ParameterMap::new();
    for (re, [xn, xv, yn, yv]) in &patterns.two_axis {
        let Some(caps) = re.captures(name) else {
            continue;
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str());
        if let (Some(x_name), Some(x_value), Some(y_name), Some(y_value)) =
            (group(*xn), group(*xv), group(*yn), group(*yv))
        {
            out.insert(x_name, ParameterValue::parse(x_value));
            out.insert(y_name, ParameterValue::parse(y_value));
            break;
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/params/extract.rs"]
mod tests;
