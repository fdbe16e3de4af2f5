//! Source inspection: language distribution and inline test detection.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tokei::{Config, LanguageType};

use crate::fs::FileSystem;
use crate::signals::LanguageDistribution;

/// Result of reading every recognized source file once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReport {
    /// Language name to percentage of counted lines.
    pub languages: LanguageDistribution,
    /// Source files that declare tests inline.
    pub test_sources: BTreeSet<PathBuf>,
}

/// Inspects source files using `tokei` language detection.
pub struct LanguageInspector<'a, F: FileSystem> {
    fs: &'a F,
    config: Config,
}

impl<'a, F: FileSystem> LanguageInspector<'a, F> {
    /// Create a new inspector with default `tokei` configuration.
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            config: Config::default(),
        }
    }

    /// Inspect the given files.
    ///
    /// Files `tokei` does not recognize are ignored. Unreadable files
    /// (binary, permission denied) are logged and skipped.
    pub fn inspect(&self, files: &[PathBuf]) -> SourceReport {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut test_sources = BTreeSet::new();
        let mut total = 0usize;

        for path in files {
            let Some(language) = LanguageType::from_path(path, &self.config) else {
                continue;
            };
            let contents = match self.fs.read_to_string(path) {
                Ok(contents) => contents,
                Err(err) => {
                    log::warn!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            if has_inline_tests(language, &contents) {
                test_sources.insert(path.clone());
            }
            let lines = count_lines(&contents);
            if lines == 0 {
                continue;
            }
            total += lines;
            *counts.entry(language.to_string()).or_insert(0) += lines;
        }

        SourceReport {
            languages: distribution(counts, total),
            test_sources,
        }
    }
}

fn distribution(counts: BTreeMap<String, usize>, total: usize) -> LanguageDistribution {
    if total == 0 {
        return BTreeMap::new();
    }
    counts
        .into_iter()
        .map(|(language, count)| (language, (count as f64 / total as f64) * 100.0))
        .collect()
}

fn has_inline_tests(language: LanguageType, contents: &str) -> bool {
    match language {
        LanguageType::Rust => {
            contents.contains("#[cfg(test)]")
                || contents.contains("#[test]")
                || contents.contains("#[tokio::test")
        }
        LanguageType::Elixir => contents.contains("ExUnit.Case"),
        _ => false,
    }
}

fn count_lines(text: &str) -> usize {
    text.lines().count()
}
