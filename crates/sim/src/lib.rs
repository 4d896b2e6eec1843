//! Config-file support for the simulator CLI.
//!
//! Runs can be parameterized from a plain `key = value` file (one pair per
//! line, `#` comments) layered under the command-line flags: file values
//! override the built-in defaults, flags override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use dagwidth_core::{TangleConfig, WitnessConfig};

/// Failure while reading or interpreting a config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: expected `key = value`, got {text:?}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        text: String,
    },

    #[error("{}:{line}: unknown key {key:?}", path.display())]
    UnknownKey {
        path: PathBuf,
        line: usize,
        key: String,
    },

    #[error("{}:{line}: invalid value for {key:?}: {message}", path.display())]
    InvalidValue {
        path: PathBuf,
        line: usize,
        key: String,
        message: String,
    },
}

impl ConfigFileError {
    fn invalid(path: &Path, line: usize, key: &str, message: impl ToString) -> Self {
        Self::InvalidValue {
            path: path.to_path_buf(),
            line,
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// One `key = value` pair with its source position, for error reporting.
struct Entry<'a> {
    line: usize,
    key: &'a str,
    value: &'a str,
}

fn parse_entries(path: &Path, text: &str) -> Result<Vec<(usize, String, String)>, ConfigFileError> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let stripped = raw.split('#').next().unwrap_or("").trim();
        if stripped.is_empty() {
            continue;
        }
        let Some((key, value)) = stripped.split_once('=') else {
            return Err(ConfigFileError::Syntax {
                path: path.to_path_buf(),
                line,
                text: stripped.to_string(),
            });
        };
        entries.push((line, key.trim().to_string(), value.trim().to_string()));
    }
    Ok(entries)
}

fn parse_value<T>(path: &Path, entry: &Entry<'_>) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    entry
        .value
        .parse()
        .map_err(|e: T::Err| ConfigFileError::invalid(path, entry.line, entry.key, e))
}

/// Layer a tangle config file over `config`.
pub fn apply_tangle_file(config: &mut TangleConfig, path: &Path) -> Result<(), ConfigFileError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    for (line, key, value) in parse_entries(path, &text)? {
        let entry = Entry {
            line,
            key: &key,
            value: &value,
        };
        match key.as_str() {
            "num_processes" => config.num_processes = parse_value(path, &entry)?,
            "lambda_per_process" => config.lambda_per_process = parse_value(path, &entry)?,
            "sim_duration" => config.sim_duration = parse_value(path, &entry)?,
            "min_delay" => config.min_delay = parse_value(path, &entry)?,
            "max_delay" => config.max_delay = parse_value(path, &entry)?,
            "sel_mode" => {
                config.sel_mode = value
                    .parse()
                    .map_err(|e| ConfigFileError::invalid(path, line, &key, e))?;
            }
            "security_bias" => config.security_bias = parse_value(path, &entry)?,
            "alpha" => config.alpha = parse_value(path, &entry)?,
            "seed" => config.seed = parse_value(path, &entry)?,
            "output" => config.output = PathBuf::from(&value),
            _ => {
                return Err(ConfigFileError::UnknownKey {
                    path: path.to_path_buf(),
                    line,
                    key,
                })
            }
        }
    }
    Ok(())
}

/// Layer a witness config file over `config`.
pub fn apply_witness_file(config: &mut WitnessConfig, path: &Path) -> Result<(), ConfigFileError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    for (line, key, value) in parse_entries(path, &text)? {
        let entry = Entry {
            line,
            key: &key,
            value: &value,
        };
        match key.as_str() {
            "num_users" => config.num_users = parse_value(path, &entry)?,
            "post_prob_per_step" => config.post_prob_per_step = parse_value(path, &entry)?,
            "sim_duration" => config.sim_duration = parse_value(path, &entry)?,
            "min_delay" => config.min_delay = parse_value(path, &entry)?,
            "max_delay" => config.max_delay = parse_value(path, &entry)?,
            "max_witnesses" => config.max_witnesses = parse_value(path, &entry)?,
            "seed" => config.seed = parse_value(path, &entry)?,
            "output" => config.output = PathBuf::from(&value),
            _ => {
                return Err(ConfigFileError::UnknownKey {
                    path: path.to_path_buf(),
                    line,
                    key,
                })
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn tangle_file_overrides_defaults() {
        let file = write_file(
            "# sweep point 3\n\
             num_processes = 25\n\
             lambda_per_process = 0.1\n\
             sel_mode = RANDOM_ONLY\n\
             seed = 99\n\
             output = out/run3.csv\n",
        );
        let mut config = TangleConfig::default();
        apply_tangle_file(&mut config, file.path()).unwrap();
        assert_eq!(config.num_processes, 25);
        assert_eq!(config.lambda_per_process, 0.1);
        assert_eq!(config.seed, 99);
        assert_eq!(config.output, PathBuf::from("out/run3.csv"));
        // Untouched keys keep their defaults.
        assert_eq!(config.sim_duration, 100.0);
    }

    #[test]
    fn witness_file_overrides_defaults() {
        let file = write_file("num_users = 7\nmax_witnesses = 0\n");
        let mut config = WitnessConfig::default();
        apply_witness_file(&mut config, file.path()).unwrap();
        assert_eq!(config.num_users, 7);
        assert_eq!(config.max_witnesses, 0);
        assert_eq!(config.post_prob_per_step, 0.02);
    }

    #[test]
    fn unknown_key_reports_line_number() {
        let file = write_file("seed = 1\nnum_procs = 10\n");
        let mut config = TangleConfig::default();
        let err = apply_tangle_file(&mut config, file.path()).unwrap_err();
        match err {
            ConfigFileError::UnknownKey { line, key, .. } => {
                assert_eq!(line, 2);
                assert_eq!(key, "num_procs");
            }
            other => panic!("expected UnknownKey, got {other}"),
        }
    }

    #[test]
    fn bad_value_reports_key() {
        let file = write_file("sel_mode = mcmc\n");
        let mut config = TangleConfig::default();
        let err = apply_tangle_file(&mut config, file.path()).unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { .. }));
        assert!(err.to_string().contains("sel_mode"));
    }

    #[test]
    fn missing_equals_is_a_syntax_error() {
        let file = write_file("seed 42\n");
        let mut config = TangleConfig::default();
        let err = apply_tangle_file(&mut config, file.path()).unwrap_err();
        assert!(matches!(err, ConfigFileError::Syntax { line: 1, .. }));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let file = write_file("\n# full line comment\nseed = 5 # trailing\n\n");
        let mut config = WitnessConfig::default();
        apply_witness_file(&mut config, file.path()).unwrap();
        assert_eq!(config.seed, 5);
    }
}
