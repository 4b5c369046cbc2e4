//! File configuration for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// `key = value` file configuration; CLI flags override every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub subtitle_language: Option<String>,
    pub video_resolution: Option<String>,
    pub download_quizzes: Option<bool>,
    pub download_notebooks: Option<bool>,
    pub unrestricted_filenames: Option<bool>,
    pub mathjax_cdn_url: Option<String>,
    pub reverse_order: Option<bool>,
    /// Catalog database path.
    pub database: Option<PathBuf>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Rejects values the CLI would reject too.
    pub fn validate(&self) -> Result<()> {
        for (key, timeout) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
        ] {
            if let Some(secs) = timeout
                && !TIMEOUT_RANGE.contains(&secs)
            {
                bail!("`{key}` must be within 1..=3600 seconds, got {secs}");
            }
        }
        Ok(())
    }

    fn assign(&mut self, key: &str, value: ConfigValue) -> Result<()> {
        match key {
            "subtitle_language" => self.subtitle_language = Some(value.into_string(key)?),
            "video_resolution" => self.video_resolution = Some(value.into_string(key)?),
            "mathjax_cdn_url" => self.mathjax_cdn_url = Some(value.into_string(key)?),
            "database" => self.database = Some(PathBuf::from(value.into_string(key)?)),
            "download_quizzes" => self.download_quizzes = Some(value.into_bool(key)?),
            "download_notebooks" => self.download_notebooks = Some(value.into_bool(key)?),
            "unrestricted_filenames" => self.unrestricted_filenames = Some(value.into_bool(key)?),
            "reverse_order" => self.reverse_order = Some(value.into_bool(key)?),
            "connect_timeout_secs" => self.connect_timeout_secs = Some(value.into_secs(key)?),
            "read_timeout_secs" => self.read_timeout_secs = Some(value.into_secs(key)?),
            unknown => bail!("Unknown configuration key: '{unknown}'"),
        }
        Ok(())
    }
}

const TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// A right-hand side: `"quoted"`, `true`/`false`, or a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConfigValue {
    Text(String),
    Flag(bool),
    Number(u64),
}

impl ConfigValue {
    fn parse(raw: &str) -> Result<Self> {
        if let Some(inner) = raw.strip_prefix('"') {
            let Some(text) = inner.strip_suffix('"') else {
                bail!("unterminated string {raw}");
            };
            return Ok(Self::Text(text.to_string()));
        }
        match raw {
            "true" => Ok(Self::Flag(true)),
            "false" => Ok(Self::Flag(false)),
            _ => raw
                .parse::<u64>()
                .map(Self::Number)
                .with_context(|| format!("expected a quoted string, boolean, or integer, got `{raw}`")),
        }
    }

    fn into_string(self, key: &str) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            other => bail!("`{key}` takes a double-quoted string, got {other:?}"),
        }
    }

    fn into_bool(self, key: &str) -> Result<bool> {
        match self {
            Self::Flag(flag) => Ok(flag),
            other => bail!("`{key}` takes `true` or `false`, got {other:?}"),
        }
    }

    fn into_secs(self, key: &str) -> Result<u64> {
        match self {
            Self::Number(secs) => Ok(secs),
            other => bail!("`{key}` takes a whole number of seconds, got {other:?}"),
        }
    }
}

/// `$XDG_CONFIG_HOME/coursedl/config.toml`, else `$HOME/.config/coursedl/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let non_empty = |name| env::var_os(name).filter(|value| !value.is_empty());
    let base = non_empty("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("coursedl").join("config.toml"))
}

/// Loads config from the default path; a missing file yields the empty config.
pub fn load_default_file_config() -> Result<FileConfig> {
    match resolve_default_config_path() {
        Some(path) if path.is_file() => load_file_config(&path),
        _ => Ok(FileConfig::default()),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
    parse_config_str(&contents).with_context(|| format!("Invalid config file '{}'", path.display()))
}

fn parse_config_str(contents: &str) -> Result<FileConfig> {
    let mut config = FileConfig::default();
    for (number, line) in (1..).zip(contents.lines()) {
        let line = without_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let (key, raw) = line
            .split_once('=')
            .with_context(|| format!("line {number}: expected `key = value`"))?;
        let key = key.trim();
        ConfigValue::parse(raw.trim())
            .and_then(|value| config.assign(key, value))
            .with_context(|| format!("line {number}: invalid `{key}`"))?;
    }
    config.validate()?;
    Ok(config)
}

/// Cuts a `#` comment that is not inside a quoted string.
fn without_comment(line: &str) -> &str {
    let mut quoted = false;
    line.char_indices()
        .find(|&(_, c)| {
            if c == '"' {
                quoted = !quoted;
            }
            c == '#' && !quoted
        })
        .map_or(line, |(at, _)| &line[..at])
}
