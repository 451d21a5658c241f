//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use findable_core::{AccessionTable, PipelineConfig};
use url::Url;

/// Key prefix for accession template overrides (`accession.GSE = "..."`).
const ACCESSION_KEY_PREFIX: &str = "accession.";

/// TOML-backed file configuration for findable defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Landing-page probe timeout in seconds.
    pub probe_timeout_secs: Option<u64>,
    /// Crossref metadata timeout in seconds.
    pub doi_metadata_timeout_secs: Option<u64>,
    /// Generic DOI resolver timeout in seconds.
    pub doi_resolver_timeout_secs: Option<u64>,
    /// Crossref API base URL override.
    pub crossref_base_url: Option<String>,
    /// Generic DOI resolver base URL override.
    pub doi_resolver_base_url: Option<String>,
    /// Contact email for the Crossref polite pool.
    pub mailto: Option<String>,
    /// Accession prefix templates, in file order.
    pub accession_templates: Vec<(String, String)>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=100).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=100");
        }

        validate_timeout_secs("probe_timeout_secs", self.probe_timeout_secs)?;
        validate_timeout_secs("doi_metadata_timeout_secs", self.doi_metadata_timeout_secs)?;
        validate_timeout_secs("doi_resolver_timeout_secs", self.doi_resolver_timeout_secs)?;
        validate_base_url("crossref_base_url", self.crossref_base_url.as_deref())?;
        validate_base_url("doi_resolver_base_url", self.doi_resolver_base_url.as_deref())?;

        let mut table = AccessionTable::empty();
        for (prefix, template) in &self.accession_templates {
            table
                .insert(prefix, template)
                .with_context(|| format!("Invalid config value for `accession.{prefix}`"))?;
        }

        Ok(())
    }

    /// Applies file values over `config`.
    pub fn apply_to(&self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = usize::from(concurrency);
        }
        if let Some(secs) = self.probe_timeout_secs {
            config.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.doi_metadata_timeout_secs {
            config.doi.metadata_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.doi_resolver_timeout_secs {
            config.doi.resolver_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = &self.crossref_base_url {
            config.doi.metadata_base_url.clone_from(url);
        }
        if let Some(url) = &self.doi_resolver_base_url {
            config.doi.resolver_base_url.clone_from(url);
        }
        if let Some(mailto) = &self.mailto {
            config.doi.mailto = Some(mailto.clone());
        }
        for (prefix, template) in &self.accession_templates {
            config
                .accession_table
                .insert(prefix, template)
                .with_context(|| format!("Invalid accession template for `{prefix}`"))?;
        }
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

fn validate_base_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let parsed = Url::parse(value)
        .with_context(|| format!("Invalid config value for `{field}`: '{value}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Invalid config value for `{field}`: '{value}'. Expected an http(s) URL");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/findable/config.toml`
/// 2. `$HOME/.config/findable/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("findable")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("findable")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from an explicit path, or from the default path if present.
///
/// An explicit path must exist; a missing default file is not an error.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = load_file_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_number = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "concurrency" => {
                cfg.concurrency = Some(parse_integer_u8(value).with_context(invalid)?);
            }
            "probe_timeout_secs" => {
                cfg.probe_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "doi_metadata_timeout_secs" => {
                cfg.doi_metadata_timeout_secs =
                    Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "doi_resolver_timeout_secs" => {
                cfg.doi_resolver_timeout_secs =
                    Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "crossref_base_url" => {
                cfg.crossref_base_url = Some(parse_string_literal(value).with_context(invalid)?);
            }
            "doi_resolver_base_url" => {
                cfg.doi_resolver_base_url =
                    Some(parse_string_literal(value).with_context(invalid)?);
            }
            "mailto" => {
                cfg.mailto = Some(parse_string_literal(value).with_context(invalid)?);
            }
            accession if accession.starts_with(ACCESSION_KEY_PREFIX) => {
                let prefix = unquote_key(&accession[ACCESSION_KEY_PREFIX.len()..]);
                if prefix.is_empty() {
                    bail!("Missing accession prefix in key `{accession}` on line {line_number}");
                }
                let template = parse_string_literal(value).with_context(invalid)?;
                cfg.accession_templates.push((prefix.to_string(), template));
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn unquote_key(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u8(raw_value: &str) -> Result<u8> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<u16>()?;
    u8::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u8"))
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
