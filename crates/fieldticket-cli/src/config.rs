// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fieldticket_app::{LeaseField, NestedEditPolicy, ScreenOptions, paging::DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub editor: Editor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            storage: Storage::default(),
            ui: Ui::default(),
            editor: Editor::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Api {
    pub domain: Option<String>,
    /// Hostname the tenant label is taken from, e.g. `acme.ogfieldticket.com`.
    pub host: Option<String>,
    /// Overrides tenant derivation entirely.
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub page_size: Option<i64>,
    pub search_fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Editor {
    pub forward_nested_edits: Option<bool>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FIELDTICKET_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set FIELDTICKET_CONFIG_PATH to the config file"
            )
        })?;

        let app_dir = config_root.join(fieldticket_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [storage], [ui], and [editor]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            fieldticket_db::validate_db_path(db_path)?;
        }

        if let Some(domain) = &self.api.domain
            && domain.trim().is_empty()
        {
            bail!("api.domain in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.ui.page_size
            && page_size <= 0
        {
            bail!(
                "ui.page_size in {} must be positive, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(fields) = &self.ui.search_fields {
            if fields.is_empty() {
                bail!(
                    "ui.search_fields in {} must list at least one field",
                    path.display()
                );
            }
            for name in fields {
                if LeaseField::parse(name).is_none() {
                    bail!(
                        "ui.search_fields in {} names unknown field {:?}; use lease field names such as LeaseName or RRC",
                        path.display(),
                        name
                    );
                }
            }
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => fieldticket_db::default_db_path(),
        }
    }

    pub fn api_domain(&self) -> &str {
        self.api
            .domain
            .as_deref()
            .unwrap_or(fieldticket_api::DEFAULT_DOMAIN)
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Explicit `base_url` first, then the tenant from the signed-in
    /// session's subdomain, then the configured host.
    pub fn api_base_url(&self, subdomain: Option<&str>) -> Result<String> {
        if let Some(base_url) = &self.api.base_url {
            return Ok(base_url.clone());
        }
        let url = fieldticket_api::tenant_base_url(
            self.api_domain(),
            self.api.host.as_deref(),
            subdomain,
        )?;
        Ok(url.to_string())
    }

    pub fn page_size(&self) -> usize {
        self.ui
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn search_fields(&self) -> Vec<LeaseField> {
        match &self.ui.search_fields {
            Some(names) => names
                .iter()
                .filter_map(|name| LeaseField::parse(name))
                .collect(),
            None => LeaseField::DEFAULT_SEARCH.to_vec(),
        }
    }

    pub fn nested_edit_policy(&self) -> NestedEditPolicy {
        if self.editor.forward_nested_edits.unwrap_or(false) {
            NestedEditPolicy::IncludeEdits
        } else {
            NestedEditPolicy::NewOnly
        }
    }

    pub fn screen_options(&self) -> ScreenOptions {
        ScreenOptions {
            page_size: self.page_size(),
            search_fields: self.search_fields(),
            nested_edits: self.nested_edit_policy(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        let search = LeaseField::DEFAULT_SEARCH
            .iter()
            .map(|field| format!("\"{}\"", field.wire_name()))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "# fieldticket config\n# Place this file at: {}\n\nversion = 1\n\n[api]\ndomain = \"{}\"\n# Tenant is the first label of a host with more than two labels.\n# host = \"acme.{}\"\n# base_url = \"https://acme.{}/\"\ntimeout = \"{}\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/fieldticket/fieldticket.db)\n# db_path = \"/absolute/path/to/fieldticket.db\"\n\n[ui]\npage_size = {}\nsearch_fields = [{}]\n\n[editor]\n# Send edits to existing tanks and wells on save, not only new rows.\nforward_nested_edits = false\n",
            path.display(),
            fieldticket_api::DEFAULT_DOMAIN,
            fieldticket_api::DEFAULT_DOMAIN,
            fieldticket_api::DEFAULT_DOMAIN,
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
            search,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
