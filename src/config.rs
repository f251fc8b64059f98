//! Dashboard configuration.
//!
//! Resolution order (highest priority first):
//! 1. Environment variables (`DATADECK_*`)
//! 2. The file named by `DATADECK_CONFIG`
//! 3. `datadeck.toml` in the working directory
//! 4. Compiled defaults
//!
//! Files are merged key by key (tables recursively), so a layer only
//! overrides the keys it sets.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ChartTheme;
use crate::data::series::ChartKind;
use crate::report::DEFAULT_SAMPLE_LIMIT;
use crate::stats::Alignment;

pub const PROJECT_CONFIG_FILE: &str = "datadeck.toml";
pub const CONFIG_ENV: &str = "DATADECK_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid value for {field}: {message}")]
    Validation { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub theme: ChartTheme,
    /// Upper bound on plotted numeric columns.
    pub max_series: usize,
    /// Plotted rows, `[start, end)`.
    pub row_window: [usize; 2],
    pub show_grid: bool,
    pub show_legend: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            kind: ChartKind::Line,
            theme: ChartTheme::Quantum,
            max_series: 3,
            row_window: [0, 20],
            show_grid: true,
            show_legend: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub preview_rows: usize,
    pub preview_columns: usize,
    /// Preview cells longer than this are cut and suffixed with "...".
    pub cell_truncate: usize,
    pub report_sample_limit: usize,
    pub correlation_alignment: Alignment,
    pub tasks_file: PathBuf,
    /// Entries kept in the session activity log.
    pub activity_limit: usize,
    pub chart: ChartConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            preview_columns: 8,
            cell_truncate: 30,
            report_sample_limit: DEFAULT_SAMPLE_LIMIT,
            correlation_alignment: Alignment::PairwiseComplete,
            tasks_file: PathBuf::from("datadeck-tasks.json"),
            activity_limit: 500,
            chart: ChartConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from `root` and the environment.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut config = Self::load_files(root, explicit.as_deref())?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but falls back to defaults on any error.
    pub fn load_or_default(root: &Path) -> Self {
        match Self::load(root) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default configuration: {e}");
                Self::default()
            }
        }
    }

    /// Merge `datadeck.toml` in `root` (if present) with `explicit` on top.
    fn load_files(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut table = toml::Table::new();

        let project = root.join(PROJECT_CONFIG_FILE);
        if project.exists() {
            merge_tables(&mut table, read_table(&project)?);
            log::info!("Loaded configuration from {}", project.display());
        }
        if let Some(path) = explicit {
            merge_tables(&mut table, read_table(path)?);
            log::info!("Loaded configuration from {}", path.display());
        }

        Self::from_table(table, "<merged configuration>")
    }

    /// Parse a TOML document. Unknown keys are ignored.
    #[cfg(test)]
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Self::from_table(parse_table(toml_str, "<string>")?, "<string>")
    }

    fn from_table(table: toml::Table, origin: &str) -> Result<Self, ConfigError> {
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })
    }

    /// Apply `DATADECK_PREVIEW_ROWS` / `DATADECK_SAMPLE_LIMIT`; unparseable
    /// values are ignored with a warning.
    fn apply_env_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        let read = |key: &str, slot: &mut usize| {
            if let Some(raw) = get(key) {
                match raw.trim().parse() {
                    Ok(v) => *slot = v,
                    Err(_) => log::warn!("Ignoring {key}={raw:?}: not a number"),
                }
            }
        };
        read("DATADECK_PREVIEW_ROWS", &mut self.preview_rows);
        read("DATADECK_SAMPLE_LIMIT", &mut self.report_sample_limit);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("preview_rows", self.preview_rows),
            ("preview_columns", self.preview_columns),
            ("report_sample_limit", self.report_sample_limit),
            ("activity_limit", self.activity_limit),
            ("chart.max_series", self.chart.max_series),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        let [start, end] = self.chart.row_window;
        if start > end {
            return Err(ConfigError::Validation {
                field: "chart.row_window".to_string(),
                message: format!("start {start} is after end {end}"),
            });
        }
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_table(&text, &path.display().to_string())
}

fn parse_table(text: &str, path: &str) -> Result<toml::Table, ConfigError> {
    text.parse::<toml::Table>().map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Overlay `top` onto `base`; nested tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(below)), toml::Value::Table(above)) => {
                merge_tables(below, above)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.report_sample_limit, 1000);
        assert_eq!(config.chart.row_window, [0, 20]);
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = DashboardConfig::from_toml(
            r#"
            preview_rows = 25
            correlation_alignment = "independent"
            unknown_key = 1

            [chart]
            kind = "scatter"
            show_grid = false
            "#,
        )
        .unwrap();
        assert_eq!(config.preview_rows, 25);
        assert_eq!(config.correlation_alignment, Alignment::Independent);
        assert_eq!(config.chart.kind, ChartKind::Scatter);
        assert!(!config.chart.show_grid);
        assert_eq!(config.chart.max_series, 3);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = DashboardConfig::from_toml("preview_rows = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn validation_rejects_zero_and_reversed_window() {
        let mut config = DashboardConfig::default();
        config.preview_rows = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "preview_rows"
        ));

        let mut config = DashboardConfig::default();
        config.chart.row_window = [10, 5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let env: HashMap<&str, &str> = [
            ("DATADECK_PREVIEW_ROWS", "42"),
            ("DATADECK_SAMPLE_LIMIT", "lots"),
        ]
        .into_iter()
        .collect();
        let mut config = DashboardConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.preview_rows, 42);
        assert_eq!(config.report_sample_limit, 1000);
    }

    #[test]
    fn project_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROJECT_CONFIG_FILE), "cell_truncate = 12\n").unwrap();
        let config = DashboardConfig::load_files(dir.path(), None).unwrap();
        assert_eq!(config.cell_truncate, 12);

        let missing =
            DashboardConfig::load_files(dir.path(), Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn explicit_file_layers_over_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "cell_truncate = 12\npreview_rows = 5\n[chart]\nshow_grid = false\n",
        )
        .unwrap();
        let explicit = dir.path().join("override.toml");
        std::fs::write(&explicit, "preview_rows = 7\n[chart]\nkind = \"bar\"\ntheme = \"ocean\"\n").unwrap();

        let config = DashboardConfig::load_files(dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.preview_rows, 7);
        assert_eq!(config.cell_truncate, 12);
        assert!(!config.chart.show_grid);
        assert_eq!(config.chart.kind, ChartKind::Bar);
        assert_eq!(config.chart.theme, ChartTheme::Ocean);
        assert_eq!(config.chart.max_series, 3);

        let only_project = DashboardConfig::load_files(dir.path(), None).unwrap();
        assert_eq!(only_project.preview_rows, 5);
        assert_eq!(only_project.chart.kind, ChartKind::Line);

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(
            DashboardConfig::load_files(empty.path(), None).unwrap(),
            DashboardConfig::default()
        );
    }

    #[test]
    fn bad_value_type_is_a_parse_error() {
        let err = DashboardConfig::from_toml("preview_rows = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
