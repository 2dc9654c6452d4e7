use anyhow::{Context, Result};
use sat_reconcile::columns::ColumnKeywords;
use sat_reconcile::identifier::DuplicatePolicy;
use sat_reconcile::reconcile::ReconcileOptions;
use sat_reconcile::report::ReportOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default input and output files, relative to the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFiles {
    pub odoo: Option<PathBuf>,
    pub sat: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "RawConfigColumns")]
pub struct ConfigColumns(pub ColumnKeywords);

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfigColumns {
    number: Option<Vec<String>>,
    series: Option<Vec<String>>,
    folio: Option<Vec<String>>,
    payment_status: Option<Vec<String>>,
    sat_status: Option<Vec<String>>,
}

impl TryFrom<RawConfigColumns> for ConfigColumns {
    type Error = String;

    fn try_from(raw: RawConfigColumns) -> Result<Self, Self::Error> {
        fn keywords(
            name: &str,
            value: Option<Vec<String>>,
            default: Vec<String>,
        ) -> Result<Vec<String>, String> {
            match value {
                None => Ok(default),
                Some(keywords) if keywords.iter().all(|k| k.trim().is_empty()) => Err(format!(
                    "columns.{name} must list at least one non-empty keyword"
                )),
                Some(keywords) => Ok(keywords.iter().map(|k| k.trim().to_lowercase()).collect()),
            }
        }

        let default = ColumnKeywords::default();
        Ok(ConfigColumns(ColumnKeywords {
            number: keywords("number", raw.number, default.number)?,
            series: keywords("series", raw.series, default.series)?,
            folio: keywords("folio", raw.folio, default.folio)?,
            payment_status: keywords("payment_status", raw.payment_status, default.payment_status)?,
            sat_status: keywords("sat_status", raw.sat_status, default.sat_status)?,
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigReport {
    pub money_columns: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigDuplicates {
    #[default]
    First,
    Last,
    Reject,
}

impl From<ConfigDuplicates> for DuplicatePolicy {
    fn from(value: ConfigDuplicates) -> Self {
        match value {
            ConfigDuplicates::First => DuplicatePolicy::KeepFirst,
            ConfigDuplicates::Last => DuplicatePolicy::KeepLast,
            ConfigDuplicates::Reject => DuplicatePolicy::Reject,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub files: ConfigFiles,
    #[serde(default)]
    pub columns: ConfigColumns,
    #[serde(default)]
    pub report: ConfigReport,
    #[serde(default)]
    pub duplicates: ConfigDuplicates,
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<(PathBuf, Self)> {
        let base_dir = path.parent().map(ToOwned::to_owned).unwrap_or_default();

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());

        Ok((base_dir, config))
    }

    pub fn find_and_load() -> Result<Option<(PathBuf, Self)>> {
        let config_locations = [
            Path::new("sat-reconcile.toml"),
            Path::new(".sat-reconcile.toml"),
        ];

        for location in &config_locations {
            if location.exists() {
                return Self::load_from_file(location).map(Some);
            }
        }

        Ok(None)
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            keywords: self.columns.0.clone(),
            duplicates: self.duplicates.into(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        match &self.report.money_columns {
            Some(money_columns) => ReportOptions {
                money_columns: money_columns.clone(),
            },
            None => ReportOptions::default(),
        }
    }
}
