//! Configuration management for the KYC fraud pipeline

use crate::validation::Blacklists;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, File};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Configuration file read when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub rules: RulesConfig,
    pub verification: VerificationConfig,
    pub model: ModelConfig,
    pub generator: GeneratorConfig,
    pub logging: LoggingConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Directory for record files and the verification report
    pub data_dir: PathBuf,
    /// Directory for the model artifact
    pub models_dir: PathBuf,
    /// Uploaded record file; synthetic records are generated when absent
    #[serde(default)]
    pub input_file: Option<PathBuf>,
    pub raw_file: String,
    pub processed_file: String,
    pub final_file: String,
    pub verification_file: String,
    pub model_file: String,
}

impl PathsConfig {
    pub fn raw_path(&self) -> PathBuf {
        self.data_dir.join(&self.raw_file)
    }

    pub fn processed_path(&self) -> PathBuf {
        self.data_dir.join(&self.processed_file)
    }

    pub fn final_path(&self) -> PathBuf {
        self.data_dir.join(&self.final_file)
    }

    pub fn verification_path(&self) -> PathBuf {
        self.data_dir.join(&self.verification_file)
    }

    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join(&self.model_file)
    }
}

/// Static rule thresholds and blacklists
#[derive(Debug, Clone, Deserialize)]
pub struct RulesConfig {
    /// Transaction amounts strictly above this are flagged
    #[serde(default = "default_amount_threshold")]
    pub amount_threshold: f64,
    /// Transaction counts strictly above this are flagged
    #[serde(default = "default_count_threshold")]
    pub count_threshold: u32,
    #[serde(default)]
    pub blacklists: Blacklists,
}

fn default_amount_threshold() -> f64 {
    50_000.0
}

fn default_count_threshold() -> u32 {
    30
}

/// Identity verification thresholds and simulation parameters
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    pub authenticity_threshold: f64,
    pub liveness_threshold: f64,
    pub face_match_threshold: f64,
    /// Liveness score merged when the capability reports none
    #[serde(default)]
    pub default_liveness_score: f64,
    /// Document IDs that lower the simulated authenticity score
    #[serde(default = "default_document_blacklist")]
    pub document_blacklist: BTreeSet<String>,
    /// Documents expiring before this date lower the simulated authenticity score
    #[serde(default = "default_expiry_cutoff")]
    pub expiry_cutoff: NaiveDate,
    /// Identity document image
    #[serde(default)]
    pub document_path: Option<PathBuf>,
    /// Live photo / selfie image
    #[serde(default)]
    pub selfie_path: Option<PathBuf>,
    /// Seed for the simulated scorer (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_document_blacklist() -> BTreeSet<String> {
    ["123456789012", "987654321098"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_expiry_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 26).unwrap_or_default()
}

/// Classifier training parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Fraction of records held out for evaluation
    pub test_size: f64,
    /// Seed for the split and the forest
    pub seed: u64,
    /// Maximum tree depth (unbounded when absent)
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Synthetic record generation
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    pub records: usize,
    /// Probability of substituting a blacklisted PAN (and, separately, Aadhaar)
    pub blacklist_rate: f64,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load `explicit` if given, else the default file if it exists, else
    /// the built-in defaults.
    ///
    /// Returns the file the configuration came from. A file that exists but
    /// does not parse is always an error.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        Self::resolve_with_default(explicit, Path::new(DEFAULT_CONFIG_PATH))
    }

    fn resolve_with_default(
        explicit: Option<&Path>,
        default_path: &Path,
    ) -> Result<(Self, Option<PathBuf>)> {
        match explicit {
            Some(path) => Ok((Self::load_from_path(path)?, Some(path.to_path_buf()))),
            None if default_path.exists() => Ok((
                Self::load_from_path(default_path)?,
                Some(default_path.to_path_buf()),
            )),
            None => Ok((Self::default(), None)),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig {
                data_dir: PathBuf::from("data"),
                models_dir: PathBuf::from("models"),
                input_file: None,
                raw_file: "raw_kyc_data.csv".to_string(),
                processed_file: "processed_kyc_data.csv".to_string(),
                final_file: "final_kyc_predictions.csv".to_string(),
                verification_file: "verification_result.json".to_string(),
                model_file: "fraud_detection_model.bin".to_string(),
            },
            rules: RulesConfig {
                amount_threshold: default_amount_threshold(),
                count_threshold: default_count_threshold(),
                blacklists: Blacklists::default(),
            },
            verification: VerificationConfig {
                authenticity_threshold: 0.5,
                liveness_threshold: 0.5,
                face_match_threshold: 0.6,
                default_liveness_score: 0.0,
                document_blacklist: default_document_blacklist(),
                expiry_cutoff: default_expiry_cutoff(),
                document_path: None,
                selfie_path: None,
                seed: None,
            },
            model: ModelConfig {
                n_estimators: 100,
                test_size: 0.2,
                seed: 42,
                max_depth: None,
            },
            generator: GeneratorConfig {
                records: 500,
                blacklist_rate: 0.02,
                seed: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
