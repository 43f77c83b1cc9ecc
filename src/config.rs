//! Configuration loading
//!
//! Settings come from three layers, highest precedence first: CLI flags and
//! their environment variables, the `.sqs-tf.yaml` file in the root module
//! directory, then built-in defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::traits::FileSystem;

pub const CONFIG_FILE_NAME: &str = ".sqs-tf.yaml";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MODULE_DIR: &str = "modules/sqs";
pub const DEFAULT_MODULE_CALLS_FILE: &str = "main.tf";
pub const DEFAULT_OUTPUTS_FILE: &str = "outputs.tf";
pub const DEFAULT_AWS_BIN: &str = "aws";
pub const DEFAULT_TERRAFORM_BIN: &str = "terraform";
pub const DEFAULT_ENDPOINT_DOMAIN: &str = "amazonaws.com";

/// Contents of a `.sqs-tf.yaml` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub queue_name_prefix: Option<String>,
    #[serde(default)]
    pub module_dir: Option<String>,
    #[serde(default)]
    pub module_calls_file: Option<String>,
    #[serde(default)]
    pub outputs_file: Option<String>,
    #[serde(default)]
    pub aws_bin: Option<String>,
    #[serde(default)]
    pub terraform_bin: Option<String>,
    #[serde(default)]
    pub endpoint_domain: Option<String>,
}

impl ConfigFile {
    pub fn from_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the explicitly named config file, or `<root_dir>/.sqs-tf.yaml` if it exists
    pub fn load(fs: &dyn FileSystem, root_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !fs.exists(path) {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(fs, path);
        }

        let default_path = root_dir.join(CONFIG_FILE_NAME);
        if fs.exists(&default_path) {
            Self::from_file(fs, &default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Values supplied on the command line (or through their env vars)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub queue_name_prefix: Option<String>,
    pub aws_bin: Option<String>,
    pub terraform_bin: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub root_dir: PathBuf,
    pub region: String,
    pub profile: Option<String>,
    pub queue_name_prefix: Option<String>,
    pub module_dir: PathBuf,
    pub module_calls_file: PathBuf,
    pub outputs_file: PathBuf,
    pub aws_bin: String,
    pub terraform_bin: String,
    pub endpoint_domain: String,
}

impl Settings {
    pub fn resolve(root_dir: &Path, file: ConfigFile, overrides: Overrides) -> Result<Self> {
        let module_dir = file
            .module_dir
            .unwrap_or_else(|| DEFAULT_MODULE_DIR.to_string());

        let module_dir = PathBuf::from(module_dir);
        if !is_relative_and_normal(&module_dir) {
            anyhow::bail!(
                "module_dir must be a relative path inside the root module, got '{}'",
                module_dir.display()
            );
        }

        let module_calls_file = target_file(
            "module_calls_file",
            file.module_calls_file,
            DEFAULT_MODULE_CALLS_FILE,
            &module_dir,
        )?;
        let outputs_file =
            target_file("outputs_file", file.outputs_file, DEFAULT_OUTPUTS_FILE, &module_dir)?;

        Ok(Self {
            root_dir: root_dir.to_path_buf(),
            region: pick(overrides.region, file.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            profile: pick(overrides.profile, file.profile),
            queue_name_prefix: pick(overrides.queue_name_prefix, file.queue_name_prefix),
            module_dir,
            module_calls_file,
            outputs_file,
            aws_bin: pick(overrides.aws_bin, file.aws_bin)
                .unwrap_or_else(|| DEFAULT_AWS_BIN.to_string()),
            terraform_bin: pick(overrides.terraform_bin, file.terraform_bin)
                .unwrap_or_else(|| DEFAULT_TERRAFORM_BIN.to_string()),
            endpoint_domain: file
                .endpoint_domain
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ENDPOINT_DOMAIN.to_string()),
        })
    }

    pub fn module_dir_path(&self) -> PathBuf {
        self.root_dir.join(&self.module_dir)
    }

    pub fn module_calls_path(&self) -> PathBuf {
        self.root_dir.join(&self.module_calls_file)
    }

    pub fn outputs_path(&self) -> PathBuf {
        self.root_dir.join(&self.outputs_file)
    }

    /// Module source as written in a module call, e.g. `./modules/sqs`
    pub fn module_source(&self) -> String {
        let parts: Vec<String> = self
            .module_dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        format!("./{}", parts.join("/"))
    }
}

/// Prefer the override, ignoring blank values
fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
}

/// A target file relative to the root module and outside the generated module directory
fn target_file(
    key: &str,
    value: Option<String>,
    default: &str,
    module_dir: &Path,
) -> Result<PathBuf> {
    let path = PathBuf::from(
        value
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string()),
    );

    if !is_relative_and_normal(&path) {
        anyhow::bail!(
            "{} must be a relative path inside the root module, got '{}'",
            key,
            path.display()
        );
    }

    if normal_parts(&path).starts_with(&normal_parts(module_dir)) {
        anyhow::bail!(
            "{} must not be inside module_dir '{}', got '{}'",
            key,
            module_dir.display(),
            path.display()
        );
    }

    Ok(path)
}

fn normal_parts(path: &Path) -> Vec<&std::ffi::OsStr> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

fn is_relative_and_normal(path: &Path) -> bool {
    let mut has_part = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_part = true,
            Component::CurDir => {}
            _ => return false,
        }
    }
    has_part
}
