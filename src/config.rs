use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::projection::DEFAULT_POLY_DEGREE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_templates_path")]
    pub templates_path: String,
    #[serde(default = "default_minimums_path")]
    pub minimums_path: String,
    #[serde(default = "default_rules_path")]
    pub rules_path: String,
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    #[serde(default = "default_poly_degree")]
    pub default_poly_degree: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/budget-planner/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.data_dir {
            let join = |name: &str| dir.join(name).to_string_lossy().into_owned();
            self.data.templates_path = join("plans.json");
            self.data.minimums_path = join("mins.json");
            self.data.rules_path = join("association_rules_class.csv");
            self.data.model_path = join("model.json");
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"# Reference data consumed by the planner
[data]
templates_path = "~/.local/share/budget-planner/plans.json"
minimums_path = "~/.local/share/budget-planner/mins.json"
rules_path = "~/.local/share/budget-planner/association_rules_class.csv"
model_path = "~/.local/share/budget-planner/model.json"

[projection]
default_poly_degree = 1

[server]
host = "127.0.0.1"
port = 3002

[log]
level = "info"
"#;
        template.to_string()
    }
}

impl DataConfig {
    pub fn resolved_templates_path(&self) -> PathBuf {
        expand_tilde(&self.templates_path)
    }

    pub fn resolved_minimums_path(&self) -> PathBuf {
        expand_tilde(&self.minimums_path)
    }

    pub fn resolved_rules_path(&self) -> PathBuf {
        expand_tilde(&self.rules_path)
    }

    pub fn resolved_model_path(&self) -> PathBuf {
        expand_tilde(&self.model_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            templates_path: default_templates_path(),
            minimums_path: default_minimums_path(),
            rules_path: default_rules_path(),
            model_path: default_model_path(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            default_poly_degree: default_poly_degree(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_templates_path() -> String {
    "~/.local/share/budget-planner/plans.json".to_string()
}

fn default_minimums_path() -> String {
    "~/.local/share/budget-planner/mins.json".to_string()
}

fn default_rules_path() -> String {
    "~/.local/share/budget-planner/association_rules_class.csv".to_string()
}

fn default_model_path() -> String {
    "~/.local/share/budget-planner/model.json".to_string()
}

fn default_poly_degree() -> usize {
    DEFAULT_POLY_DEGREE
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3002
}

fn default_log_level() -> String {
    "info".to_string()
}
