use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::binder::surface::Region;
use crate::report::profile::Profile;
use crate::types::{OptimizeRequest, SolverParams, Targets, Technique};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_technique")]
    pub technique: String,
    #[serde(default = "default_budget")]
    pub budget: f64,
    #[serde(default)]
    pub targets: Targets,
    #[serde(default)]
    pub solver: SolverParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Region ids left out of the terminal surface, e.g. `["charts-section"]`.
    #[serde(default)]
    pub hidden_regions: Vec<String>,
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetOverrides {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestOverrides {
    #[serde(default)]
    pub targets: TargetOverrides,
    pub profile: Option<Profile>,
    pub technique: Option<String>,
    pub budget: Option<f64>,
    pub population_size: Option<u32>,
    pub generations: Option<u32>,
    pub mutation_rate: Option<f64>,
    pub max_qty_per_food: Option<u32>,
    pub tolerance: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/diet-dashboard/config.toml")
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
        if let Some(url) = overrides.backend_url {
            self.backend.url = url;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.backend.timeout_secs = timeout_secs;
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
        let template = r#"[backend]
url = "http://localhost:5000"
timeout_secs = 60
connect_timeout_secs = 5

[defaults]
technique = "ga"
budget = 10.0

[defaults.targets]
calories = 2000.0
protein = 100.0
carbs = 250.0
fat = 70.0

[defaults.solver]
population_size = 30
generations = 50

[display]
hidden_regions = []
chart_width = 40

[server]
host = "127.0.0.1"
port = 3002
"#;
        template.to_string()
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }
}

impl DefaultsConfig {
    pub fn technique(&self) -> Result<Technique> {
        Technique::from_str(&self.technique)
            .with_context(|| format!("invalid default technique in config: {}", self.technique))
    }

    pub fn resolve_request(&self, overrides: RequestOverrides) -> Result<OptimizeRequest> {
        let technique = match overrides.technique.as_deref() {
            Some(raw) => Technique::from_str(raw)?,
            None => self.technique()?,
        };
        let budget = overrides.budget.unwrap_or(self.budget);
        if !budget.is_finite() || budget < 0.0 {
            bail!("budget must be a non-negative number, got {budget}");
        }
        // Explicit targets win over profile recommendations, which win over config.
        let base = match &overrides.profile {
            Some(profile) => {
                profile.validate()?;
                profile.recommend().targets()
            }
            None => self.targets,
        };
        let targets = Targets {
            calories: overrides.targets.calories.unwrap_or(base.calories),
            protein: overrides.targets.protein.unwrap_or(base.protein),
            carbs: overrides.targets.carbs.unwrap_or(base.carbs),
            fat: overrides.targets.fat.unwrap_or(base.fat),
        };
        let mut params = self.solver.clone();
        if let Some(population_size) = overrides.population_size {
            params.population_size = population_size;
        }
        if let Some(generations) = overrides.generations {
            params.generations = generations;
        }
        params.mutation_rate = overrides.mutation_rate.or(params.mutation_rate);
        params.max_qty_per_food = overrides.max_qty_per_food.or(params.max_qty_per_food);
        params.tolerance = overrides.tolerance.or(params.tolerance);
        Ok(OptimizeRequest {
            targets,
            budget,
            technique,
            params,
        })
    }
}

impl DisplayConfig {
    pub fn hidden(&self) -> Vec<Region> {
        self.hidden_regions
            .iter()
            .filter_map(|id| Region::from_str(id).ok())
            .collect()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            technique: default_technique(),
            budget: default_budget(),
            targets: Targets::default(),
            solver: SolverParams::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hidden_regions: Vec::new(),
            chart_width: default_chart_width(),
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

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_technique() -> String {
    "ga".to_string()
}

fn default_budget() -> f64 {
    10.0
}

fn default_chart_width() -> usize {
    40
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3002
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::profile::{ActivityLevel, Gender, Goal};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.backend.url, "http://localhost:5000");
        assert_eq!(config.defaults.targets, Targets::default());
        assert_eq!(config.defaults.solver.generations, 50);
    }

    #[test]
    fn template_round_trips_and_partial_files_are_defaulted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/config.toml");
        Config::write_template(&path).expect("write template");
        let config = Config::load(Some(&path)).expect("load template");
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.defaults.technique().expect("technique"), Technique::Ga);

        fs::write(&path, "[backend]\nurl = \"http://optimizer:8080\"\n").expect("write");
        let config = Config::load(Some(&path)).expect("load partial");
        assert_eq!(config.backend.url, "http://optimizer:8080");
        assert_eq!(config.backend.timeout_secs, 60);
        assert_eq!(config.display.chart_width, 40);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut config = Config::default();
        config.apply_overrides(ConfigOverrides {
            backend_url: Some("http://10.0.0.2:5000".to_string()),
            timeout_secs: Some(0),
        });
        assert_eq!(config.backend.url, "http://10.0.0.2:5000");
        assert_eq!(config.backend.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn request_overrides_layer_over_defaults() {
        let defaults = DefaultsConfig::default();
        let request = defaults
            .resolve_request(RequestOverrides::default())
            .expect("request");
        assert_eq!(request.technique, Technique::Ga);
        assert_eq!(request.budget, 10.0);
        assert_eq!(request.targets, Targets::default());
        assert_eq!(request.params.population_size, 30);

        let request = defaults
            .resolve_request(RequestOverrides {
                technique: Some("both".to_string()),
                targets: TargetOverrides {
                    protein: Some(140.0),
                    ..TargetOverrides::default()
                },
                generations: Some(120),
                ..RequestOverrides::default()
            })
            .expect("request");
        assert_eq!(request.technique, Technique::Both);
        assert_eq!(request.targets.protein, 140.0);
        assert_eq!(request.targets.calories, 2000.0);
        assert_eq!(request.params.generations, 120);
    }

    #[test]
    fn profile_recommendations_sit_between_config_and_flags() {
        let profile = Profile {
            weight_kg: 70.0,
            height_cm: 170.0,
            age: 25,
            gender: Gender::Male,
            activity: ActivityLevel::Moderate,
            goal: Goal::Maintain,
        };
        let request = DefaultsConfig::default()
            .resolve_request(RequestOverrides {
                profile: Some(profile.clone()),
                targets: TargetOverrides {
                    fat: Some(60.0),
                    ..TargetOverrides::default()
                },
                ..RequestOverrides::default()
            })
            .expect("request");
        assert_eq!(request.targets.calories, 2545.0);
        assert_eq!(request.targets.protein, 133.0);
        assert_eq!(request.targets.fat, 60.0);

        let invalid = Profile {
            weight_kg: -5.0,
            ..profile
        };
        assert!(DefaultsConfig::default()
            .resolve_request(RequestOverrides {
                profile: Some(invalid),
                ..RequestOverrides::default()
            })
            .is_err());
    }

    #[test]
    fn request_overrides_are_validated() {
        let defaults = DefaultsConfig::default();
        assert!(defaults
            .resolve_request(RequestOverrides {
                technique: Some("annealing".to_string()),
                ..RequestOverrides::default()
            })
            .is_err());
        assert!(defaults
            .resolve_request(RequestOverrides {
                budget: Some(-1.0),
                ..RequestOverrides::default()
            })
            .is_err());
    }

    #[test]
    fn hidden_regions_skip_unknown_ids() {
        let display = DisplayConfig {
            hidden_regions: vec!["charts-section".to_string(), "sidebar".to_string()],
            ..DisplayConfig::default()
        };
        assert_eq!(display.hidden(), vec![Region::ChartsSection]);
    }
}
