use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::Scenario;
use crate::model::{FrameDriver, SimConfig, StepSettings, World, WorldEvent};

pub struct App {
    pub running: bool,
    pub world: World,
    pub config: SimConfig,
    pub settings: StepSettings,
    pub scenario: Scenario,
    pub driver: FrameDriver,
    pub config_path: PathBuf,
    pub config_last_modified: Option<SystemTime>,
    /// Events raised by the most recent tick.
    pub last_events: Vec<WorldEvent>,
}

impl App {
    /// Loads the configuration at `config_path` (defaults when the file is
    /// missing) and sets up the chosen scenario.
    pub fn new<P: AsRef<Path>>(config_path: P, scenario: Scenario) -> Result<Self> {
        let config_path = config_path.as_ref().to_path_buf();
        let config = Self::load_config(&config_path)?;
        let config_last_modified = std::fs::metadata(&config_path)
            .ok()
            .and_then(|m| m.modified().ok());
        Self::with_config(config, scenario).map(|mut app| {
            app.config_path = config_path;
            app.config_last_modified = config_last_modified;
            app
        })
    }

    /// Builds an app from an in-memory configuration.
    pub fn with_config(config: SimConfig, scenario: Scenario) -> Result<Self> {
        let mut world = World::new(config.clone())?;
        scenario.apply(&mut world)?;
        let settings = StepSettings {
            o2_base: config.world.o2_base,
            ..StepSettings::default()
        };
        let driver = FrameDriver::new(config.target_tps, 8);
        tracing::info!(scenario = ?scenario, agents = world.agents().len(), "Scenario ready");
        Ok(Self {
            running: true,
            world,
            config,
            settings,
            scenario,
            driver,
            config_path: PathBuf::new(),
            config_last_modified: None,
            last_events: Vec::new(),
        })
    }

    /// Reads and validates a TOML configuration. A missing file yields the
    /// defaults; a malformed one is an error.
    pub fn load_config(path: &Path) -> Result<SimConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => SimConfig::from_toml(&content)
                .with_context(|| format!("invalid configuration in {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(SimConfig::default())
            }
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    /// Picks up edits to the configuration file.
    ///
    /// Only tuning sections are swapped in. World dimensions, field
    /// coefficients and the seed stay fixed until the next reset.
    pub fn check_config_reload(&mut self) -> Result<bool> {
        let Ok(metadata) = std::fs::metadata(&self.config_path) else {
            return Ok(false);
        };
        let modified = metadata.modified()?;
        if Some(modified) == self.config_last_modified {
            return Ok(false);
        }
        self.config_last_modified = Some(modified);
        let new_config = match Self::load_config(&self.config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid configuration edit");
                return Ok(false);
            }
        };

        self.config.reactions = new_config.reactions;
        self.config.territory = new_config.territory;
        self.config.agents = new_config.agents;
        self.config.medic = new_config.medic;
        self.config.debug = new_config.debug;
        self.world.config.reactions = self.config.reactions.clone();
        self.world.config.territory = self.config.territory.clone();
        self.world.config.agents = self.config.agents.clone();
        self.world.config.medic = self.config.medic.clone();
        self.world.config.debug = self.config.debug.clone();
        Ok(true)
    }
}
