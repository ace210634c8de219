//! Per-invocation state shared by all commands

use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Catalog, Config, DataDir};

/// Resolved options, configuration and data location for one run
#[derive(Debug, Clone)]
pub struct Context {
    pub global: GlobalOpts,
    pub config: Config,
    pub data_dir: DataDir,
    /// Why the user config file was skipped, if it was
    pub config_problem: Option<String>,
}

impl Context {
    /// Layer command-line options over the loaded configuration.
    ///
    /// A broken config file falls back to the defaults and is recorded in
    /// `config_problem` for reporting once logging is up.
    pub fn new(global: GlobalOpts) -> Result<Self> {
        let (mut config, config_problem) = match Config::load() {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e.to_string())),
        };
        if let Some(level) = &global.log_level {
            config.log_level = Some(level.clone());
        }
        let data_dir = DataDir::resolve(global.data_dir.as_deref(), &config)
            .map_err(|e| miette::miette!("{}", e))?;
        Ok(Self {
            global,
            config,
            data_dir,
            config_problem,
        })
    }

    /// Open the catalog stored in the data directory
    pub fn open_catalog(&self) -> Catalog {
        Catalog::open(self.data_dir.catalog_path())
    }

    /// The requested output format, with `auto` mapped to `fallback`
    pub fn format_or(&self, fallback: OutputFormat) -> OutputFormat {
        match self.global.format {
            OutputFormat::Auto => fallback,
            f => f,
        }
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }
}
