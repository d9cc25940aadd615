//! Configuration loading pipeline

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use strata_core::{ConfigResult, ConfigTree, PropertyStore};
use strata_registry::FunctionRegistry;
use tracing::{debug, info, warn};

use crate::runtime::detect_mode;
use crate::settings::LoaderSettings;
use crate::stages::{
    ArgsStage, DecodeStage, EnvStage, HelpOutput, HelpStage, ModeStage, ReadStage,
};
use crate::validation::Validatable;

/// One pass of the pipeline over the property store
pub trait ParseStage: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()>;
}

type StageFn = dyn Fn(&mut dyn PropertyStore) -> ConfigResult<()> + Send + Sync;

/// A named closure usable as a stage
pub struct FnStage {
    name: String,
    f: Box<StageFn>,
}

impl FnStage {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut dyn PropertyStore) -> ConfigResult<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl ParseStage for FnStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        (self.f)(store)
    }
}

/// The stages every loader starts with, in their default order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinStage {
    Read,
    Decode,
    Args,
    Envs,
    Mods,
    Help,
}

impl BuiltinStage {
    pub const DEFAULT_ORDER: [BuiltinStage; 6] = [
        BuiltinStage::Read,
        BuiltinStage::Decode,
        BuiltinStage::Args,
        BuiltinStage::Envs,
        BuiltinStage::Mods,
        BuiltinStage::Help,
    ];
}

#[derive(Clone)]
enum StageSlot {
    Builtin(BuiltinStage),
    Custom(Arc<dyn ParseStage>),
}

/// Runs the parse stages over a property store.
///
/// The default order is read, decode, args, envs, mods, help: the document
/// is the base, command-line arguments override it, environment variables
/// override those, and mode overlays win over everything. The first stage
/// error aborts the run and is returned unchanged.
pub struct ConfigLoader {
    registry: Arc<FunctionRegistry>,
    settings: LoaderSettings,
    args: Option<Vec<String>>,
    env_vars: Option<Vec<(String, String)>>,
    runtime_mode: Option<String>,
    help_output: Option<HelpOutput>,
    slots: Vec<StageSlot>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("settings", &self.settings)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl ConfigLoader {
    /// Loader over the process-wide registry with default settings
    pub fn new() -> Self {
        Self::with_registry(strata_registry::global())
    }

    pub fn with_registry(registry: Arc<FunctionRegistry>) -> Self {
        Self {
            registry,
            settings: LoaderSettings::default(),
            args: None,
            env_vars: None,
            runtime_mode: None,
            help_output: None,
            slots: BuiltinStage::DEFAULT_ORDER
                .iter()
                .copied()
                .map(StageSlot::Builtin)
                .collect(),
        }
    }

    /// Loader whose registry and settings both come from `settings`
    pub fn from_settings(settings: LoaderSettings) -> ConfigResult<Self> {
        let registry = settings.build_registry();
        Self::with_registry(registry).with_settings(settings)
    }

    pub fn with_settings(mut self, settings: LoaderSettings) -> ConfigResult<Self> {
        settings.validate()?;
        self.settings = settings;
        Ok(self)
    }

    /// Use `args` instead of the process arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Use `vars` instead of the process environment
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Pin the runtime mode; takes precedence over `settings.runtime_mode`
    pub fn with_runtime_mode(mut self, mode: impl Into<String>) -> Self {
        self.runtime_mode = Some(mode.into());
        self
    }

    /// Send the configuration dump to `writer`
    pub fn with_help_output<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.help_output = Some(HelpOutput::Writer(Arc::new(Mutex::new(writer))));
        self
    }

    /// Append a stage after all others
    pub fn push_stage(mut self, stage: impl ParseStage + 'static) -> Self {
        self.slots.push(StageSlot::Custom(Arc::new(stage)));
        self
    }

    /// Insert a stage right before a built-in one (appended if that one was removed)
    pub fn insert_stage_before(
        mut self,
        anchor: BuiltinStage,
        stage: impl ParseStage + 'static,
    ) -> Self {
        let slot = StageSlot::Custom(Arc::new(stage));
        match self
            .slots
            .iter()
            .position(|s| matches!(s, StageSlot::Builtin(b) if *b == anchor))
        {
            Some(index) => self.slots.insert(index, slot),
            None => self.slots.push(slot),
        }
        self
    }

    /// Drop a built-in stage from the run
    pub fn without_stage(mut self, stage: BuiltinStage) -> Self {
        self.slots
            .retain(|s| !matches!(s, StageSlot::Builtin(b) if *b == stage));
        self
    }

    pub fn registry(&self) -> &Arc<FunctionRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    /// Names of the stages in run order
    pub fn stage_names(&self) -> Vec<String> {
        self.stages().iter().map(|s| s.name().to_string()).collect()
    }

    /// Run every stage over `store`
    pub fn load(&self, store: &mut dyn PropertyStore) -> ConfigResult<()> {
        for stage in self.stages() {
            debug!("Running config stage '{}'", stage.name());
            if let Err(e) = stage.apply(store) {
                warn!("Config stage '{}' failed: {}", stage.name(), e);
                return Err(e);
            }
        }
        info!("Configuration resolved");
        Ok(())
    }

    /// Run every stage over `seed` and return the resolved tree
    pub fn load_tree(&self, mut seed: ConfigTree) -> ConfigResult<ConfigTree> {
        self.load(&mut seed)?;
        Ok(seed)
    }

    fn stages(&self) -> Vec<Arc<dyn ParseStage>> {
        self.slots
            .iter()
            .map(|slot| match slot {
                StageSlot::Builtin(builtin) => self.instantiate(*builtin),
                StageSlot::Custom(stage) => stage.clone(),
            })
            .collect()
    }

    fn instantiate(&self, builtin: BuiltinStage) -> Arc<dyn ParseStage> {
        match builtin {
            BuiltinStage::Read => Arc::new(ReadStage::new(self.registry.clone())),
            BuiltinStage::Decode => Arc::new(DecodeStage),
            BuiltinStage::Args => match &self.args {
                Some(args) => Arc::new(ArgsStage::new(args.clone())),
                None => Arc::new(ArgsStage::from_process()),
            },
            BuiltinStage::Envs => match &self.env_vars {
                Some(vars) => Arc::new(EnvStage::with_vars(
                    self.settings.env_prefix.clone(),
                    vars.clone(),
                )),
                None => Arc::new(EnvStage::new(self.settings.env_prefix.clone())),
            },
            BuiltinStage::Mods => {
                let mode = self
                    .runtime_mode
                    .clone()
                    .or_else(|| self.settings.runtime_mode.clone())
                    .unwrap_or_else(detect_mode);
                Arc::new(ModeStage::new(mode))
            }
            BuiltinStage::Help => {
                let output = self
                    .help_output
                    .clone()
                    .unwrap_or_else(|| self.settings.dump_output.into());
                Arc::new(HelpStage::new(self.settings.help_key.clone(), output))
            }
        }
    }
}
