//! The compute context: resolved mode plus the facade over both backends.
//!
//! A context resolves its mode lazily on first read and caches it until it is
//! overwritten with [`ComputeContext::set_gpu_mode`], re-resolved with
//! [`ComputeContext::refresh`], or cleared with [`ComputeContext::reset`].
//! The cached mode sits behind a `parking_lot::RwLock`, so concurrent readers
//! and writers see whole values and the last writer wins.

use super::{resolver::ModeResolver, status::StatusReport};
use crate::{
    compute::{
        array::{Array, ArrayInput, ArrayOptions},
        backend::{ComputeBackend, HostTransfer},
        dispatch::Dispatcher,
        table::{Table, TableInput, TableOptions},
    },
    config::{
        env::{process_env, EnvLookup, EnvOverrides},
        settings::ResolverConfig,
    },
    core::{
        error::Result,
        types::{Mode, ModeSource, Resolution},
    },
    detect::{Detection, GpuDetector, SystemDetector},
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Owns the resolved mode and dispatches to the matching backend.
pub struct ComputeContext {
    resolver: ModeResolver<Arc<dyn GpuDetector>>,
    env: EnvLookup,
    dispatcher: Dispatcher,
    state: RwLock<Option<Resolution>>,
}

impl ComputeContext {
    /// Context probing the running system and reading the process environment.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a customised context.
    pub fn builder() -> ComputeContextBuilder {
        ComputeContextBuilder::new()
    }

    /// The current resolution, resolving it first if needed.
    pub fn resolution(&self) -> Resolution {
        if let Some(resolution) = *self.state.read() {
            return resolution;
        }

        let mut state = self.state.write();
        if let Some(resolution) = *state {
            return resolution;
        }
        let resolution = self.resolve_now();
        *state = Some(resolution);
        resolution
    }

    /// The current mode.
    pub fn mode(&self) -> Mode {
        self.resolution().mode
    }

    /// Whether GPU mode is active.
    pub fn gpu_mode(&self) -> bool {
        self.mode().is_gpu()
    }

    /// Overwrites the mode without checking GPU availability.
    pub fn set_gpu_mode(&self, enabled: bool) {
        self.set_mode(Mode::from(enabled));
    }

    /// Overwrites the mode without checking GPU availability.
    pub fn set_mode(&self, mode: Mode) {
        let previous = self
            .state
            .write()
            .replace(Resolution::new(mode, ModeSource::Manual));
        info!(
            mode = %mode,
            previous = ?previous.map(|r| r.mode),
            "compute mode set manually"
        );
    }

    /// Re-reads the environment and re-runs resolution.
    pub fn refresh(&self) -> Resolution {
        let mut state = self.state.write();
        let resolution = self.resolve_now();
        *state = Some(resolution);
        resolution
    }

    /// Clears the cached mode; the next read resolves again.
    pub fn reset(&self) {
        *self.state.write() = None;
    }

    /// Whether the mode has been resolved or set.
    pub fn is_resolved(&self) -> bool {
        self.state.read().is_some()
    }

    /// The backend of the current mode.
    pub fn backend(&self) -> Arc<dyn ComputeBackend> {
        self.dispatcher.select(self.mode())
    }

    /// Name of the array library of the current pair.
    pub fn array_library(&self) -> &'static str {
        self.backend().array_library()
    }

    /// Name of the tabular library of the current pair.
    pub fn table_library(&self) -> &'static str {
        self.backend().table_library()
    }

    /// Constructs an array with the current backend.
    pub fn create_array<I: Into<ArrayInput>>(
        &self,
        data: I,
        options: &ArrayOptions,
    ) -> Result<Array> {
        self.backend().create_array(data.into(), options)
    }

    /// Constructs a table with the current backend.
    pub fn create_table<I: Into<TableInput>>(
        &self,
        data: I,
        options: &TableOptions,
    ) -> Result<Table> {
        self.backend().create_table(data.into(), options)
    }

    /// Copies a device-resident object to host memory; host objects are
    /// returned unchanged.
    pub fn to_cpu<T: HostTransfer>(&self, obj: T) -> Result<T> {
        if !obj.is_on_device() {
            return Ok(obj);
        }
        obj.transfer_to_host(self.dispatcher.gpu().as_ref())
    }

    /// Waits for pending device work in GPU mode; no-op in CPU mode.
    pub fn synchronize(&self) -> Result<()> {
        match self.mode() {
            Mode::Gpu => self.dispatcher.gpu().synchronize(),
            Mode::Cpu => Ok(()),
        }
    }

    /// Runs both detection probes without changing the mode.
    pub fn detection(&self) -> Detection {
        Detection::run(self.resolver.detector())
    }

    /// Snapshot of the mode and of a fresh detection run.
    pub fn status(&self) -> StatusReport {
        let resolution = self.resolution();
        let backend = self.dispatcher.select(resolution.mode);
        StatusReport::new(resolution, &self.detection(), backend.as_ref())
    }

    fn resolve_now(&self) -> Resolution {
        let env = EnvOverrides::from_lookup(|key| (self.env)(key));
        let resolution = self.resolver.resolve(&env);
        info!(mode = %resolution.mode, source = %resolution.source, "compute mode resolved");
        resolution
    }
}

impl Default for ComputeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComputeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputeContext")
            .field("resolver", &self.resolver)
            .field("dispatcher", &self.dispatcher)
            .field("state", &*self.state.read())
            .finish()
    }
}

/// Builder for [`ComputeContext`].
pub struct ComputeContextBuilder {
    config: ResolverConfig,
    detector: Option<Arc<dyn GpuDetector>>,
    env: Option<EnvLookup>,
    dispatcher: Option<Dispatcher>,
}

impl ComputeContextBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
            detector: None,
            env: None,
            dispatcher: None,
        }
    }

    /// Set the resolver configuration.
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom detector instead of probing the system.
    pub fn detector<D: GpuDetector + 'static>(mut self, detector: D) -> Self {
        self.detector = Some(Arc::new(detector));
        self
    }

    /// Read environment overrides through `lookup`.
    pub fn env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Some(Arc::new(lookup));
        self
    }

    /// Read environment overrides from a fixed set of variables.
    pub fn env_vars<I, K, V>(self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.env_lookup(move |key| map.get(key).cloned())
    }

    /// Use custom backends.
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Build the context. Nothing is probed until the mode is first read.
    pub fn build(self) -> ComputeContext {
        let detector = self
            .detector
            .unwrap_or_else(|| Arc::new(SystemDetector::new(self.config.probe.clone())));

        ComputeContext {
            resolver: ModeResolver::new(detector, self.config),
            env: self.env.unwrap_or_else(process_env),
            dispatcher: self.dispatcher.unwrap_or_default(),
            state: RwLock::new(None),
        }
    }
}

impl Default for ComputeContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
