use std::env;

use log::warn;

/// The default maximum length of a polymorphic inline cache chain.
pub const DEFAULT_INLINE_CACHE_SIZE: usize = 6;

/// Tunables for a [`Universe`](crate::universe::Universe).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseConfig {
    /// Maximum number of (guard, target) pairs a call site keeps before going megamorphic.
    pub inline_cache_size: usize,
    /// Whether `ifTrue:`-like and `whileTrue:`-like sends get their specialized fast paths.
    pub specialize_control_flow: bool,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            inline_cache_size: DEFAULT_INLINE_CACHE_SIZE,
            specialize_control_flow: true,
        }
    }
}

impl UniverseConfig {
    /// Set the inline cache size (at least one entry is always kept).
    pub fn inline_cache_size(mut self, size: usize) -> Self {
        self.inline_cache_size = size.max(1);
        self
    }

    /// Enable or disable the control-flow fast paths.
    pub fn specialize_control_flow(mut self, enabled: bool) -> Self {
        self.specialize_control_flow = enabled;
        self
    }

    /// Read the configuration from the process environment.
    ///
    /// `SOM_INLINE_CACHE_SIZE` sets the inline cache size and a set
    /// `SOM_NO_SPECIALIZATION` disables the control-flow fast paths.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(size) = env::var("SOM_INLINE_CACHE_SIZE") {
            match size.parse::<usize>() {
                Ok(size) => config = config.inline_cache_size(size),
                Err(err) => warn!("ignoring SOM_INLINE_CACHE_SIZE='{}': {}", size, err),
            }
        }
        if env::var_os("SOM_NO_SPECIALIZATION").is_some() {
            config = config.specialize_control_flow(false);
        }
        config
    }
}
