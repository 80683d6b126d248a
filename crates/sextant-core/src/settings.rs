//! The settings capability consumed by the dispatcher.

/// Default maximum request body size: 10 MiB.
pub const DEFAULT_MAX_BODY_SIZE: u64 = 10 * 1024 * 1024;

/// Process-wide settings the core reads.
///
/// View and middleware locations are carried for the host's benefit; the
/// core never resolves them.
pub trait Settings: Send + Sync {
    /// Whether error responses include diagnostics.
    fn debug(&self) -> bool;

    /// Maximum number of request body bytes read.
    fn max_body_size(&self) -> u64;

    /// Capacity of the route resolution cache. Zero disables it.
    fn route_cache_capacity(&self) -> usize {
        sextant_router::DEFAULT_CACHE_CAPACITY
    }

    /// Locations of view modules, opaque to the core.
    fn views(&self) -> &[String] {
        &[]
    }

    /// Locations of middleware modules, opaque to the core.
    fn middlewares(&self) -> &[String] {
        &[]
    }
}

/// Settings with fixed values, handy for tests and embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSettings {
    /// See [`Settings::debug`].
    pub debug: bool,
    /// See [`Settings::max_body_size`].
    pub max_body_size: u64,
    /// See [`Settings::route_cache_capacity`].
    pub route_cache_capacity: usize,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            debug: false,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            route_cache_capacity: sextant_router::DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl StaticSettings {
    /// Enables or disables debug output.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Replaces the body size limit.
    #[must_use]
    pub fn with_max_body_size(mut self, max_body_size: u64) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Replaces the route cache capacity.
    #[must_use]
    pub fn with_route_cache_capacity(mut self, capacity: usize) -> Self {
        self.route_cache_capacity = capacity;
        self
    }
}

impl Settings for StaticSettings {
    fn debug(&self) -> bool {
        self.debug
    }

    fn max_body_size(&self) -> u64 {
        self.max_body_size
    }

    fn route_cache_capacity(&self) -> usize {
        self.route_cache_capacity
    }
}
