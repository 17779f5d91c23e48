//! Runtime configuration.

/// Tunables for a runtime and the endpoints it allocates.
///
/// The channel capacity defaults to [`Self::DEFAULT_CHANNEL_CAPACITY`] and
/// can be overridden through `PROCMESH_CHANNEL_CAPACITY` (a `.env` file is
/// honored).
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub channel_capacity: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

    fn resolve_channel_capacity(provided: Option<usize>) -> usize {
        let capacity = if let Some(capacity) = provided {
            capacity
        } else {
            dotenvy::dotenv().ok();
            std::env::var("PROCMESH_CHANNEL_CAPACITY")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(Self::DEFAULT_CHANNEL_CAPACITY)
        };
        if capacity == 0 {
            Self::DEFAULT_CHANNEL_CAPACITY
        } else {
            capacity
        }
    }

    pub fn new(channel_capacity: Option<usize>) -> Self {
        RuntimeConfig {
            channel_capacity: Self::resolve_channel_capacity(channel_capacity),
        }
    }

    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Self::resolve_channel_capacity(Some(capacity));
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(None)
    }
}
