/// Errors surfaced at config load time (spec.md §7: the engine path itself
/// has no failable operations; only boundary/file I/O concerns do).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ticks_per_row must be at least 1, got {0}")]
    InvalidTicksPerRow(u16),

    #[error("max_patterns must be at least 16, got {0}")]
    InvalidMaxPatterns(usize),

    #[error("max_orders_user must be at least 1, got {0}")]
    InvalidMaxOrdersUser(usize),

    #[error("failed to parse config TOML")]
    Toml(#[from] toml::de::Error),
}
