pub mod description;
pub mod registry;

pub use description::{GridDescription, GridPos, ScreenEntry, ScreenKind, DEFAULT_GRID};
pub use registry::{ConfigError, GridRegistry};
