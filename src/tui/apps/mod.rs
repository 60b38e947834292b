pub mod grid;

pub use grid::{GridApp, GridParams, GridState};
