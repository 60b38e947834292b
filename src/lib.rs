//! Pan across a 2-D grid of independently authored terminal screens.
//!
//! The [`engine`] owns navigation; [`grid`], [`router`] and [`screens`] are
//! its collaborators and [`tui`] hosts it in a terminal.

pub mod cli;
pub mod config;
pub mod engine;
pub mod grid;
pub mod router;
pub mod screens;
pub mod tui;
