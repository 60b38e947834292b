//! What the engine needs from a screen implementation.
//!
//! A screen is either compiled code resolved from the [`ModuleCatalog`] or a
//! markup fragment fetched from a [`MarkupStore`]. Both resolve to a
//! [`ScreenSource`], which mounts into a panel and is torn down with it.

pub mod builtin;
pub mod markup;

use async_trait::async_trait;
use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::engine::PanelId;
use crate::grid::{GridPos, ScreenEntry, ScreenKind};
use crate::tui::Theme;

pub use markup::{MarkupFragment, MarkupScreen, MarkupStore};

/// Failure to resolve a screen's content
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no screen module is registered under this name")]
    ModuleNotFound,

    #[error("markup fragment not found")]
    MarkupNotFound,

    #[error("markup request failed with HTTP {0}")]
    Http(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("could not read markup: {0}")]
    Io(String),
}

/// The surface a screen is mounted into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHost {
    pub panel: PanelId,
    pub position: GridPos,
    pub identifier: String,
}

/// A mounted screen: owns its render loop and input handling
pub trait Screen: Send {
    /// Advance any animation; called once per frame
    fn tick(&mut self, _now: Instant) {}

    fn render(&mut self, area: Rect, buf: &mut Buffer, theme: &Theme);

    /// True while the screen wants arrow keys for itself
    fn captures_input(&self) -> bool {
        false
    }

    /// Returns true if the key was consumed
    fn handle_key(&mut self, _key: KeyEvent) -> bool {
        false
    }

    /// Release resources; invoked once when the panel is destroyed
    fn teardown(&mut self) {}
}

pub type ScreenFactory = Arc<dyn Fn(&PanelHost) -> Box<dyn Screen> + Send + Sync>;

/// Resolved, not yet mounted, screen content
#[derive(Clone)]
pub enum ScreenSource {
    Code(ScreenFactory),
    Markup(MarkupFragment),
}

impl ScreenSource {
    pub fn mount(&self, host: &PanelHost) -> MountedScreen {
        let screen: Box<dyn Screen> = match self {
            ScreenSource::Code(factory) => factory(host),
            ScreenSource::Markup(fragment) => Box::new(MarkupScreen::new(fragment.clone())),
        };
        MountedScreen { screen }
    }
}

impl fmt::Debug for ScreenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScreenSource::Code(_) => f.write_str("ScreenSource::Code(..)"),
            ScreenSource::Markup(fragment) => f.debug_tuple("ScreenSource::Markup").field(fragment).finish(),
        }
    }
}

/// A screen living in a panel
pub struct MountedScreen {
    screen: Box<dyn Screen>,
}

impl MountedScreen {
    pub fn screen_mut(&mut self) -> &mut dyn Screen {
        self.screen.as_mut()
    }

    pub fn screen(&self) -> &dyn Screen {
        self.screen.as_ref()
    }

    pub fn unmount(mut self) {
        self.screen.teardown();
    }
}

impl fmt::Debug for MountedScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MountedScreen")
    }
}

/// Identifier → constructor table for code screens
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, ScreenFactory>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in screen registered
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        builtin::register_all(&mut catalog);
        catalog
    }

    pub fn register<F>(&mut self, identifier: impl Into<String>, factory: F)
    where
        F: Fn(&PanelHost) -> Box<dyn Screen> + Send + Sync + 'static,
    {
        self.modules.insert(identifier.into(), Arc::new(factory));
    }

    pub fn get(&self, identifier: &str) -> Option<ScreenFactory> {
        self.modules.get(identifier).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Turns a registry entry into mountable content
#[async_trait]
pub trait ScreenResolver: Send + Sync {
    async fn resolve(&self, entry: &ScreenEntry) -> Result<ScreenSource, LoadError>;
}

/// Default resolver: code from a [`ModuleCatalog`], markup from a [`MarkupStore`]
pub struct CatalogResolver {
    modules: ModuleCatalog,
    markup: MarkupStore,
}

impl CatalogResolver {
    pub fn new(modules: ModuleCatalog, markup: MarkupStore) -> Self {
        Self { modules, markup }
    }
}

#[async_trait]
impl ScreenResolver for CatalogResolver {
    async fn resolve(&self, entry: &ScreenEntry) -> Result<ScreenSource, LoadError> {
        match entry.kind {
            ScreenKind::Code => self
                .modules
                .get(&entry.identifier)
                .map(ScreenSource::Code)
                .ok_or(LoadError::ModuleNotFound),
            ScreenKind::Markup => {
                let html = self.markup.fetch(&entry.identifier).await?;
                Ok(ScreenSource::Markup(MarkupFragment::parse(&entry.identifier, &html)))
            }
        }
    }
}
