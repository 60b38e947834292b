pub mod theme;
pub mod command;
pub mod subscription;
pub mod resource;
pub mod interaction;
pub mod app;
pub mod runtime;
pub mod apps;

pub use theme::{Theme, ThemeVariant};
pub use command::Command;
pub use subscription::{KeyBinding, Subscription};
pub use resource::Resource;
pub use interaction::InteractionRegistry;
pub use app::App;
pub use runtime::Runtime;
