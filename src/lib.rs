pub mod algo;
pub mod error;
pub mod ops;

#[cfg(feature = "plugin")]
pub mod commands;

pub use error::{Result, TopicError};

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct KanjiTopicsPlugin;

#[cfg(feature = "plugin")]
impl Plugin for KanjiTopicsPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Classify),
            Box::new(commands::Explain),
            Box::new(commands::Categories),
        ]
    }
}
