// Portfolio Filter - Core Library
// Exposes all modules for use in the CLI, the API server, and tests

pub mod category;
pub mod card;
pub mod filter;
pub mod source;
pub mod init;
pub mod config;

// Re-export commonly used types
pub use category::{Category, WILDCARD_SELECTOR};
pub use card::{Card, CategoryButton};
pub use filter::{
    ButtonState, CardState, FilterController, FilterSnapshot, FilterView,
    NullView, RecordingView, SharedFilter,
};
pub use source::{derive_buttons, probe_path, Portfolio, SourceState};
pub use init::Initializer;
pub use config::{init_tracing, init_tracing_file, SourceArgs};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
