//! Terminal chat interface components

pub mod app;
pub mod composer;
pub mod view;

pub use app::App;
pub use composer::{Composer, ComposerResult, ComposerView};
pub use view::TranscriptView;
