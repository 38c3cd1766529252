//! Chat client for a streaming question-answering backend: transcript model,
//! request state machine, SSE transport, and the terminal UI built on them.

pub mod client;
pub mod config;
pub mod controller;
pub mod transcript;
pub mod ui;

pub use client::{AskClient, AskEvent, StreamFailure};
pub use config::Config;
pub use controller::{ConversationController, RequestPhase, CONNECT_ERROR_TEXT, DECODE_ERROR_TEXT};
pub use transcript::{Message, MessageId, Role, Transcript};
