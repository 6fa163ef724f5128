//! Caption generator - turns an uploaded image plus keyword hints into a short caption
//!
//! The heavy lifting is delegated to Gemini; this crate builds the prompt,
//! reduces whatever Gemini returns into a single [`normalize::Outcome`], and
//! classifies call failures into user-facing HTTP errors.

pub mod ai;
pub mod app;
pub mod error;
pub mod failure;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
