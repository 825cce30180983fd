//! wordgrid-gen library interface
//!
//! Multi-stage generation of word-grouping puzzles over a schema-constrained
//! text-generation service, plus local puzzle pool storage.

pub mod compose;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod schemas;
pub mod types;

pub use crate::error::{GenError, GenResult};
pub use crate::pipeline::{PipelineEvent, PuzzleGenerator};
pub use crate::types::{DifficultyProfile, Puzzle, PuzzleConfig};
