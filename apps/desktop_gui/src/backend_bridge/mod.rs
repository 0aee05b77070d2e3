//! Bridge between the egui thread and the encoder worker.

pub mod commands;
pub mod runtime;
