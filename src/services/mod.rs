// src/services/mod.rs

pub mod planner;
pub mod progress;
pub mod summarizer;
