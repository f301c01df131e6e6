// src/models/mod.rs

pub mod document;
pub mod study_plan;
pub mod user;
