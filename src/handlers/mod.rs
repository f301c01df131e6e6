// src/handlers/mod.rs

pub mod auth;
pub mod document;
pub mod profile;
pub mod study_plan;
