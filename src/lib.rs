// src/lib.rs

//! hotboard Harvester Library

pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;
