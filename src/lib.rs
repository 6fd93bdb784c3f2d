// src/lib.rs

//! Harvester: incremental comment collection library

pub mod browser;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
