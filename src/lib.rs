//! Taskbook library
//!
//! Task store, controller and the terminal presentation that drives them.

pub mod cli;
pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod form;
pub mod format;
pub mod logging;
pub mod paths;
pub mod types;
