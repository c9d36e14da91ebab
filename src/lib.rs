#![forbid(unsafe_code)]

pub mod auth;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod filter;
pub mod logging;
pub mod model;
pub mod overlay;
pub mod pending;
pub mod shell;
pub mod store;
pub mod view;
