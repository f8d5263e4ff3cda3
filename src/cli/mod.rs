//! Terminal commands and the relay server.

pub mod ask;
pub mod business;
pub mod chart;
pub mod dashboard;
pub mod entry;
pub mod export;
pub mod serve;
pub mod setup;
pub mod ui;
