//! BarLab Core: event-driven backtesting engine for bar data.
//!
//! This crate contains the simulation loop and its collaborators:
//! - Domain types (bars, events, instrument classification)
//! - Forward-filled multi-symbol data replay
//! - Strategy trait with buy-and-hold and moving-average crossover
//! - Portfolio accounting with fixed-lot and proportional sizing
//! - Simulated execution with slippage and Chinese-market commission schedules
//! - Backtest driver state machine over a single FIFO event queue
//!
//! The core does no file I/O. Loading data and writing results live in
//! `barlab-runner`.

pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod portfolio;
pub mod strategy;

pub use error::EngineError;
