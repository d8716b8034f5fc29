//! Market data alignment and replay

pub mod align;
pub mod handler;

pub use align::{align_symbols, AlignedData};
pub use handler::{DataHandler, HistoricBarHandler};
