//! Execution: slippage, commission and the simulated fill handler.

pub mod commission;
pub mod handler;
pub mod slippage;

pub use commission::{
    commission_model_from_name, ChinaMarketCommission, CommissionModel, PerMoneyCommission,
    PerShareCommission, ZeroCommission,
};
pub use handler::{ExecutionHandler, SimulatedExecutionHandler, SIMULATED_EXCHANGE};
pub use slippage::{
    slippage_model_from_name, FixedPercentSlippage, SlippageModel, ZeroSlippage,
    DEFAULT_SLIPPAGE_PERCENT,
};
