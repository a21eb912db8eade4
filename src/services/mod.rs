pub mod alerts;
pub mod audit;
pub mod movements;
pub mod stock_engine;
