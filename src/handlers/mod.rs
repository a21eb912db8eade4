pub mod alerts;
pub mod movements;
pub mod stock;
