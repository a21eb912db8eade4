pub mod audit_log;
pub mod item;
pub mod item_warehouse_config;
pub mod movement;
pub mod movement_line;
pub mod stock_alert;
pub mod stock_balance;
pub mod warehouse;
pub mod warehouse_location;
