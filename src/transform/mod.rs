pub mod hex;
pub mod logs;
pub mod transactions;
pub mod units;
