pub mod chunks;
pub mod client;
pub mod logs;
pub mod paginator;
pub mod parallel;
pub mod retry;
pub mod wallets;
