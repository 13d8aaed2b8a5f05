pub mod chains;
pub mod configs;
pub mod db;
pub mod extract;
pub mod files;
pub mod loader;
pub mod models;
pub mod transform;
pub mod validate;
