pub mod db;
pub mod error;
pub mod http;
pub mod spoonacular;
pub mod telemetry;
