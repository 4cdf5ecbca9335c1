pub mod client;
pub mod coin;
pub mod embed;
pub mod fractals;
pub mod keys;
pub mod models;
pub mod pricing;
pub mod tables;

pub use client::{ApiError, Gw2Client};
pub use coin::Coins;
