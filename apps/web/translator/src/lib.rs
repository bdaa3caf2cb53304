// Library exports for testing
// The binary (main.rs) imports these as well

pub mod config;
pub mod error;
pub mod logger;
pub mod routes;
pub mod state;

#[cfg(test)]
mod tests;
