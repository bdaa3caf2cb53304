mod classifier;
mod endpoint;
mod models;
mod translation;
