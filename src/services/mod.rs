pub mod classifier;
pub mod emotion;
pub mod graph;
pub mod image_source;
pub mod poller;
pub mod provider;
pub mod vision;
