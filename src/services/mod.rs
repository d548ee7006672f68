pub mod image;
pub mod job_store;
pub mod processor;
pub mod registry;
