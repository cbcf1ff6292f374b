pub mod callback;
pub mod estimate;
pub mod lifecycle;
pub mod orchestrator;
pub mod tracking;

#[cfg(test)]
mod lifecycle_tests;
