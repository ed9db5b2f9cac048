//! Shared test support: a scripted in-memory driver and sample entity
//! types used across the integration tests.

pub mod entities;
pub mod fake_driver;

use cypherbind::Graph;
use fake_driver::ScriptedDriver;
use std::sync::Arc;

/// A graph over a fresh scripted driver
///
/// Opt into compiler debug output with `RUST_LOG=cypherbind=debug`.
pub fn scripted_graph() -> (Graph, Arc<ScriptedDriver>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let driver = ScriptedDriver::new();
    let graph = Graph::new(driver.clone());
    (graph, driver)
}
