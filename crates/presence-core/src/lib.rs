//! Presence aggregation engine.
//!
//! This crate is the behavior of the context server: subscribe to the
//! watched parties at startup, acknowledge and mine incoming NOTIFYs
//! for presence state, and periodically forward the collected aggregate
//! to a single sink as a plain-text MESSAGE. Everything rides on UDP
//! through one upstream proxy; there is no transaction layer and no
//! delivery guarantee beyond what the peers provide.
//!
//! The pieces compose left to right:
//!
//! ```text
//! transport events -> EventDispatcher -> AggregateStore -> Forwarder -> sink
//!                        |                                    |
//!                        +------------- UserAgent ------------+
//! ```
//!
//! [`server::ContextServer`] ties them together behind one start/shutdown
//! handle.

pub mod agent;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod forwarder;
pub mod pidf;
pub mod server;
pub mod store;
pub mod subscriber;

pub use agent::UserAgent;
pub use config::ServerConfig;
pub use dispatcher::EventDispatcher;
pub use error::{Error, Result};
pub use forwarder::Forwarder;
pub use pidf::{PIDF_NAMESPACE, PresenceReport};
pub use server::ContextServer;
pub use store::AggregateStore;
