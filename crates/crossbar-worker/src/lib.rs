//! Queue consumption worker for the crossbar RPC substrate.
//!
//! The worker is the queue-transport entry point: it polls the transport
//! for one message at a time, validates each message structurally,
//! dispatches to the bound business method registered for the message
//! type, and acknowledges (deletes) or leaves the message for redelivery
//! according to the shared fault-resolution rules.
//!
//! # Delivery semantics
//!
//! The transport delivers at least once. Structurally invalid messages and
//! handler failures the fault table marks non-retriable are *poison*:
//! deleted without retry. Any other handler failure leaves the message in
//! the queue for the transport's visibility-timeout redelivery. Deletion
//! itself is retried a bounded number of times and then abandoned, so a
//! processed message can still reappear — business handlers must be
//! idempotent.

pub mod config;
pub mod routes;
pub mod worker;

pub use config::{WorkerConfig, WorkerConfigBuilder};
pub use routes::{MessageDescriptor, MessageRoutes};
pub use worker::Worker;
