//! crossbar: an internal RPC ingress substrate.
//!
//! One entry point, two transports. Inbound calls arrive over synchronous
//! HTTP ([`gateway`]) or at-least-once queue delivery ([`worker`]), are
//! authenticated and validated against declared schemas, dispatched to
//! named business methods bound at startup ([`core`]), and have their
//! failures mapped onto a small closed set of caller-visible fault codes.
//!
//! Deferred operations acknowledge the HTTP caller with an opaque request
//! id while the true outcome is recorded later into a durable record,
//! possibly by a different process.

pub use crossbar_core as core;
pub use crossbar_gateway as gateway;
pub use crossbar_telemetry as telemetry;
pub use crossbar_worker as worker;
