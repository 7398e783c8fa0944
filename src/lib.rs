//! localhub routes chat messages to one of several interchangeable AI
//! backends: a hosted completion API, a locally run model server, or a
//! user-supplied endpoint.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the backend registry, the configuration store, model
//!   discovery, chat dispatch and the per-session conversation timeline.
//! - [`api`] defines the wire payloads each backend speaks and the strict
//!   model-listing call.
//! - [`cli`] parses arguments and drives the one-shot and interactive
//!   commands.
//! - [`utils`] holds URL, authentication header and logging helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
