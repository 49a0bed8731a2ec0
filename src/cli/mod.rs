//! # CLI Module
//!
//! Command-line entry point for the `form-builder` binary.
//!
//! ## Commands
//!
//! ### `serve` (default)
//!
//! ```bash
//! form-builder serve --mongo-url mongodb://localhost:27017 --port 8080
//! MONGO_URL=mongodb://localhost:27017 form-builder
//! form-builder --store memory
//! ```
//!
//! Options (each also read from the environment variable in brackets):
//! - `--config <FILE>` [`FORMS_CONFIG`] - YAML config file
//! - `--mongo-url <URL>` [`MONGO_URL`]
//! - `--database <NAME>` [`FORMS_DATABASE`] - default `FORM_BUILDER`
//! - `--host <HOST>` [`FORMS_HOST`] - default `0.0.0.0`
//! - `--port <PORT>` [`PORT`] - default `8080`
//! - `--store mongo|memory` [`FORMS_STORE`] - default `mongo`
//!
//! ### `routes`
//!
//! Print the route table and exit.

mod commands;


pub use commands::{open_store, run_cli, Cli, Commands, ServeArgs};
