//! JSON API for running the calling pipeline over posted text.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! mh-caller serve
//!
//! # Bind to all interfaces on a custom port
//! mh-caller serve --address 0.0.0.0 --port 3000
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /api/defaults` - Default calling thresholds
//! - `POST /api/call` - Call alleles from posted marker and read text (JSON body)

pub mod server;
