//! Background tasks spawned from `main` alongside the HTTP server.

pub mod round_resolution;
