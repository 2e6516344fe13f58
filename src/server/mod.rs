//! Local request surface
//!
//! A small HTTP server bound to loopback that lets the dashboard page mark an
//! application applied or skipped. Every mutating request runs the transition
//! and the dashboard sync to completion before the next one starts.

mod http;

pub use http::{router, start_server, Action, AppState, TransitionRequest, TransitionResponse};
