// Adapters layer: concrete implementations of the domain ports (http, timers, surfaces).

pub mod frame_loop;
pub mod orders;
pub mod rest;
pub mod runtime;
pub mod surface;
