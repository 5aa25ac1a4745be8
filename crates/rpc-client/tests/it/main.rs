#![allow(dead_code)]

#[cfg(feature = "reqwest")]
mod http;

#[cfg(feature = "pubsub")]
mod ws;

#[cfg(feature = "pubsub")]
mod ipc;
