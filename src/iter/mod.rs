//! Async iteration bridge: push-based dispatch to pull-based consumption.
//!
//! - [`producer`]: per-iterator FIFO queue with finish/close states;
//! - [`stream`]: the public [`EventStream`] handle owning one producer.

mod producer;
mod stream;

pub(crate) use producer::{Producer, ProducerId};
pub use stream::{AnyEvents, EventStream, Events};
