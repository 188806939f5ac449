//! fauxcv - a fake control-voltage source
//!
//! Synthesizes a continuous CV sine inside a hard-real-time callback and
//! defers routing work requested outside that callback through a bounded
//! lock-free queue.
//!
//! Design principles:
//! - One magic-circle oscillator per context, stepped once per sample inside
//!   the real-time callback; additions and multiplications only
//! - Connection requests cross the realtime boundary through a bounded
//!   wait-free SPSC queue of port ids; the actual connect call always runs
//!   on a non-time-critical path
//! - No allocation and no locks on the time-critical path
//! - The host (routing subsystem + callback driver) sits behind a trait;
//!   [`LoopbackHost`] is the in-memory stand-in for tests and offline runs

mod context;
mod error;
mod osc;
mod queue;

pub mod host;

#[cfg(feature = "cpal_sink")]
pub mod device;

pub use context::{ContextConfig, DrainOutcome, ExecutionContext};
pub use error::CvError;
pub use host::{
    ConnectStatus, Direction, EndpointSpec, Host, HostError, LoopbackHost, PortId,
};
pub use osc::{MagicCircle, DEFAULT_FREQUENCY};
pub use queue::{
    ConnectConsumer, ConnectProducer, ConnectQueue, PopError, PushError, DEFAULT_CAPACITY,
};

#[cfg(feature = "cpal_sink")]
pub use device::CpalOutput;
