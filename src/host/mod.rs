//! Host collaborator interface
//!
//! The audio host - the thing that owns endpoints, routing, and the periodic
//! callback - is an external collaborator. The core only ever talks to this
//! trait. [`LoopbackHost`] is the in-memory implementation used by tests and
//! offline runs.

mod loopback;

pub use loopback::LoopbackHost;

use thiserror::Error;

use crate::error::CvError;

/// Identifier the host assigns to a registered endpoint, as delivered by
/// registration notifications. Fixed width; crosses the realtime boundary
/// through the connection-request queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PortId(pub u32);

/// Whether an endpoint consumes or produces samples, from the host's
/// point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// One endpoint to register with the host.
///
/// The number and shape of endpoints is plain configuration - a context with
/// four endpoints and one with two run the exact same engine code.
#[derive(Clone, Debug)]
pub struct EndpointSpec {
    pub name: String,
    /// Human-readable alias, for hosts that support aliasing.
    pub alias: Option<String>,
    pub direction: Direction,
    /// Marks the endpoint as carrying control voltage rather than audio.
    pub control_voltage: bool,
}

impl EndpointSpec {
    /// A control-voltage output endpoint.
    pub fn cv_output(name: &str) -> Self {
        Self {
            name: name.into(),
            alias: None,
            direction: Direction::Output,
            control_voltage: true,
        }
    }

    /// A control-voltage input endpoint.
    pub fn cv_input(name: &str) -> Self {
        Self {
            name: name.into(),
            alias: None,
            direction: Direction::Input,
            control_voltage: true,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Outcome of a connect request that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectStatus {
    Connected,
    /// The connection was already in place. Not an error.
    AlreadyConnected,
}

/// Steady-state host failures. Local to one request, never fatal.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),
    #[error("refused by host: {0}")]
    Refused(String),
}

/// The operations the core consumes from its host.
///
/// Registration, activation and teardown happen at construction time and may
/// fail fatally. `playback_buffer` is the one call made from the
/// time-critical path; implementations must keep it allocation- and
/// lock-free once the context is up. Connecting and name resolution run on
/// the connection handler's thread and are allowed to block.
pub trait Host {
    /// Opaque handle for a registered endpoint.
    type Handle: Copy + Send;

    fn register_endpoint(&mut self, spec: &EndpointSpec) -> Result<Self::Handle, CvError>;

    fn unregister_endpoint(&mut self, handle: Self::Handle);

    /// Attach a human-readable alias. Hosts without aliasing ignore it.
    fn set_alias(&mut self, _handle: Self::Handle, _alias: &str) {}

    fn sample_rate(&self) -> f32;

    /// The sample buffer backing an output endpoint, valid for one cycle.
    fn playback_buffer(&mut self, handle: Self::Handle, frames: usize) -> &mut [f32];

    fn connect_endpoints(&mut self, source: &str, dest: &str)
        -> Result<ConnectStatus, HostError>;

    /// Resolve a notification-delivered port id to an endpoint name.
    fn resolve_port(&self, id: PortId) -> Option<String>;

    fn activate(&mut self) -> Result<(), CvError>;

    fn deactivate(&mut self);
}

impl<H: Host> Host for &mut H {
    type Handle = H::Handle;

    fn register_endpoint(&mut self, spec: &EndpointSpec) -> Result<Self::Handle, CvError> {
        (**self).register_endpoint(spec)
    }

    fn unregister_endpoint(&mut self, handle: Self::Handle) {
        (**self).unregister_endpoint(handle)
    }

    fn set_alias(&mut self, handle: Self::Handle, alias: &str) {
        (**self).set_alias(handle, alias)
    }

    fn sample_rate(&self) -> f32 {
        (**self).sample_rate()
    }

    fn playback_buffer(&mut self, handle: Self::Handle, frames: usize) -> &mut [f32] {
        (**self).playback_buffer(handle, frames)
    }

    fn connect_endpoints(
        &mut self,
        source: &str,
        dest: &str,
    ) -> Result<ConnectStatus, HostError> {
        (**self).connect_endpoints(source, dest)
    }

    fn resolve_port(&self, id: PortId) -> Option<String> {
        (**self).resolve_port(id)
    }

    fn activate(&mut self) -> Result<(), CvError> {
        (**self).activate()
    }

    fn deactivate(&mut self) {
        (**self).deactivate()
    }
}
