//! The owning execution context
//!
//! One context per session. It binds the oscillator, the consumer end of the
//! connection-request queue, and the endpoint handles it registered, and it
//! is the only thing that holds any of them. Teardown is the `Drop` impl.

use tracing::{debug, info, warn};

use crate::error::CvError;
use crate::host::{ConnectStatus, Direction, EndpointSpec, Host};
use crate::osc::{MagicCircle, DEFAULT_FREQUENCY};
use crate::queue::{ConnectConsumer, ConnectProducer, ConnectQueue, PopError, DEFAULT_CAPACITY};

/// Everything a context needs to come up.
///
/// Endpoint topology is a list, not a hardcoded enumeration - the four-port
/// and two-port layouts are just different configs over the same engine.
#[derive(Clone, Debug)]
pub struct ContextConfig {
    pub endpoints: Vec<EndpointSpec>,
    pub initial_frequency: f32,
    pub queue_capacity: usize,
    /// Endpoint of ours that dequeued ports get connected to.
    pub connect_target: String,
}

impl ContextConfig {
    /// The hardware-simulating layout: two CV inputs and two CV outputs,
    /// aliased for patch bays. Because this pretends to be hardware, the
    /// inputs are named "playback" and the outputs "capture".
    pub fn cv_pairs() -> Self {
        Self {
            endpoints: vec![
                EndpointSpec::cv_input("cv_playback_1").with_alias("CV playback 1"),
                EndpointSpec::cv_input("cv_playback_2").with_alias("CV playback 2"),
                EndpointSpec::cv_output("cv_capture_1").with_alias("CV capture 1"),
                EndpointSpec::cv_output("cv_capture_2").with_alias("CV capture 2"),
            ],
            initial_frequency: DEFAULT_FREQUENCY,
            queue_capacity: DEFAULT_CAPACITY,
            connect_target: "cv_playback_1".into(),
        }
    }

    /// Minimal layout: one CV input, one CV output.
    pub fn single_pair() -> Self {
        Self {
            endpoints: vec![
                EndpointSpec::cv_input("cv_playback_1").with_alias("CV playback 1"),
                EndpointSpec::cv_output("cv_capture_1").with_alias("CV capture 1"),
            ],
            initial_frequency: DEFAULT_FREQUENCY,
            queue_capacity: DEFAULT_CAPACITY,
            connect_target: "cv_playback_1".into(),
        }
    }
}

/// Terminal state of one queue entry after a drain step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was queued.
    Empty,
    Connected,
    /// The connection already existed. Treated as success.
    AlreadyConnected,
    /// The id no longer resolves to an endpoint; request discarded.
    UnknownPort,
    /// The host refused; logged and discarded, never retried.
    Failed,
}

/// The single owning aggregate for one client session.
///
/// `process` is the real-time callback body; `drain_one` is the connection
/// handler. They touch disjoint state except for the queue, which is built
/// for exactly that producer/consumer split.
pub struct ExecutionContext<H: Host> {
    host: H,
    osc: MagicCircle,
    requests: ConnectConsumer,
    endpoints: Vec<H::Handle>,
    /// Output endpoint the sine channel is written to.
    sine_out: H::Handle,
    connect_target: String,
}

// Manual impl: `H::Handle` carries no `Debug` bound, so a derive would not
// compile for arbitrary hosts.
impl<H: Host> std::fmt::Debug for ExecutionContext<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("connect_target", &self.connect_target)
            .finish_non_exhaustive()
    }
}

impl<H: Host> ExecutionContext<H> {
    /// Register endpoints, seed the oscillator, create the queue, activate.
    ///
    /// Returns the context plus the producer end of the queue, which goes to
    /// whatever delivers port-registration notifications. Any failure along
    /// the way releases every endpoint registered so far and reports the
    /// error; no partially built context survives.
    pub fn new(
        mut host: H,
        config: ContextConfig,
    ) -> Result<(Self, ConnectProducer), CvError> {
        let sine_index = config
            .endpoints
            .iter()
            .position(|e| e.direction == Direction::Output)
            .ok_or_else(|| {
                CvError::InvalidConfiguration("no output endpoint configured".into())
            })?;
        if !config
            .endpoints
            .iter()
            .any(|e| e.name == config.connect_target)
        {
            return Err(CvError::InvalidConfiguration(format!(
                "connect target {:?} is not a configured endpoint",
                config.connect_target
            )));
        }

        let sample_rate = host.sample_rate();
        let osc = MagicCircle::new(sample_rate, config.initial_frequency)?;
        let (producer, requests) = ConnectQueue::with_capacity(config.queue_capacity)?;

        let mut endpoints: Vec<H::Handle> = Vec::with_capacity(config.endpoints.len());
        for spec in &config.endpoints {
            match host.register_endpoint(spec) {
                Ok(handle) => {
                    if let Some(alias) = &spec.alias {
                        host.set_alias(handle, alias);
                    }
                    endpoints.push(handle);
                }
                Err(err) => {
                    for handle in endpoints.drain(..) {
                        host.unregister_endpoint(handle);
                    }
                    return Err(err);
                }
            }
        }

        if let Err(err) = host.activate() {
            for handle in endpoints.drain(..) {
                host.unregister_endpoint(handle);
            }
            return Err(err);
        }

        let sine_out = endpoints[sine_index];
        info!(
            sample_rate,
            frequency = config.initial_frequency,
            endpoints = endpoints.len(),
            queue_capacity = config.queue_capacity,
            "context up"
        );

        Ok((
            Self {
                host,
                osc,
                requests,
                endpoints,
                sine_out,
                connect_target: config.connect_target,
            },
            producer,
        ))
    }

    /// Real-time callback body: fill the sine output for one cycle.
    ///
    /// Wait-free. No allocation, no locks, no connection work - routing
    /// happens only in [`drain_one`](Self::drain_one), on another thread.
    pub fn process(&mut self, frames: usize) {
        let buffer = self.host.playback_buffer(self.sine_out, frames);
        self.osc.fill(buffer);
    }

    /// Attempt exactly one dequeue-and-connect.
    ///
    /// Runs off the time-critical path and is allowed to block or allocate.
    /// All three end states are terminal; nothing is ever retried.
    pub fn drain_one(&mut self) -> DrainOutcome {
        let id = match self.requests.pop() {
            Ok(id) => id,
            Err(PopError::Empty) => return DrainOutcome::Empty,
        };

        let name = match self.host.resolve_port(id) {
            Some(name) => name,
            None => {
                warn!(port = id.0, "dropping request for unknown port");
                return DrainOutcome::UnknownPort;
            }
        };

        match self.host.connect_endpoints(&name, &self.connect_target) {
            Ok(ConnectStatus::Connected) => {
                info!(source = %name, target = %self.connect_target, "connected");
                DrainOutcome::Connected
            }
            Ok(ConnectStatus::AlreadyConnected) => {
                debug!(source = %name, target = %self.connect_target, "already connected");
                DrainOutcome::AlreadyConnected
            }
            Err(err) => {
                warn!(source = %name, error = %err, "connect failed, request discarded");
                DrainOutcome::Failed
            }
        }
    }

    #[inline]
    pub fn frequency(&self) -> f32 {
        self.osc.frequency()
    }

    /// Retune the oscillator; phase-continuous, effective next sample.
    #[inline]
    pub fn set_frequency(&mut self, frequency: f32) {
        self.osc.set_frequency(frequency);
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.osc.sample_rate()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: Host> Drop for ExecutionContext<H> {
    fn drop(&mut self) {
        self.host.deactivate();
        for handle in self.endpoints.drain(..) {
            self.host.unregister_endpoint(handle);
        }
        // Whatever is still queued is discarded, never acted on.
        debug!("context down");
    }
}
