//! In-memory host for tests and offline runs

use crate::error::CvError;
use crate::host::{ConnectStatus, Direction, EndpointSpec, Host, HostError, PortId};

struct PortRecord {
    name: String,
    alias: Option<String>,
    direction: Direction,
    control_voltage: bool,
    buffer: Vec<f32>,
}

/// A host that routes entirely in memory.
///
/// Keeps an endpoint registry, a per-output sample buffer, and a connection
/// list. Port ids are registration order, so an id delivered to the
/// connection-request queue resolves directly. Not realtime-safe and not
/// meant to be; it stands in for the real host in tests and demos.
pub struct LoopbackHost {
    sample_rate: f32,
    ports: Vec<Option<PortRecord>>,
    connections: Vec<(String, String)>,
    refuse_next: Option<String>,
    active: bool,
}

impl LoopbackHost {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ports: Vec::new(),
            connections: Vec::new(),
            refuse_next: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of endpoints currently registered.
    pub fn live_ports(&self) -> usize {
        self.ports.iter().flatten().count()
    }

    pub fn is_connected(&self, source: &str, dest: &str) -> bool {
        self.connections
            .iter()
            .any(|(a, b)| a == source && b == dest)
    }

    pub fn connections(&self) -> &[(String, String)] {
        &self.connections
    }

    /// The samples last written to the named output endpoint.
    pub fn output_samples(&self, name: &str) -> Option<&[f32]> {
        self.ports
            .iter()
            .flatten()
            .find(|p| p.name == name && p.direction == Direction::Output)
            .map(|p| p.buffer.as_slice())
    }

    /// The alias attached to the named endpoint, if any.
    pub fn alias_of(&self, name: &str) -> Option<&str> {
        self.ports
            .iter()
            .flatten()
            .find(|p| p.name == name)
            .and_then(|p| p.alias.as_deref())
    }

    /// Whether the named endpoint was registered as a control-voltage signal.
    pub fn is_control_voltage(&self, name: &str) -> Option<bool> {
        self.ports
            .iter()
            .flatten()
            .find(|p| p.name == name)
            .map(|p| p.control_voltage)
    }

    /// Make the next connect request fail, for exercising the discard path.
    pub fn refuse_next_connect(&mut self, reason: &str) {
        self.refuse_next = Some(reason.into());
    }

    fn record(&mut self, handle: PortId) -> &mut PortRecord {
        self.ports
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .expect("stale endpoint handle")
    }
}

impl Host for LoopbackHost {
    type Handle = PortId;

    fn register_endpoint(&mut self, spec: &EndpointSpec) -> Result<PortId, CvError> {
        if self.ports.iter().flatten().any(|p| p.name == spec.name) {
            return Err(CvError::EndpointRegistration(format!(
                "name already in use: {}",
                spec.name
            )));
        }

        let id = PortId(self.ports.len() as u32);
        self.ports.push(Some(PortRecord {
            name: spec.name.clone(),
            alias: spec.alias.clone(),
            direction: spec.direction,
            control_voltage: spec.control_voltage,
            buffer: Vec::new(),
        }));
        Ok(id)
    }

    fn unregister_endpoint(&mut self, handle: PortId) {
        if let Some(slot) = self.ports.get_mut(handle.0 as usize) {
            if let Some(record) = slot.take() {
                self.connections
                    .retain(|(a, b)| *a != record.name && *b != record.name);
            }
        }
    }

    fn set_alias(&mut self, handle: PortId, alias: &str) {
        self.record(handle).alias = Some(alias.into());
    }

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn playback_buffer(&mut self, handle: PortId, frames: usize) -> &mut [f32] {
        let buffer = &mut self.record(handle).buffer;
        buffer.resize(frames, 0.0);
        &mut buffer[..frames]
    }

    fn connect_endpoints(
        &mut self,
        source: &str,
        dest: &str,
    ) -> Result<ConnectStatus, HostError> {
        if let Some(reason) = self.refuse_next.take() {
            return Err(HostError::Refused(reason));
        }

        for name in [source, dest] {
            if !self.ports.iter().flatten().any(|p| p.name == name) {
                return Err(HostError::UnknownEndpoint(name.into()));
            }
        }

        if self.is_connected(source, dest) {
            return Ok(ConnectStatus::AlreadyConnected);
        }
        self.connections.push((source.into(), dest.into()));
        Ok(ConnectStatus::Connected)
    }

    fn resolve_port(&self, id: PortId) -> Option<String> {
        self.ports
            .get(id.0 as usize)?
            .as_ref()
            .map(|p| p.name.clone())
    }

    fn activate(&mut self) -> Result<(), CvError> {
        self.active = true;
        Ok(())
    }

    fn deactivate(&mut self) {
        self.active = false;
    }
}
