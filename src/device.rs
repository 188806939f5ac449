//! CPAL audio output sink
//!
//! Lets the loopback-rendered sine be heard on real hardware. The CPAL
//! stream runs on its own thread and pulls samples out of a ring buffer;
//! the process loop pushes whole blocks in from the other side.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use rtrb::{Consumer, Producer, RingBuffer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default audio output, fed block-by-block through an SPSC ring.
pub struct CpalOutput {
    buffer: Producer<f32>,
    sample_rate: u32,
    /// Samples CPAL has consumed so far.
    samples_consumed: Arc<AtomicUsize>,
    /// Sticky underrun flag for diagnostics.
    had_underrun: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device.
    ///
    /// Returns `None` if there is no device or its native format is not f32.
    pub fn default_output() -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;
        let config = device.default_output_config().ok()?;
        if config.sample_format() != SampleFormat::F32 {
            return None;
        }

        let stream_config = config.config();
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels as usize;

        // Ring buffer sized for ~100ms of audio to handle scheduling jitter
        let buffer_samples = (sample_rate as f32 * 0.1) as usize;
        let buffer_size = buffer_samples.next_power_of_two().max(8192);
        let (producer, consumer) = RingBuffer::<f32>::new(buffer_size);

        let samples_consumed = Arc::new(AtomicUsize::new(0));
        let had_underrun = Arc::new(AtomicBool::new(false));
        let consumed_clone = samples_consumed.clone();
        let underrun_clone = had_underrun.clone();

        // The stream lives as long as the thread that built it.
        std::thread::spawn(move || {
            let stream = build_stream(
                &device,
                &stream_config,
                channels,
                consumer,
                consumed_clone,
                underrun_clone,
            )
            .expect("Failed to build output stream");

            stream.play().expect("Failed to start audio stream");

            loop {
                std::thread::park();
            }
        });

        Some(Self {
            buffer: producer,
            sample_rate,
            samples_consumed,
            had_underrun,
        })
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Free sample slots in the ring right now.
    #[inline]
    pub fn available(&self) -> usize {
        self.buffer.slots()
    }

    /// Push one mono block; skipped whole rather than written partially.
    pub fn push_block(&mut self, samples: &[f32]) -> bool {
        if self.buffer.slots() < samples.len() {
            return false;
        }
        for &sample in samples {
            let _ = self.buffer.push(sample);
        }
        true
    }

    /// How many samples have been played.
    #[inline]
    pub fn samples_consumed(&self) -> usize {
        self.samples_consumed.load(Ordering::Relaxed)
    }

    /// Check and clear the underrun flag.
    pub fn check_underrun(&self) -> bool {
        self.had_underrun.swap(false, Ordering::Relaxed)
    }
}

fn build_stream(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    channels: usize,
    mut consumer: Consumer<f32>,
    samples_consumed: Arc<AtomicUsize>,
    had_underrun: Arc<AtomicBool>,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_output_stream(
        stream_config,
        move |data: &mut [f32], _| {
            let mut underrun = false;
            for frame in data.chunks_mut(channels) {
                // Mono source: the same sample goes to every channel.
                let sample = consumer.pop().unwrap_or_else(|_| {
                    underrun = true;
                    0.0
                });
                for out in frame.iter_mut() {
                    *out = sample;
                }
            }
            if underrun {
                had_underrun.store(true, Ordering::Relaxed);
            }
            samples_consumed.fetch_add(data.len(), Ordering::Relaxed);
        },
        |err| eprintln!("CPAL stream error: {:?}", err),
        None,
    )
}
