//! Plays the CV sine on the default audio output, sweeping an octave.

use std::time::{Duration, Instant};

use fauxcv::{ContextConfig, CpalOutput, ExecutionContext, LoopbackHost};

fn main() {
    tracing_subscriber::fmt().init();

    let mut out = CpalOutput::default_output().expect("no f32 output device");
    let host = LoopbackHost::new(out.sample_rate() as f32);
    let (mut ctx, _notifier) =
        ExecutionContext::new(host, ContextConfig::single_pair()).unwrap();

    let start = Instant::now();
    let mut block = [0.0f32; 64];
    while start.elapsed() < Duration::from_secs(5) {
        // One octave up over the run; retuning is phase-continuous.
        let sweep = start.elapsed().as_secs_f32() / 5.0;
        ctx.set_frequency(220.0 * 2.0f32.powf(sweep));

        // Keep the ring topped up, then back off.
        while out.available() >= block.len() {
            ctx.process(block.len());
            block.copy_from_slice(ctx.host().output_samples("cv_capture_1").unwrap());
            out.push_block(&block);
        }
        std::thread::sleep(Duration::from_micros(500));
    }

    if out.check_underrun() {
        eprintln!("underrun during playback");
    }
}
