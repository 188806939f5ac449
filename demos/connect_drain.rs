//! Offline walkthrough of the deferred-connection path.
//!
//! Builds a loopback host, pretends two external clients showed up, and
//! drains their connection requests off the (simulated) realtime path.

use fauxcv::{ContextConfig, DrainOutcome, EndpointSpec, ExecutionContext, Host, LoopbackHost};

fn main() {
    tracing_subscriber::fmt().init();

    let mut host = LoopbackHost::new(48000.0);
    let seq = host
        .register_endpoint(&EndpointSpec::cv_output("sequencer/cv_out"))
        .unwrap();
    let lfo = host
        .register_endpoint(&EndpointSpec::cv_output("lfo/cv_out"))
        .unwrap();

    let (mut ctx, mut notifier) =
        ExecutionContext::new(&mut host, ContextConfig::cv_pairs()).unwrap();

    // The host's registration notifier would do this. It may run on the
    // realtime thread, which is exactly why it only pushes ids.
    notifier.push(seq).unwrap();
    notifier.push(lfo).unwrap();

    // Realtime side keeps rendering regardless...
    for _ in 0..16 {
        ctx.process(64);
    }

    // ...while the maintenance loop drains at its own pace.
    loop {
        let outcome = ctx.drain_one();
        println!("drain: {:?}", outcome);
        if outcome == DrainOutcome::Empty {
            break;
        }
    }

    drop(ctx);
    for (source, dest) in host.connections() {
        println!("{source} -> {dest}");
    }
}
