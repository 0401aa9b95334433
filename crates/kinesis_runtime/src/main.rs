//! Kinesis Runtime
//!
//! Demo entry point: wires a simulated body-tracking sensor into the
//! presence pipeline and runs a short scripted session, logging every
//! enter and exit. Swap in a real vendor backend to drive this from
//! hardware.
//!
//! Run with: cargo run -p kinesis_runtime
//!       or: cargo run --bin kinesis

mod config;
mod runtime;
mod stats;

use config::RuntimeConfig;
use runtime::PresenceRuntime;

use kinesis_core::{BodySample, IdGenerator, TrackingId};
use kinesis_sensor::SimulatedBackend;
use kinesis_tracker::PresenceEvent;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Kinesis v{} - body presence tracking", env!("CARGO_PKG_VERSION"));
    println!();

    let config = RuntimeConfig::load();
    config.print_summary();

    let mut runtime = PresenceRuntime::new(&config);
    runtime.register_backend(Box::new(demo_backend()));

    if let Err(e) = runtime.initialize() {
        log::error!("sensor initialization failed: {}", e);
        std::process::exit(1);
    }

    runtime.observers().subscribe(|event: &PresenceEvent| {
        if event.is_enter() {
            log::info!(
                "body {} entered slot {} (tick {})",
                event.body.id,
                event.body.slot,
                event.tick
            );
        } else {
            log::info!(
                "body {} left slot {} after {} ticks",
                event.body.id,
                event.body.slot,
                event.ticks_present
            );
        }
    });

    let dt = 1.0 / config.session.tick_rate;
    for _ in 0..config.session.ticks {
        runtime.tick(dt);
    }

    runtime.shutdown();

    if config.session.log_stats {
        for line in runtime.status_report().lines() {
            log::info!("{}", line);
        }
        let stats = runtime.stats();
        log::info!(
            "session: {} ticks, {} frames, {} enters, {} exits, peak {} bodies",
            stats.ticks,
            stats.frames,
            stats.enters,
            stats.exits,
            stats.peak_occupied,
        );
    }
}

/// Build a scripted sensor session: two bodies come and go, including a
/// direct slot handover with no empty frame between occupants.
fn demo_backend() -> SimulatedBackend {
    let ids = IdGenerator::new();
    let first = ids.next();
    let second = ids.next();
    let third = ids.next();

    let mut script: Vec<Vec<BodySample>> = Vec::new();

    // First body walks in
    for step in 0..30 {
        script.push(frame(&[
            (first, [0.0, 0.0, 3.0 - step as f32 * 0.05]),
        ]));
    }

    // Second body joins in the next slot
    for step in 0..30 {
        script.push(frame(&[
            (first, [0.0, 0.0, 1.5]),
            (second, [0.8, 0.0, 3.0 - step as f32 * 0.04]),
        ]));
    }

    // First body leaves; its slot is immediately re-used by a third
    for _ in 0..30 {
        script.push(frame(&[
            (third, [-0.5, 0.0, 2.0]),
            (second, [0.8, 0.0, 1.8]),
        ]));
    }

    // Everyone leaves
    script.push(frame(&[]));

    SimulatedBackend::new(6).with_script(script)
}

fn frame(bodies: &[(TrackingId, [f32; 3])]) -> Vec<BodySample> {
    bodies
        .iter()
        .map(|&(id, position)| BodySample::new(id).with_position(position))
        .collect()
}
