//! Session demo: voices, chords, and converging glide tracks.
//!
//! Run with: cargo run -p deslice-engine --example slide_session

use deslice_config::SlideConfig;
use deslice_engine::ToneEngine;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut engine = ToneEngine::new(SlideConfig::default());
    let mut now = 0.0;
    let dt = engine.config().tick_interval;

    // --- fixed voices ---
    println!("=== Fixed Voice Bank ===\n");
    engine.voice_attack(0, now);
    engine.voice_attack(4, now);
    now = run(&mut engine, now, dt, 1.5);
    for (i, v) in engine.snapshot(now).bank_voices.iter().enumerate() {
        if v.gain > 0.0 {
            println!("voice {i}: {:.2} Hz, gain {:.3} ({:?})", v.frequency, v.gain, v.stage);
        }
    }
    engine.voice_release(0, now);
    engine.voice_release(4, now);

    // --- a chord with degree addressing ---
    println!("\n=== Chord Voice Pool ===\n");
    engine.trigger_chord(&[261.63, 329.63, 392.0], Some(0), now);
    now = run(&mut engine, now, dt, 1.0);
    let sounding = engine
        .snapshot(now)
        .pool_voices
        .iter()
        .filter(|v| v.gain > 0.0)
        .count();
    println!("degree 0 triad: {sounding} pool voices sounding");
    engine.retune_degree(0, &[277.18, 349.23, 415.3], now);
    println!("retuned degree 0 up a semitone without retriggering");
    engine.release_degree(0, now);

    // --- glide convergence ---
    println!("\n=== Glide Convergence ===\n");
    engine.converge_to(&[220.0, 440.0], now);
    let deadline = now + 3.0;
    while now < deadline {
        now += dt;
        engine.tick(now);
    }
    for t in engine.snapshot(now).glide_tracks {
        println!(
            "track {}: {:.2} Hz, proximity {:.2} ({:?})",
            t.id, t.frequency, t.proximity, t.phase
        );
    }

    // --- a mood change mid-hold ---
    engine.set_mood("eerie", 0.6, now).expect("known mood");
    println!("\nmood 'eerie' applied: {} tracks", engine.config().track_count);

    engine.release_glides(now);
    now = run(&mut engine, now, dt, 2.0);
    engine.dispose(now);
    println!("session disposed at t = {now:.2} s");
}

fn run(engine: &mut ToneEngine, from: f64, dt: f64, seconds: f64) -> f64 {
    let mut now = from;
    let end = from + seconds;
    while now < end {
        now += dt;
        engine.tick(now);
    }
    now
}
