use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;

use crate::cli::{HopOpts, SynthOpts};
use crate::interrupt;
use crate::port;
use crate::proto::command::Gain;
use crate::session::Synth;

pub fn run(synth_opts: SynthOpts, opts: HopOpts) -> Result<()> {
    let gain = Gain::from_index(synth_opts.gain);
    let dev = port::resolve(synth_opts.port.as_deref())?;
    let mut synth = Synth::open(&dev, synth_opts.device, synth_opts.ref_clk * 1e6)
        .with_context(|| format!("connecting to synthesizer on {dev}"))?;
    println!("Using {synth} on {dev}");
    println!(
        "Random hopping from {} to {} MHz with {} kHz steps, dwell time {} ms, gain {} dBm",
        opts.start,
        opts.end,
        opts.step,
        opts.dwell_time,
        gain.dbm()
    );
    println!("Press Ctrl-C to stop");

    let step_hz = opts.step * 1e3;
    let dwell = Duration::from_secs_f64(opts.dwell_time / 1000.0);
    let running = interrupt::armed()?;
    let mut rng = rand::thread_rng();

    while running.load(Ordering::SeqCst) {
        let mut freq = rng.gen_range(opts.start * 1e6..opts.end * 1e6);
        freq -= freq % step_hz; // snap down to the hop grid
        synth.start_tone(freq, gain)?;
        std::thread::sleep(dwell);
        synth.stop()?;
    }

    synth.stop()?;
    Ok(())
}
