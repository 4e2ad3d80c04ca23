use anyhow::{Context, Result};

use crate::cli::{SweepOpts, SynthOpts};
use crate::interrupt;
use crate::port;
use crate::proto::command::Gain;
use crate::session::Synth;

pub fn run(synth_opts: SynthOpts, opts: SweepOpts) -> Result<()> {
    let gain = Gain::from_index(synth_opts.gain);
    let dev = port::resolve(synth_opts.port.as_deref())?;
    let mut synth = Synth::open(&dev, synth_opts.device, synth_opts.ref_clk * 1e6)
        .with_context(|| format!("connecting to synthesizer on {dev}"))?;
    println!("Using {synth} on {dev}");

    synth.start_sweep(opts.start * 1e6, opts.end * 1e6, opts.step * 1e3, gain)?;
    println!(
        "Sweep from {} to {} MHz with {} kHz steps, gain {} dBm",
        opts.start,
        opts.end,
        opts.step,
        gain.dbm()
    );
    println!("Press Ctrl-C to stop");
    interrupt::wait()?;

    synth.stop()?;
    Ok(())
}
