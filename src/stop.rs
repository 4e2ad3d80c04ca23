use anyhow::{Context, Result};

use crate::cli::SynthOpts;
use crate::port;
use crate::session::Synth;

pub fn run(synth_opts: SynthOpts) -> Result<()> {
    let dev = port::resolve(synth_opts.port.as_deref())?;
    let mut synth = Synth::open(&dev, synth_opts.device, synth_opts.ref_clk * 1e6)
        .with_context(|| format!("connecting to synthesizer on {dev}"))?;
    println!("Using {synth} on {dev}");

    synth.stop()?;
    println!("Stopped");
    Ok(())
}
