use anyhow::{Context, Result};

use crate::cli::{SynthOpts, ToneOpts};
use crate::interrupt;
use crate::port;
use crate::proto::command::Gain;
use crate::session::Synth;

pub fn run(synth_opts: SynthOpts, opts: ToneOpts) -> Result<()> {
    let gain = Gain::from_index(synth_opts.gain);
    let dev = port::resolve(synth_opts.port.as_deref())?;
    let mut synth = Synth::open(&dev, synth_opts.device, synth_opts.ref_clk * 1e6)
        .with_context(|| format!("connecting to synthesizer on {dev}"))?;
    println!("Using {synth} on {dev}");

    synth.start_tone(opts.freq * 1e6, gain)?;
    println!("Tone {} MHz, gain {} dBm", opts.freq, gain.dbm());
    println!("Press Ctrl-C to stop");
    interrupt::wait()?;

    synth.stop()?;
    Ok(())
}
