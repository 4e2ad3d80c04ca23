use anyhow::Result;
use clap::Parser;

mod cli;
mod hop;
mod interrupt;
mod port;
mod proto;
mod session;
mod stop;
mod sweep;
mod tone;
mod transport;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    match args.cmd {
        cli::Cmd::Tone(opts) => tone::run(args.synth, opts),
        cli::Cmd::Sweep(opts) => sweep::run(args.synth, opts),
        cli::Cmd::Hop(opts) => hop::run(args.synth, opts),
        cli::Cmd::Stop => stop::run(args.synth),
    }
}
