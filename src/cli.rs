use clap::{Args, Parser, Subcommand};

use crate::proto::command::DeviceType;

#[derive(Parser, Debug, Clone)]
#[command(name = "pll-synth", about = "PLL-ADF RF synthesizer control (tone/sweep/hop)")]
pub struct Cli {
    #[command(flatten)]
    pub synth: SynthOpts,
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Emit a single frequency tone
    Tone(ToneOpts),
    /// Sweep between start and end frequencies
    Sweep(SweepOpts),
    /// Random frequency hopping between start and end frequencies
    Hop(HopOpts),
    /// Stop signal generation and park the board
    Stop,
}

#[derive(Args, Debug, Clone)]
pub struct SynthOpts {
    /// Serial port (default: first USB serial adapter found)
    #[arg(short, long)]
    pub port: Option<String>,
    /// ADF device type
    #[arg(short, long, default_value = "adf4351", value_parser = parse_device)]
    pub device: DeviceType,
    /// Reference clock in MHz
    #[arg(short, long, default_value_t = 25.0, value_parser = parse_ref_clk_mhz)]
    pub ref_clk: f64,
    /// Gain index 0-3 (higher indices clamp to 3)
    #[arg(short, long, default_value_t = 3)]
    pub gain: u8,
}

#[derive(Args, Debug, Clone)]
pub struct ToneOpts {
    /// Frequency in MHz
    #[arg(short, long, value_parser = parse_rf_mhz)]
    pub freq: f64,
}

#[derive(Args, Debug, Clone)]
pub struct SweepOpts {
    /// Start frequency in MHz
    #[arg(short, long, value_parser = parse_rf_mhz)]
    pub start: f64,
    /// End frequency in MHz
    #[arg(short, long, value_parser = parse_rf_mhz)]
    pub end: f64,
    /// Step in kHz
    #[arg(short = 'd', long, value_parser = parse_step_khz)]
    pub step: f64,
}

#[derive(Args, Debug, Clone)]
pub struct HopOpts {
    /// Start frequency in MHz
    #[arg(short, long, value_parser = parse_rf_mhz)]
    pub start: f64,
    /// End frequency in MHz
    #[arg(short, long, value_parser = parse_rf_mhz)]
    pub end: f64,
    /// Hop grid step in kHz
    #[arg(short = 'd', long, value_parser = parse_step_khz)]
    pub step: f64,
    /// Dwell time per hop in milliseconds
    #[arg(short = 't', long)]
    pub dwell_time: f64,
}

fn parse_device(s: &str) -> Result<DeviceType, String> {
    match s.to_ascii_lowercase().as_str() {
        "adf4350" => Ok(DeviceType::Adf4350),
        "adf4351" => Ok(DeviceType::Adf4351),
        _ => Err(format!("unknown device type: {s} (adf4350 or adf4351)")),
    }
}

fn parse_ranged_f64(s: &str, what: &str, lo: f64, hi: f64) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("{what} must be a number"))?;
    if !(lo..=hi).contains(&v) {
        return Err(format!("{what} must be between {lo} and {hi}"));
    }
    Ok(v)
}

fn parse_ref_clk_mhz(s: &str) -> Result<f64, String> {
    parse_ranged_f64(s, "reference clock (MHz)", 10.0, 250.0)
}

/// RF range of the ADF435x family.
fn parse_rf_mhz(s: &str) -> Result<f64, String> {
    parse_ranged_f64(s, "frequency (MHz)", 35.0, 4400.0)
}

fn parse_step_khz(s: &str) -> Result<f64, String> {
    parse_ranged_f64(s, "step (kHz)", 1.0, 10_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_parses_case_insensitive() {
        assert_eq!(parse_device("ADF4350").unwrap(), DeviceType::Adf4350);
        assert_eq!(parse_device("adf4351").unwrap(), DeviceType::Adf4351);
        assert!(parse_device("adf9999").is_err());
    }

    #[test]
    fn rf_range_bounds() {
        assert!(parse_rf_mhz("35").is_ok());
        assert!(parse_rf_mhz("4400").is_ok());
        assert!(parse_rf_mhz("34.9").is_err());
        assert!(parse_rf_mhz("4400.1").is_err());
        assert!(parse_rf_mhz("fast").is_err());
    }

    #[test]
    fn parses_a_full_command_line() {
        let cli = Cli::try_parse_from([
            "pll-synth",
            "--port",
            "/dev/ttyUSB0",
            "--device",
            "adf4350",
            "--ref-clk",
            "10",
            "sweep",
            "--start",
            "88",
            "--end",
            "108",
            "--step",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.synth.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.synth.device, DeviceType::Adf4350);
        assert_eq!(cli.synth.gain, 3);
        match cli.cmd {
            Cmd::Sweep(opts) => {
                assert_eq!(opts.start, 88.0);
                assert_eq!(opts.end, 108.0);
                assert_eq!(opts.step, 100.0);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
