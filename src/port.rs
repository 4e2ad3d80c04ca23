use anyhow::{Result, bail};
use serialport::SerialPortType;

/// First USB serial adapter on the system; the board enumerates as a
/// generic USB-UART bridge, so any vendor-ID-bearing port qualifies.
pub fn discover() -> Result<String> {
    for info in serialport::available_ports()? {
        if let SerialPortType::UsbPort(_) = info.port_type {
            return Ok(info.port_name);
        }
    }
    bail!("no synthesizer found (no USB serial adapter present)");
}

/// Use the port given on the command line, or fall back to discovery.
pub fn resolve(explicit: Option<&str>) -> Result<String> {
    match explicit {
        Some(dev) => Ok(dev.to_string()),
        None => discover(),
    }
}
