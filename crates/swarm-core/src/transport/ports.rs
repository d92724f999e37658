//! Serial port discovery
//!
//! Lists device nodes a Swarm device might be attached to. Swarm evaluation
//! kits expose the modem through an FTDI or CP210x USB bridge.

use serialport::{SerialPortInfo, SerialPortType};
use std::collections::BTreeMap;
#[cfg(target_os = "linux")]
use std::fs;

/// A serial device node found on this machine
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortInfo {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub path: String,
    /// USB vendor and product IDs, when the port is a USB bridge
    pub usb_id: Option<(u16, u16)>,
    /// USB product description, when reported
    pub product: Option<String>,
}

impl PortInfo {
    fn bare(path: String) -> Self {
        Self {
            path,
            usb_id: None,
            product: None,
        }
    }

    /// Short human-readable description for listings
    pub fn description(&self) -> String {
        match (&self.usb_id, &self.product) {
            (Some((vid, pid)), Some(product)) => format!("{product} ({vid:04x}:{pid:04x})"),
            (Some((vid, pid)), None) => format!("USB {vid:04x}:{pid:04x}"),
            (None, Some(product)) => product.clone(),
            (None, None) => "serial".to_string(),
        }
    }
}

impl From<SerialPortInfo> for PortInfo {
    fn from(info: SerialPortInfo) -> Self {
        match info.port_type {
            SerialPortType::UsbPort(usb) => Self {
                path: info.port_name,
                usb_id: Some((usb.vid, usb.pid)),
                product: usb.product,
            },
            _ => Self::bare(info.port_name),
        }
    }
}

/// Ordering rank: USB bridges first, then CDC-ACM, then everything else
fn port_rank(path: &str) -> (u8, usize, String) {
    let name = path.rsplit('/').next().unwrap_or(path);
    let numbered = |prefix: &str| {
        name.strip_prefix(prefix)
            .map(|rest| rest.parse::<usize>().unwrap_or(usize::MAX))
    };
    if let Some(n) = numbered("ttyUSB") {
        return (0, n, name.to_string());
    }
    if name.starts_with("cu.usbserial") {
        return (0, 0, name.to_string());
    }
    if let Some(n) = numbered("ttyACM") {
        return (1, n, name.to_string());
    }
    (2, 0, name.to_string())
}

/// List candidate serial ports, most likely Swarm devices first
pub fn list_ports() -> Vec<PortInfo> {
    let mut found: BTreeMap<String, PortInfo> = BTreeMap::new();
    match serialport::available_ports() {
        Ok(ports) => {
            for port in ports.into_iter().map(PortInfo::from) {
                found.entry(port.path.clone()).or_insert(port);
            }
        }
        Err(e) => tracing::debug!("serial port enumeration failed: {}", e),
    }

    // udev-less containers don't report USB bridges through the API
    #[cfg(target_os = "linux")]
    if let Ok(entries) = fs::read_dir("/dev") {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with("ttyUSB") || name.starts_with("ttyACM") {
                let path = format!("/dev/{name}");
                found
                    .entry(path.clone())
                    .or_insert_with(|| PortInfo::bare(path));
            }
        }
    }

    let mut ports: Vec<PortInfo> = found.into_values().collect();
    ports.sort_by_key(|port| port_rank(&port.path));
    ports
}
