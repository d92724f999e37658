//! Line discipline settings
//!
//! A portable description of how the serial line is configured. The
//! platform-specific translation lives in the `termios` module.

use serde::{Deserialize, Serialize};

use crate::protocol::DEFAULT_BAUD_RATE;

/// Parity checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Even parity
    Even,
    /// Odd parity
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

/// Character size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataBits {
    /// 5 data bits
    Five,
    /// 6 data bits
    Six,
    /// 7 data bits
    Seven,
    /// 8 data bits
    #[default]
    Eight,
}

/// Complete line discipline for a serial port.
///
/// Applying settings replaces the previous configuration entirely. Canonical
/// mode, echo and signal characters are always disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineSettings {
    /// Receive baud rate
    pub receive_rate: u32,
    /// Transmit baud rate
    pub transmit_rate: u32,
    /// Minimum bytes for a read to complete (VMIN)
    pub minimum_bytes_to_read: u8,
    /// Inter-byte read timeout in tenths of a second (VTIME), 0 waits forever
    pub timeout: u8,
    /// Parity checking
    pub parity: Parity,
    /// Stop bits per character
    pub stop_bits: StopBits,
    /// Bits per character
    pub data_bits: DataBits,
    /// RTS/CTS flow control
    pub hardware_flow_control: bool,
    /// XON/XOFF flow control
    pub software_flow_control: bool,
    /// Post-process output (OPOST)
    pub process_output: bool,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            receive_rate: DEFAULT_BAUD_RATE,
            transmit_rate: DEFAULT_BAUD_RATE,
            minimum_bytes_to_read: 0,
            timeout: 3,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: DataBits::Eight,
            hardware_flow_control: false,
            software_flow_control: false,
            process_output: false,
        }
    }
}

impl LineSettings {
    /// Same baud rate in both directions, everything else default
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            receive_rate: baud_rate,
            transmit_rate: baud_rate,
            ..Self::default()
        }
    }
}
