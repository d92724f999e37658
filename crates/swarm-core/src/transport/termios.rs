//! Termios line discipline
//!
//! The only place that touches platform `tcflag_t` bits and `B*` speed
//! constants. Everything above works with [`LineSettings`].

use std::io;
use std::mem::MaybeUninit;
use std::os::fd::RawFd;

use super::{DataBits, LineSettings, Parity, StopBits, TransportError};

/// Replace the line discipline of `fd` with `settings`.
///
/// Every flag word is rebuilt from scratch and the control characters are
/// cleared, so nothing from a previous configuration survives.
pub(crate) fn apply(fd: RawFd, settings: &LineSettings) -> Result<(), TransportError> {
    let receive = platform::speed(settings.receive_rate)
        .ok_or(TransportError::UnsupportedBaudRate(settings.receive_rate))?;
    let transmit = platform::speed(settings.transmit_rate)
        .ok_or(TransportError::UnsupportedBaudRate(settings.transmit_rate))?;

    let mut tty = MaybeUninit::<libc::termios>::uninit();
    // SAFETY: tcgetattr initialises the struct when it returns 0
    if unsafe { libc::tcgetattr(fd, tty.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error().into());
    }
    let mut tty = unsafe { tty.assume_init() };

    tty.c_iflag = input_flags(settings);
    tty.c_oflag = if settings.process_output { libc::OPOST } else { 0 };
    tty.c_cflag = control_flags(settings);
    // Raw mode: no ICANON, ECHO, ECHOE or ISIG
    tty.c_lflag = 0;
    tty.c_cc = [0; libc::NCCS];
    tty.c_cc[libc::VMIN] = settings.minimum_bytes_to_read;
    tty.c_cc[libc::VTIME] = settings.timeout;

    // SAFETY: tty is a valid, initialised termios and fd is open
    unsafe {
        if libc::cfsetispeed(&mut tty, receive) != 0 || libc::cfsetospeed(&mut tty, transmit) != 0 {
            return Err(io::Error::last_os_error().into());
        }
        if libc::tcsetattr(fd, libc::TCSANOW, &tty) != 0 {
            return Err(io::Error::last_os_error().into());
        }
    }
    Ok(())
}

fn input_flags(settings: &LineSettings) -> libc::tcflag_t {
    if settings.software_flow_control {
        libc::IXON | libc::IXOFF | libc::IXANY
    } else {
        0
    }
}

fn control_flags(settings: &LineSettings) -> libc::tcflag_t {
    let mut flags = libc::CREAD | libc::CLOCAL;
    flags |= match settings.data_bits {
        DataBits::Five => libc::CS5,
        DataBits::Six => libc::CS6,
        DataBits::Seven => libc::CS7,
        DataBits::Eight => libc::CS8,
    };
    flags |= match settings.parity {
        Parity::None => 0,
        Parity::Even => libc::PARENB,
        Parity::Odd => libc::PARENB | libc::PARODD,
    };
    if settings.stop_bits == StopBits::Two {
        flags |= libc::CSTOPB;
    }
    if settings.hardware_flow_control {
        flags |= platform::HARDWARE_FLOW_CONTROL;
    }
    flags
}

#[cfg(any(target_os = "linux", target_os = "android"))]
mod platform {
    pub(super) const HARDWARE_FLOW_CONTROL: libc::tcflag_t = libc::CRTSCTS;

    pub(super) fn speed(baud: u32) -> Option<libc::speed_t> {
        Some(match baud {
            0 => libc::B0,
            50 => libc::B50,
            75 => libc::B75,
            110 => libc::B110,
            134 => libc::B134,
            150 => libc::B150,
            200 => libc::B200,
            300 => libc::B300,
            600 => libc::B600,
            1200 => libc::B1200,
            1800 => libc::B1800,
            2400 => libc::B2400,
            4800 => libc::B4800,
            9600 => libc::B9600,
            19200 => libc::B19200,
            38400 => libc::B38400,
            57600 => libc::B57600,
            115200 => libc::B115200,
            230400 => libc::B230400,
            460800 => libc::B460800,
            500000 => libc::B500000,
            576000 => libc::B576000,
            921600 => libc::B921600,
            1000000 => libc::B1000000,
            1152000 => libc::B1152000,
            1500000 => libc::B1500000,
            2000000 => libc::B2000000,
            2500000 => libc::B2500000,
            3000000 => libc::B3000000,
            3500000 => libc::B3500000,
            4000000 => libc::B4000000,
            _ => return None,
        })
    }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
mod platform {
    pub(super) const HARDWARE_FLOW_CONTROL: libc::tcflag_t = libc::CCTS_OFLOW | libc::CRTS_IFLOW;

    pub(super) fn speed(baud: u32) -> Option<libc::speed_t> {
        Some(match baud {
            0 => libc::B0,
            50 => libc::B50,
            75 => libc::B75,
            110 => libc::B110,
            134 => libc::B134,
            150 => libc::B150,
            200 => libc::B200,
            300 => libc::B300,
            600 => libc::B600,
            1200 => libc::B1200,
            1800 => libc::B1800,
            2400 => libc::B2400,
            4800 => libc::B4800,
            7200 => libc::B7200,
            9600 => libc::B9600,
            14400 => libc::B14400,
            19200 => libc::B19200,
            28800 => libc::B28800,
            38400 => libc::B38400,
            57600 => libc::B57600,
            76800 => libc::B76800,
            115200 => libc::B115200,
            230400 => libc::B230400,
            _ => return None,
        })
    }
}

// BSDs encode speed_t as the plain baud rate
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios"
)))]
mod platform {
    pub(super) const HARDWARE_FLOW_CONTROL: libc::tcflag_t = libc::CRTSCTS;

    pub(super) fn speed(baud: u32) -> Option<libc::speed_t> {
        const SUPPORTED: [u32; 20] = [
            0, 50, 75, 110, 134, 150, 200, 300, 600, 1200, 1800, 2400, 4800, 9600, 19200, 38400,
            57600, 115200, 230400, 460800,
        ];
        SUPPORTED
            .contains(&baud)
            .then(|| baud as libc::speed_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_flags_8n1() {
        let flags = control_flags(&LineSettings::default());
        assert_eq!(flags & libc::CSIZE, libc::CS8);
        assert_eq!(flags & libc::PARENB, 0);
        assert_eq!(flags & libc::CSTOPB, 0);
        assert_ne!(flags & libc::CREAD, 0);
        assert_ne!(flags & libc::CLOCAL, 0);
        assert_eq!(flags & platform::HARDWARE_FLOW_CONTROL, 0);
    }

    #[test]
    fn test_control_flags_are_rebuilt_not_merged() {
        let odd = LineSettings {
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
            data_bits: DataBits::Seven,
            hardware_flow_control: true,
            ..LineSettings::default()
        };
        let flags = control_flags(&odd);
        assert_eq!(flags & (libc::PARENB | libc::PARODD), libc::PARENB | libc::PARODD);
        assert_eq!(flags & libc::CSIZE, libc::CS7);
        assert_ne!(flags & libc::CSTOPB, 0);

        // Going back to defaults must clear everything the odd config set
        assert_eq!(control_flags(&LineSettings::default()) & libc::PARODD, 0);
    }

    #[test]
    fn test_software_flow_control_flags() {
        let settings = LineSettings {
            software_flow_control: true,
            ..LineSettings::default()
        };
        assert_eq!(input_flags(&settings), libc::IXON | libc::IXOFF | libc::IXANY);
        assert_eq!(input_flags(&LineSettings::default()), 0);
    }

    #[test]
    fn test_speed_table() {
        assert!(platform::speed(115200).is_some());
        assert!(platform::speed(9600).is_some());
        assert_eq!(platform::speed(12345), None);
    }
}
