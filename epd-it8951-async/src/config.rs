//! Run configuration and parsing of the host's positional arguments.

use thiserror::Error;

use crate::{guard::PowerOff, it8951::BitsPerPixel};

/// Guidance for hosts to print when the required arguments are missing or
/// malformed.
pub const USAGE: &str = "\
usage: epd <vcom> <display-mode>
  <vcom>          common-voltage value printed on the panel's FPC cable, e.g. -2.51
  <display-mode>  mounting variant 0..3 (use 0 if unsure)
example: epd -2.51 0";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArgError {
    #[error("VCOM argument is not a decimal voltage")]
    BadVcom,
    #[error("display-mode argument is not an integer in 0..=3")]
    BadDisplayMode,
}

impl ArgError {
    /// Argument failures exit with status 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Settings for one pipeline run.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Common-voltage magnitude in millivolts, from the FPC cable label.
    pub vcom_mv: u16,
    /// Mounting/mirroring variant. Accepted for interface compatibility and
    /// logged; the refresh waveform is chosen per firmware, not per mode.
    pub display_mode: u8,
    /// Pixel depth for the frame transfer.
    pub bits_per_pixel: BitsPerPixel,
    /// Strengthen source driving during bring-up. Only for panels that show
    /// a blurred image.
    pub enhance_driving: bool,
    /// Low-power command issued during teardown.
    pub power_off: PowerOff,
}

impl Config {
    pub fn new(vcom_mv: u16, display_mode: u8) -> Self {
        Self {
            vcom_mv,
            display_mode,
            bits_per_pixel: BitsPerPixel::default(),
            enhance_driving: false,
            power_off: PowerOff::default(),
        }
    }

    /// Parses the two required positional arguments.
    pub fn from_args(vcom: &str, display_mode: &str) -> Result<Self, ArgError> {
        Ok(Self::new(
            parse_vcom_millivolts(vcom)?,
            parse_display_mode(display_mode)?,
        ))
    }
}

/// Parses a signed decimal VCOM voltage into an unsigned millivolt
/// magnitude, truncating fractions of a millivolt: `"-2.51"` becomes 2510.
pub fn parse_vcom_millivolts(arg: &str) -> Result<u16, ArgError> {
    let volts: f64 = arg.trim().parse().map_err(|_| ArgError::BadVcom)?;
    if !volts.is_finite() {
        return Err(ArgError::BadVcom);
    }
    let magnitude = if volts < 0.0 { -volts } else { volts };
    Ok((magnitude * 1000.0) as u16)
}

/// Parses the display-mode selector. Modes 0..=3 cover the known mounting
/// variants (rotation/mirror combinations of the shipped panels).
pub fn parse_display_mode(arg: &str) -> Result<u8, ArgError> {
    match arg.trim().parse::<u8>() {
        Ok(mode) if mode <= 3 => Ok(mode),
        _ => Err(ArgError::BadDisplayMode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vcom_takes_magnitude_in_millivolts() {
        assert_eq!(parse_vcom_millivolts("-2.51"), Ok(2510));
        assert_eq!(parse_vcom_millivolts("2.51"), Ok(2510));
        assert_eq!(parse_vcom_millivolts("-1.58"), Ok(1580));
        assert_eq!(parse_vcom_millivolts("0"), Ok(0));
        assert_eq!(parse_vcom_millivolts(" -2.51 "), Ok(2510));
    }

    #[test]
    fn test_parse_vcom_truncates_submillivolt_digits() {
        assert_eq!(parse_vcom_millivolts("-2.5109"), Ok(2510));
    }

    #[test]
    fn test_parse_vcom_rejects_garbage() {
        for arg in ["", "volts", "2,51", "NaN", "inf"] {
            assert_eq!(parse_vcom_millivolts(arg), Err(ArgError::BadVcom), "{arg:?}");
        }
    }

    #[test]
    fn test_parse_display_mode_bounds() {
        assert_eq!(parse_display_mode("0"), Ok(0));
        assert_eq!(parse_display_mode("3"), Ok(3));
        assert_eq!(parse_display_mode("4"), Err(ArgError::BadDisplayMode));
        assert_eq!(parse_display_mode("-1"), Err(ArgError::BadDisplayMode));
        assert_eq!(parse_display_mode("x"), Err(ArgError::BadDisplayMode));
    }

    #[test]
    fn test_from_args_defaults() {
        let config = Config::from_args("-2.51", "0").unwrap();
        assert_eq!(config.vcom_mv, 2510);
        assert_eq!(config.display_mode, 0);
        assert_eq!(config.bits_per_pixel, BitsPerPixel::Four);
        assert!(!config.enhance_driving);
        assert_eq!(config.power_off, PowerOff::Sleep);
    }

    #[test]
    fn test_arg_errors_exit_nonzero() {
        assert_eq!(ArgError::BadVcom.exit_code(), 1);
        assert_eq!(ArgError::BadDisplayMode.exit_code(), 1);
    }
}
