//! Driver for the Analog Devices MAX11205 16-bit delta-sigma ADC
//!
//! The driver binds one MAX11205 exposed through an industrial I/O (IIO)
//! style collaborator. Anything implementing [`Device`] can back it:
//!
//! - [`spi::Max11205Spi`] talks to the part directly over an
//!   `embedded_hal` SPI bus and presents a single `voltage0` channel.
//! - `libiio::IioContext` (feature `libiio`) opens a libiio context from a
//!   URI such as `ip:analog.local` and hands out the devices it finds.
//!
//! ```ignore
//! let ctx = IioContext::from_uri("ip:192.168.2.1")?;
//! let adc = Max11205::new(ctx.devices(), Some("max11205b"))?;
//! let volts = adc.to_volts(0, Raw::try_from(adc.channel(0)?.raw()?)?)?;
//! ```

#![deny(unsafe_code, missing_docs)]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

mod adc;
#[cfg(feature = "libiio")]
pub mod libiio;
pub mod spi;

pub use adc::{Channel, Max11205};

/// Part variants the driver accepts, in order. The first one is the default.
pub const COMPATIBLE_PARTS: [&str; 2] = ["max11205a", "max11205b"];

/// Family tag the driver labels its context with
pub const DEVICE_FAMILY: &str = "max11205";

/// Samples delivered by the receive path are real, never I/Q pairs
pub const COMPLEX_DATA: bool = false;

/// Errors for this crate
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Error reported by the IIO context or transport
    Iio(E),
    /// Requested part is not a MAX11205 variant
    IncompatibleDevice,
    /// No device in the context carries the requested name
    DeviceNotFound,
    /// Value cannot be converted to a voltage
    Conversion,
    /// Channel index out of range
    InvalidChannel,
    /// Invalid argument
    InvalidArgument,
    /// The scale attribute is not a number
    InvalidScale,
}

impl<E> From<ConversionError> for Error<E> {
    fn from(_: ConversionError) -> Self {
        Error::Conversion
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Iio(e) => write!(f, "IIO error: {:?}", e),
            Error::IncompatibleDevice => f.write_str("not a compatible device"),
            Error::DeviceNotFound => f.write_str("no matching device in context"),
            Error::Conversion => f.write_str("unable to convert to voltage"),
            Error::InvalidChannel => f.write_str("channel index out of range"),
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::InvalidScale => f.write_str("scale attribute is not a number"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: std::error::Error + 'static> std::error::Error for Error<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Iio(e) => Some(e),
            _ => None,
        }
    }
}

/// A value could not be represented as a signed 16-bit sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ConversionError;

/// MAX11205 variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Part {
    /// 116 SPS output data rate
    #[default]
    Max11205a,
    /// 13 SPS output data rate
    Max11205b,
}

impl Part {
    /// Device name as it appears in an IIO context
    pub const fn name(self) -> &'static str {
        match self {
            Part::Max11205a => COMPATIBLE_PARTS[0],
            Part::Max11205b => COMPATIBLE_PARTS[1],
        }
    }

    /// Output data rate in samples per second
    pub const fn data_rate_sps(self) -> u32 {
        match self {
            Part::Max11205a => 116,
            Part::Max11205b => 13,
        }
    }

    /// Look up a variant by its exact, case-sensitive name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max11205a" => Some(Part::Max11205a),
            "max11205b" => Some(Part::Max11205b),
            _ => None,
        }
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw input accepted by [`Max11205::to_volts`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raw<'a> {
    /// A single sample
    Sample(i16),
    /// A run of samples, e.g. one channel of a receive buffer
    Samples(&'a [i16]),
}

impl From<i16> for Raw<'_> {
    fn from(value: i16) -> Self {
        Raw::Sample(value)
    }
}

impl<'a> From<&'a [i16]> for Raw<'a> {
    fn from(value: &'a [i16]) -> Self {
        Raw::Samples(value)
    }
}

impl<'a, const N: usize> From<&'a [i16; N]> for Raw<'a> {
    fn from(value: &'a [i16; N]) -> Self {
        Raw::Samples(value)
    }
}

impl<'a> From<&'a Vec<i16>> for Raw<'a> {
    fn from(value: &'a Vec<i16>) -> Self {
        Raw::Samples(value)
    }
}

/// [`Channel::raw`] hands back the attribute's native integer. Anything
/// outside the 16-bit sample range is not a MAX11205 reading.
impl TryFrom<i64> for Raw<'_> {
    type Error = ConversionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        i16::try_from(value)
            .map(Raw::Sample)
            .map_err(|_| ConversionError)
    }
}

/// Result of [`Max11205::to_volts`], shaped like its input
#[derive(Debug, Clone, PartialEq)]
pub enum Volts {
    /// Converted single sample
    Sample(f64),
    /// Converted samples, same length and order as the input
    Samples(Vec<f64>),
}

/// A device handle as provided by an IIO context.
///
/// Channels are addressed by their id. Attribute reads are non-buffered and
/// never cached by the driver.
pub trait Device {
    /// Error type of the underlying transport
    type Error;

    /// Device name, `None` if the context does not report one
    fn name(&self) -> Option<String>;

    /// Channel ids in the order the context reports them
    fn channel_ids(&self) -> Vec<String>;

    /// Whether the channel's buffered samples are signed 16-bit values.
    /// Only those are enabled for capture by default, which leaves out e.g.
    /// the 64-bit soft `timestamp` channel of the kernel driver.
    fn is_sample_channel(&self, _channel: &str) -> bool {
        true
    }

    /// Read the `raw` attribute of a channel
    fn read_raw(&self, channel: &str) -> Result<i64, Self::Error>;

    /// Read the `scale` attribute of a channel as text
    fn read_scale(&self, channel: &str) -> Result<String, Self::Error>;

    /// Capture `samples` buffered samples from each listed channel.
    /// Returns one vector per channel, in the order given.
    fn capture(&mut self, channels: &[&str], samples: usize)
        -> Result<Vec<Vec<i16>>, Self::Error>;
}
