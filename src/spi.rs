//! Direct SPI access to the MAX11205 2-wire serial interface
//!
//! The part shifts out a 16-bit two's complement result, MSB first, on
//! RDY/DOUT once a conversion is complete. Wire SCLK to the bus clock and
//! RDY/DOUT to MISO. MOSI is unused. Since RDY/DOUT is shared with the data
//! line, waiting for the falling edge is left to the caller (e.g. an
//! interrupt on the pin before calling [`Channel::raw`](crate::Channel::raw)).
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use embedded_hal::spi::SpiDevice;

use crate::{Device, Part};

/// The single input channel of the part
pub const CHANNEL: &str = "voltage0";

/// Errors of the SPI backend
#[derive(Debug, PartialEq, Eq)]
pub enum SpiError<E> {
    /// SPI communication error
    Spi(E),
    /// The part has no channel with this id
    NoSuchChannel,
}

impl<E: fmt::Debug> fmt::Display for SpiError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpiError::Spi(e) => write!(f, "SPI error: {:?}", e),
            SpiError::NoSuchChannel => write!(f, "no channel other than {}", CHANNEL),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for SpiError<E> {}

/// MAX11205 on an SPI bus, presented as an IIO device
pub struct Max11205Spi<DEV> {
    spi: RefCell<DEV>,
    part: Part,
    vref_mv: u32,
}

impl<DEV, E> Max11205Spi<DEV>
where
    DEV: SpiDevice<Error = E>,
{
    /// Create a new MAX11205 SPI device. `vref_mv` is the reference voltage
    /// across REFP and REFN in millivolts.
    pub fn new(spi: DEV, part: Part, vref_mv: u32) -> Self {
        Self {
            spi: RefCell::new(spi),
            part,
            vref_mv,
        }
    }

    /// Release the SPI device
    pub fn release(self) -> DEV {
        self.spi.into_inner()
    }

    fn check_channel(channel: &str) -> Result<(), SpiError<E>> {
        if channel == CHANNEL {
            Ok(())
        } else {
            Err(SpiError::NoSuchChannel)
        }
    }

    fn read_sample(&self) -> Result<i16, SpiError<E>> {
        let mut rx = [0u8; 2];
        self.spi
            .borrow_mut()
            .read(&mut rx)
            .map_err(SpiError::Spi)?;
        Ok(i16::from_be_bytes(rx))
    }
}

/// Full scale is +/-VREF over 15 bits. Printed with nine truncated decimals,
/// the way the kernel formats a fractional log2 value.
fn format_scale(vref_mv: u32) -> String {
    let nano = (u64::from(vref_mv) * 1_000_000_000) >> 15;
    format!("{}.{:09}", nano / 1_000_000_000, nano % 1_000_000_000)
}

impl<DEV, E> Device for Max11205Spi<DEV>
where
    DEV: SpiDevice<Error = E>,
{
    type Error = SpiError<E>;

    fn name(&self) -> Option<String> {
        Some(self.part.name().into())
    }

    fn channel_ids(&self) -> Vec<String> {
        vec![CHANNEL.into()]
    }

    fn read_raw(&self, channel: &str) -> Result<i64, Self::Error> {
        Self::check_channel(channel)?;
        self.read_sample().map(i64::from)
    }

    fn read_scale(&self, channel: &str) -> Result<String, Self::Error> {
        Self::check_channel(channel)?;
        Ok(format_scale(self.vref_mv))
    }

    fn capture(
        &mut self,
        channels: &[&str],
        samples: usize,
    ) -> Result<Vec<Vec<i16>>, Self::Error> {
        channels
            .iter()
            .map(|&channel| -> Result<Vec<i16>, Self::Error> {
                Self::check_channel(channel)?;
                (0..samples).map(|_| self.read_sample()).collect()
            })
            .collect()
    }
}
