//! Device selection, channels and conversion
use alloc::string::String;
use alloc::vec::Vec;
use log::{debug, trace, warn};

use crate::{Device, Error, Part, Raw, Volts, DEVICE_FAMILY};

const DEFAULT_RX_BUFFER_SIZE: usize = 1024;

/// MAX11205 ADC bound to one device of an IIO context
pub struct Max11205<D> {
    dev: D,
    part: Part,
    channel_names: Vec<String>,
    rx_buffer_size: usize,
    rx_enabled_channels: Vec<usize>,
}

/// One input channel of a [`Max11205`]
///
/// Borrows the device handle of the ADC it belongs to. `raw` and `scale` go
/// to the device on every call.
pub struct Channel<'a, D> {
    ctrl: &'a D,
    name: &'a str,
}

impl<D, E> Max11205<D>
where
    D: Device<Error = E>,
{
    /// Select the MAX11205 named `device_name` among `devices`.
    ///
    /// `None` or an empty name selects `max11205a`. The first device whose
    /// name matches exactly is bound, the others are dropped.
    pub fn new<I>(devices: I, device_name: Option<&str>) -> Result<Self, Error<E>>
    where
        I: IntoIterator<Item = D>,
    {
        let part = match device_name {
            None | Some("") => Part::default(),
            Some(name) => Part::from_name(name).ok_or_else(|| {
                warn!("{}: not a compatible device: {}", DEVICE_FAMILY, name);
                Error::IncompatibleDevice
            })?,
        };

        let dev = devices
            .into_iter()
            .find(|dev| dev.name().as_deref() == Some(part.name()))
            .ok_or_else(|| {
                warn!("{}: no device named {} in context", DEVICE_FAMILY, part);
                Error::DeviceNotFound
            })?;

        let channel_names = dev.channel_ids();
        let rx_enabled_channels: Vec<usize> = channel_names
            .iter()
            .enumerate()
            .filter(|(_, name)| dev.is_sample_channel(name))
            .map(|(i, _)| i)
            .collect();
        debug!(
            "{}: selected {} with {} channel(s), {} sampled",
            DEVICE_FAMILY,
            part,
            channel_names.len(),
            rx_enabled_channels.len()
        );

        Ok(Self {
            rx_enabled_channels,
            rx_buffer_size: DEFAULT_RX_BUFFER_SIZE,
            dev,
            part,
            channel_names,
        })
    }

    /// Variant this driver is bound to
    pub fn part(&self) -> Part {
        self.part
    }

    /// Number of channels reported by the device
    pub fn num_channels(&self) -> usize {
        self.channel_names.len()
    }

    /// Channel at `index`, in discovery order
    pub fn channel(&self, index: usize) -> Result<Channel<'_, D>, Error<E>> {
        self.channel_names
            .get(index)
            .map(|name| Channel {
                ctrl: &self.dev,
                name: name.as_str(),
            })
            .ok_or(Error::InvalidChannel)
    }

    /// All channels, in discovery order
    pub fn channels(&self) -> impl ExactSizeIterator<Item = Channel<'_, D>> + '_ {
        self.channel_names.iter().map(move |name| Channel {
            ctrl: &self.dev,
            name: name.as_str(),
        })
    }

    /// Convert raw samples of channel `index` to volts.
    ///
    /// Reads the channel's scale once and multiplies every sample by it.
    /// ```ignore
    /// let v = adc.to_volts(0, 100i16)?;
    /// let vs = adc.to_volts(0, &samples)?;
    /// ```
    pub fn to_volts<'r>(&self, index: usize, val: impl Into<Raw<'r>>) -> Result<Volts, Error<E>> {
        let scale = self.channel(index)?.scale()?;
        Ok(match val.into() {
            Raw::Sample(x) => Volts::Sample(f64::from(x) * scale),
            Raw::Samples(xs) => Volts::Samples(xs.iter().map(|&x| f64::from(x) * scale).collect()),
        })
    }

    /// Names of the channels available to the receive path
    pub fn rx_channel_names(&self) -> &[String] {
        &self.channel_names
    }

    /// Samples captured per channel by [`Self::rx`]
    pub fn rx_buffer_size(&self) -> usize {
        self.rx_buffer_size
    }

    /// Set the number of samples captured per channel
    pub fn set_rx_buffer_size(&mut self, size: usize) -> Result<(), Error<E>> {
        if size == 0 {
            return Err(Error::InvalidArgument);
        }
        self.rx_buffer_size = size;
        Ok(())
    }

    /// Indices of the channels [`Self::rx`] captures
    pub fn rx_enabled_channels(&self) -> &[usize] {
        &self.rx_enabled_channels
    }

    /// Select the channels [`Self::rx`] captures, in the order given
    pub fn set_rx_enabled_channels(&mut self, channels: &[usize]) -> Result<(), Error<E>> {
        if channels.is_empty() || channels.iter().any(|&ch| ch >= self.channel_names.len()) {
            return Err(Error::InvalidChannel);
        }
        self.rx_enabled_channels = channels.to_vec();
        Ok(())
    }

    /// Capture one buffer from the enabled channels.
    ///
    /// Returns one vector of `rx_buffer_size` samples per enabled channel.
    /// Fails with [`Error::InvalidChannel`] if no channel is enabled.
    pub fn rx(&mut self) -> Result<Vec<Vec<i16>>, Error<E>> {
        if self.rx_enabled_channels.is_empty() {
            return Err(Error::InvalidChannel);
        }
        let names: Vec<&str> = self
            .rx_enabled_channels
            .iter()
            .map(|&ch| self.channel_names[ch].as_str())
            .collect();
        trace!(
            "{}: capturing {} samples from {:?}",
            DEVICE_FAMILY,
            self.rx_buffer_size,
            names
        );
        self.dev
            .capture(&names, self.rx_buffer_size)
            .map_err(Error::Iio)
    }

    /// Release the device handle
    pub fn destroy(self) -> D {
        self.dev
    }
}

impl<'a, D, E> Channel<'a, D>
where
    D: Device<Error = E>,
{
    /// Channel id, e.g. `voltage0`
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Instantaneous raw sample
    pub fn raw(&self) -> Result<i64, Error<E>> {
        self.ctrl.read_raw(self.name).map_err(Error::Iio)
    }

    /// Scale from raw sample to volts
    pub fn scale(&self) -> Result<f64, Error<E>> {
        let scale = self.ctrl.read_scale(self.name).map_err(Error::Iio)?;
        scale.trim().parse().map_err(|_| Error::InvalidScale)
    }
}
