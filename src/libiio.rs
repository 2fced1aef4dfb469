//! libiio context backend
//! (requires the `libiio` feature)
//!
//! Opens a context through the `industrial-io` bindings. The URI is handed to
//! libiio unchanged, e.g. `local:`, `ip:192.168.2.1` or `usb:1.2.3`; use
//! `iio_info -s` to find the right one.
use industrial_io as iio;
use log::{debug, warn};
use std::any::TypeId;

use crate::{Device, Error, Max11205, DEVICE_FAMILY};

/// An open libiio context
#[derive(Debug, Clone)]
pub struct IioContext {
    ctx: iio::Context,
}

/// A device of a libiio context
#[derive(Debug, Clone)]
pub struct IioDevice {
    dev: iio::Device,
}

impl IioContext {
    /// Open the context at `uri`
    pub fn from_uri(uri: &str) -> Result<Self, iio::Error> {
        debug!("{}: opening IIO context {}", DEVICE_FAMILY, uri);
        let ctx = iio::Context::from_uri(uri)?;
        Ok(Self { ctx })
    }

    /// Devices of the context, in libiio order
    pub fn devices(&self) -> Vec<IioDevice> {
        self.ctx.devices().map(|dev| IioDevice { dev }).collect()
    }
}

impl IioDevice {
    /// The underlying libiio device
    pub fn inner(&self) -> &iio::Device {
        &self.dev
    }

    fn input_channel(&self, id: &str) -> Option<iio::Channel> {
        self.dev
            .channels()
            .find(|ch| !ch.is_output() && ch.id().as_deref() == Some(id))
    }

    fn input_channel_or_err(&self, id: &str) -> iio::Result<iio::Channel> {
        self.input_channel(id)
            .ok_or_else(|| iio::Error::General(format!("no input channel '{}'", id)))
    }
}

impl Device for IioDevice {
    type Error = iio::Error;

    fn name(&self) -> Option<String> {
        self.dev.name()
    }

    fn channel_ids(&self) -> Vec<String> {
        self.dev
            .channels()
            .filter_map(|ch| {
                let id = ch.id().filter(|id| !id.is_empty());
                if id.is_none() {
                    warn!("{}: skipping channel without id", DEVICE_FAMILY);
                }
                id
            })
            .collect()
    }

    fn is_sample_channel(&self, channel: &str) -> bool {
        self.input_channel(channel)
            .is_some_and(|ch| ch.type_of() == Some(TypeId::of::<i16>()))
    }

    fn read_raw(&self, channel: &str) -> Result<i64, Self::Error> {
        self.input_channel_or_err(channel)?.attr_read_int("raw")
    }

    fn read_scale(&self, channel: &str) -> Result<String, Self::Error> {
        self.input_channel_or_err(channel)?.attr_read_str("scale")
    }

    fn capture(
        &mut self,
        channels: &[&str],
        samples: usize,
    ) -> Result<Vec<Vec<i16>>, Self::Error> {
        let chans = channels
            .iter()
            .map(|&id| self.input_channel_or_err(id))
            .collect::<iio::Result<Vec<_>>>()?;
        for ch in &chans {
            ch.enable();
        }

        let data: iio::Result<Vec<Vec<i16>>> = self
            .dev
            .create_buffer(samples, false)
            .and_then(|mut buf| {
                buf.refill()?;
                chans.iter().map(|ch| ch.read::<i16>(&buf)).collect()
            });

        for ch in &chans {
            ch.disable();
        }
        data
    }
}

impl Max11205<IioDevice> {
    /// Open the libiio context at `uri` and select `device_name` in it
    pub fn connect(uri: &str, device_name: Option<&str>) -> Result<Self, Error<iio::Error>> {
        let ctx = IioContext::from_uri(uri).map_err(Error::Iio)?;
        Self::new(ctx.devices(), device_name)
    }
}
