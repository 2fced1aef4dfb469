#![cfg(feature = "libiio")]

use max11205::libiio::IioContext;
use max11205::{Device, Error, Max11205};

fn fixture() -> IioContext {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/max11205.xml");
    IioContext::from_uri(&format!("xml:{}", path)).unwrap()
}

#[test]
fn xml_context_devices() {
    let devices = fixture().devices();
    let names: Vec<Option<String>> = devices.iter().map(|dev| dev.name()).collect();
    assert_eq!(names, [Some("ad9361-phy".into()), Some("max11205a".into())]);
    assert_eq!(devices[1].channel_ids(), ["voltage0", "timestamp"]);
    assert!(devices[1].is_sample_channel("voltage0"));
    assert!(!devices[1].is_sample_channel("timestamp"));
    assert!(!devices[1].is_sample_channel("voltage1"));
}

#[test]
fn select_from_xml_context() {
    let adc = Max11205::new(fixture().devices(), None).unwrap();
    assert_eq!(adc.num_channels(), 2);
    assert_eq!(adc.rx_channel_names(), ["voltage0", "timestamp"]);
    assert_eq!(adc.rx_enabled_channels(), [0]);

    let res = Max11205::new(fixture().devices(), Some("max11205b"));
    assert!(matches!(res, Err(Error::DeviceNotFound)));
}
