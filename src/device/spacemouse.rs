//! hidapi-backed event source for 3Dconnexion devices.
//!
//! The SpaceMouse family reports over three HID report ids: translation,
//! rotation and a button bitmask. Older devices split a motion sample over
//! a translation report followed by a rotation report; newer ones pack all
//! six axes behind the translation id. [`ReportDecoder`] merges the halves
//! so every [`DeviceEvent::Motion`] carries a full six-axis sample.

use hidapi::{DeviceInfo, HidApi, HidDevice};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use super::{DeviceError, DeviceEvent, DeviceSource, MotionSample};
use crate::config::DeviceConfig;

/// USB ids this backend claims when no override is configured.
const KNOWN_DEVICES: [(u16, u16); 17] = [
    (0x046d, 0xc603), // SpaceMouse Plus
    (0x046d, 0xc605), // CADMan
    (0x046d, 0xc606), // SpaceMouse Classic
    (0x046d, 0xc621), // SpaceBall 5000
    (0x046d, 0xc623), // SpaceTraveler
    (0x046d, 0xc625), // SpacePilot
    (0x046d, 0xc626), // SpaceNavigator
    (0x046d, 0xc627), // SpaceExplorer
    (0x046d, 0xc628), // SpaceNavigator for Notebooks
    (0x046d, 0xc629), // SpacePilot Pro
    (0x046d, 0xc62b), // SpaceMouse Pro
    (0x256f, 0xc62e), // SpaceMouse Wireless (cabled)
    (0x256f, 0xc62f), // SpaceMouse Wireless (receiver)
    (0x256f, 0xc631), // SpaceMouse Pro Wireless (cabled)
    (0x256f, 0xc632), // SpaceMouse Pro Wireless (receiver)
    (0x256f, 0xc633), // SpaceMouse Enterprise
    (0x256f, 0xc635), // SpaceMouse Compact
];

const REPORT_TRANSLATION: u8 = 1;
const REPORT_ROTATION: u8 = 2;
const REPORT_BUTTONS: u8 = 3;

/// Decodes raw HID reports into device events.
///
/// Keeps the last seen translation and rotation halves plus the previous
/// button bitmask, and queues synthesized events when one report expands to
/// more than one (several buttons changing in a single bitmask report).
#[derive(Debug, Default)]
struct ReportDecoder {
    translation: [f64; 3],
    rotation: [f64; 3],
    button_mask: u32,
    pending: VecDeque<DeviceEvent>,
}

impl ReportDecoder {
    fn decode(&mut self, data: &[u8]) -> Option<DeviceEvent> {
        let (&report_id, payload) = data.split_first()?;
        match report_id {
            // Newer devices pack all six axes behind the translation id.
            REPORT_TRANSLATION if payload.len() >= 12 => {
                self.translation = decode_triplet(&payload[..6])?;
                self.rotation = decode_triplet(&payload[6..12])?;
                Some(DeviceEvent::Motion(self.sample()))
            }
            REPORT_TRANSLATION => match decode_triplet(payload) {
                Some(values) => {
                    self.translation = values;
                    Some(DeviceEvent::Motion(self.sample()))
                }
                None => {
                    warn!("Truncated translation report ({} bytes)", payload.len());
                    Some(DeviceEvent::Invalid)
                }
            },
            REPORT_ROTATION => match decode_triplet(payload) {
                Some(values) => {
                    self.rotation = values;
                    Some(DeviceEvent::Motion(self.sample()))
                }
                None => {
                    warn!("Truncated rotation report ({} bytes)", payload.len());
                    Some(DeviceEvent::Invalid)
                }
            },
            REPORT_BUTTONS => {
                let mask = payload
                    .iter()
                    .take(4)
                    .enumerate()
                    .fold(0u32, |acc, (i, &byte)| acc | (u32::from(byte) << (8 * i)));
                let changed = mask ^ self.button_mask;
                self.button_mask = mask;
                for bit in 0..32 {
                    if changed & (1 << bit) != 0 {
                        self.pending.push_back(DeviceEvent::Button {
                            index: bit,
                            pressed: mask & (1 << bit) != 0,
                        });
                    }
                }
                // A repeated bitmask with no change expands to nothing.
                self.pending.pop_front()
            }
            other => {
                warn!("Unknown report id {} from device", other);
                Some(DeviceEvent::Invalid)
            }
        }
    }

    fn sample(&self) -> MotionSample {
        MotionSample {
            x: self.translation[0],
            y: self.translation[1],
            z: self.translation[2],
            rx: self.rotation[0],
            ry: self.rotation[1],
            rz: self.rotation[2],
        }
    }
}

/// Three little-endian i16 axis values.
fn decode_triplet(data: &[u8]) -> Option<[f64; 3]> {
    if data.len() < 6 {
        return None;
    }
    let mut out = [0.0; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = f64::from(i16::from_le_bytes([data[2 * i], data[2 * i + 1]]));
    }
    Some(out)
}

fn matches(info: &DeviceInfo, config: &DeviceConfig) -> bool {
    match (config.vendor_id, config.product_id) {
        (Some(vid), Some(pid)) => info.vendor_id() == vid && info.product_id() == pid,
        (Some(vid), None) => info.vendor_id() == vid,
        (None, Some(pid)) => info.product_id() == pid,
        (None, None) => KNOWN_DEVICES.contains(&(info.vendor_id(), info.product_id())),
    }
}

/// A 3Dconnexion device opened for non-blocking reads.
pub struct SpaceMouse {
    device: HidDevice,
    name: String,
    decoder: ReportDecoder,
}

impl SpaceMouse {
    /// Scans the HID bus and opens the first matching device.
    ///
    /// Called once at startup; an error here is fatal for the process.
    pub fn open(config: &DeviceConfig) -> Result<Self, DeviceError> {
        info!("Initializing HID backend");
        let api = HidApi::new().map_err(|e| DeviceError::InitializationError(e.to_string()))?;

        let info = api
            .device_list()
            .find(|info| matches(info, config))
            .ok_or(DeviceError::NotFound)?;

        let name = info
            .product_string()
            .unwrap_or("unknown 3D mouse")
            .to_string();
        info!(
            "Found device {:04x}:{:04x} ({})",
            info.vendor_id(),
            info.product_id(),
            name
        );

        let device = info
            .open_device(&api)
            .map_err(|e| DeviceError::OpenError(e.to_string()))?;
        device
            .set_blocking_mode(false)
            .map_err(|e| DeviceError::OpenError(e.to_string()))?;

        info!("Device opened for non-blocking polling");
        Ok(Self {
            device,
            name,
            decoder: ReportDecoder::default(),
        })
    }
}

impl DeviceSource for SpaceMouse {
    fn poll_event(&mut self) -> Option<DeviceEvent> {
        if let Some(event) = self.decoder.pending.pop_front() {
            return Some(event);
        }

        let mut buf = [0u8; 32];
        match self.device.read(&mut buf) {
            // Non-blocking read with nothing pending
            Ok(0) => None,
            Ok(len) => {
                debug!("HID report: {:?}", &buf[..len]);
                self.decoder.decode(&buf[..len])
            }
            Err(e) => {
                warn!("Failed to read from device: {}", e);
                Some(DeviceEvent::Invalid)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for SpaceMouse {
    fn drop(&mut self) {
        info!("Closing device '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triplet_report(id: u8, values: [i16; 3]) -> Vec<u8> {
        let mut report = vec![id];
        for value in values {
            report.extend_from_slice(&value.to_le_bytes());
        }
        report
    }

    #[test]
    fn translation_report_yields_motion_with_kept_rotation() {
        let mut decoder = ReportDecoder::default();
        decoder.decode(&triplet_report(REPORT_ROTATION, [7, -8, 9]));

        let event = decoder.decode(&triplet_report(REPORT_TRANSLATION, [100, -200, 350]));
        assert_eq!(
            event,
            Some(DeviceEvent::Motion(MotionSample {
                x: 100.0,
                y: -200.0,
                z: 350.0,
                rx: 7.0,
                ry: -8.0,
                rz: 9.0,
            }))
        );
    }

    #[test]
    fn packed_report_carries_all_six_axes() {
        let mut report = vec![REPORT_TRANSLATION];
        for value in [1i16, 2, 3, -4, -5, -6] {
            report.extend_from_slice(&value.to_le_bytes());
        }

        let mut decoder = ReportDecoder::default();
        let event = decoder.decode(&report);
        assert_eq!(
            event,
            Some(DeviceEvent::Motion(MotionSample {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                rx: -4.0,
                ry: -5.0,
                rz: -6.0,
            }))
        );
    }

    #[test]
    fn button_mask_diff_yields_one_event_per_changed_bit() {
        let mut decoder = ReportDecoder::default();

        // Buttons 0 and 1 go down in the same report.
        let first = decoder.decode(&[REPORT_BUTTONS, 0b11, 0, 0, 0]);
        assert_eq!(
            first,
            Some(DeviceEvent::Button {
                index: 0,
                pressed: true
            })
        );
        let second = decoder.pending.pop_front();
        assert_eq!(
            second,
            Some(DeviceEvent::Button {
                index: 1,
                pressed: true
            })
        );
        assert!(decoder.pending.is_empty());

        // Button 0 released, button 1 still held.
        let third = decoder.decode(&[REPORT_BUTTONS, 0b10, 0, 0, 0]);
        assert_eq!(
            third,
            Some(DeviceEvent::Button {
                index: 0,
                pressed: false
            })
        );
        assert!(decoder.pending.is_empty());
    }

    #[test]
    fn repeated_button_mask_is_not_an_event() {
        let mut decoder = ReportDecoder::default();
        decoder.decode(&[REPORT_BUTTONS, 0b01, 0, 0, 0]);
        decoder.pending.clear();

        assert_eq!(decoder.decode(&[REPORT_BUTTONS, 0b01, 0, 0, 0]), None);
    }

    #[test]
    fn unknown_report_id_is_invalid() {
        let mut decoder = ReportDecoder::default();
        assert_eq!(decoder.decode(&[23, 1, 2, 3]), Some(DeviceEvent::Invalid));
        // And leaves the motion state alone.
        assert_eq!(decoder.translation, [0.0; 3]);
        assert_eq!(decoder.rotation, [0.0; 3]);
    }

    #[test]
    fn truncated_motion_report_is_invalid() {
        let mut decoder = ReportDecoder::default();
        assert_eq!(
            decoder.decode(&[REPORT_TRANSLATION, 1, 2, 3]),
            Some(DeviceEvent::Invalid)
        );
        // State must not be half-written from a truncated report.
        assert_eq!(decoder.translation, [0.0; 3]);
    }
}
