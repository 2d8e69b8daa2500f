//! Device capability interface shared by every native backend
//!
//! The session never sees a concrete platform type. Backends implement
//! [`ForceFeedbackDevice`] and advertise which native effect model they
//! follow through [`DeviceModel`].

use std::fmt;
use std::path::PathBuf;

use ffbsim_errors::DeviceResult;
use ffbsim_ffb::{
    EffectType, NativeEffect, POLLED_PLATFORM_MAX, RESIDENT_PLATFORM_MAX, SIDEWINDER_NAME_HINT,
    SIDEWINDER_PID, SIDEWINDER_VID, TypeParams,
};
use serde::{Deserialize, Serialize};

/// Native force-feedback model of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceModel {
    /// Exclusive ownership must be acquired and periodically re-acquired;
    /// effects may exist on the host without being downloaded.
    PolledAcquisition,
    /// Effects are uploaded once into a kernel-resident table and started
    /// by id; state changes arrive asynchronously.
    ResidentTable,
}

impl DeviceModel {
    /// Native magnitude range used when the configuration does not set one.
    pub fn default_platform_max(self) -> i32 {
        match self {
            DeviceModel::PolledAcquisition => POLLED_PLATFORM_MAX,
            DeviceModel::ResidentTable => RESIDENT_PLATFORM_MAX,
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceModel::PolledAcquisition => write!(f, "polled-acquisition"),
            DeviceModel::ResidentTable => write!(f, "resident-table"),
        }
    }
}

/// Static description of an opened or enumerable device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub model: DeviceModel,
    /// Number of effects the device can hold at once
    pub max_effects: usize,
    pub supported_effects: Vec<EffectType>,
}

impl DeviceInfo {
    pub fn supports(&self, effect_type: EffectType) -> bool {
        self.supported_effects.contains(&effect_type)
    }

    /// `VID:PID` in upper-case hex, e.g. `045E:0034`.
    pub fn ids(&self) -> String {
        format!("{:04X}:{:04X}", self.vendor_id, self.product_id)
    }
}

/// Platform-assigned token for an effect resident on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectHandle(pub u32);

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw input state read by one poll
///
/// # Examples
///
/// ```
/// use ffbsim_session::DeviceSample;
///
/// let sample = DeviceSample { axis: -120, pedals: (0, 255), buttons: 0b1001 };
/// assert_eq!(sample.pressed_buttons().collect::<Vec<_>>(), vec![0, 3]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceSample {
    /// Steering position
    pub axis: i32,
    /// Accelerator and brake
    pub pedals: (i32, i32),
    /// One bit per button, bit 0 is button 0
    pub buttons: u32,
}

impl DeviceSample {
    pub fn pressed_buttons(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..32).filter(move |bit| self.buttons & (1 << bit) != 0)
    }
}

/// How to find the wheel among attached devices
///
/// A path wins when given. Otherwise a device matching both ids is
/// preferred over one whose name merely contains the hint.
///
/// # Examples
///
/// ```
/// use ffbsim_session::DeviceLocator;
///
/// let locator = DeviceLocator::default();
/// assert_eq!(locator.to_string(), "045E:0034 or name containing \"sidewinder\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceLocator {
    pub path: Option<PathBuf>,
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
    pub name_hint: Option<String>,
}

impl Default for DeviceLocator {
    fn default() -> Self {
        Self {
            path: None,
            vendor_id: Some(SIDEWINDER_VID),
            product_id: Some(SIDEWINDER_PID),
            name_hint: Some(SIDEWINDER_NAME_HINT.to_string()),
        }
    }
}

impl DeviceLocator {
    /// Matches any force-feedback device.
    pub fn any() -> Self {
        Self {
            path: None,
            vendor_id: None,
            product_id: None,
            name_hint: None,
        }
    }

    pub fn by_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::any()
        }
    }

    pub fn by_ids(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id: Some(vendor_id),
            product_id: Some(product_id),
            ..Self::any()
        }
    }

    pub fn by_name(fragment: impl Into<String>) -> Self {
        Self {
            name_hint: Some(fragment.into()),
            ..Self::any()
        }
    }

    fn is_any(&self) -> bool {
        self.path.is_none()
            && self.vendor_id.is_none()
            && self.product_id.is_none()
            && self.name_hint.is_none()
    }

    fn matches_ids(&self, info: &DeviceInfo) -> bool {
        match (self.vendor_id, self.product_id) {
            (None, None) => false,
            (vid, pid) => {
                vid.is_none_or(|v| v == info.vendor_id) && pid.is_none_or(|p| p == info.product_id)
            }
        }
    }

    fn matches_name(&self, info: &DeviceInfo) -> bool {
        self.name_hint
            .as_deref()
            .is_some_and(|hint| info.name.to_lowercase().contains(&hint.to_lowercase()))
    }

    /// Picks the best candidate: path, then ids, then name; `any()` takes
    /// the first candidate.
    pub fn select<'a>(&self, candidates: &'a [DeviceInfo]) -> Option<&'a DeviceInfo> {
        if let Some(path) = &self.path {
            return candidates
                .iter()
                .find(|info| PathBuf::from(&info.path) == *path);
        }
        if self.is_any() {
            return candidates.first();
        }
        candidates
            .iter()
            .find(|info| self.matches_ids(info))
            .or_else(|| candidates.iter().find(|info| self.matches_name(info)))
    }
}

impl fmt::Display for DeviceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            return write!(f, "{}", path.display());
        }
        let ids = match (self.vendor_id, self.product_id) {
            (Some(v), Some(p)) => Some(format!("{v:04X}:{p:04X}")),
            (Some(v), None) => Some(format!("{v:04X}:*")),
            (None, Some(p)) => Some(format!("*:{p:04X}")),
            (None, None) => None,
        };
        match (ids, &self.name_hint) {
            (Some(ids), Some(hint)) => write!(f, "{ids} or name containing \"{hint}\""),
            (Some(ids), None) => write!(f, "{ids}"),
            (None, Some(hint)) => write!(f, "name containing \"{hint}\""),
            (None, None) => write!(f, "any force-feedback device"),
        }
    }
}

/// One opened force-feedback device.
///
/// Every call is expected to return promptly; the session holds the device
/// lock for the duration of a call.
pub trait ForceFeedbackDevice: Send {
    fn info(&self) -> &DeviceInfo;

    fn model(&self) -> DeviceModel {
        self.info().model
    }

    /// Sets the data format and cooperative level. Called once after open.
    fn configure(&mut self) -> DeviceResult;

    /// Takes ownership. Fails with an ownership error while another
    /// process holds the device.
    fn acquire(&mut self) -> DeviceResult;

    fn unacquire(&mut self) -> DeviceResult;

    /// Allocates an effect slot for `effect`.
    fn create_effect(&mut self, effect: &NativeEffect) -> DeviceResult<EffectHandle>;

    /// Makes a created effect resident on the hardware.
    fn download(&mut self, handle: EffectHandle) -> DeviceResult;

    /// Starts one iteration of the effect.
    fn start(&mut self, handle: EffectHandle) -> DeviceResult;

    fn stop(&mut self, handle: EffectHandle) -> DeviceResult;

    /// Replaces the type-specific parameters without restarting playback.
    fn update(&mut self, handle: EffectHandle, params: &TypeParams) -> DeviceResult;

    fn remove(&mut self, handle: EffectHandle) -> DeviceResult;

    fn poll(&mut self) -> DeviceResult<DeviceSample>;

    fn set_autocenter(&mut self, enabled: bool) -> DeviceResult;

    /// Releases the connection. Further calls fail with `Closed`.
    fn close(&mut self) -> DeviceResult;
}

/// Enumerates and opens devices of one backend
pub trait DeviceProvider {
    /// Devices that report force-feedback capability.
    fn list(&self) -> DeviceResult<Vec<DeviceInfo>>;

    fn open(&self, locator: &DeviceLocator) -> DeviceResult<Box<dyn ForceFeedbackDevice>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, path: &str, vid: u16, pid: u16) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            path: path.to_string(),
            vendor_id: vid,
            product_id: pid,
            model: DeviceModel::ResidentTable,
            max_effects: 16,
            supported_effects: vec![EffectType::Constant],
        }
    }

    #[test]
    fn test_select_prefers_ids_over_name() {
        let candidates = [
            info("Old SideWinder Joystick", "/dev/input/event2", 0x045E, 0x001B),
            info("Microsoft Wheel", "/dev/input/event5", 0x045E, 0x0034),
        ];
        let found = DeviceLocator::default().select(&candidates).map(|i| i.path.as_str());
        assert_eq!(found, Some("/dev/input/event5"));
    }

    #[test]
    fn test_select_falls_back_to_name() {
        let candidates = [
            info("Logitech G29", "/dev/input/event3", 0x046D, 0xC24F),
            info("SIDEWINDER Force Feedback Wheel (USB)", "/dev/input/event7", 0x1234, 0x5678),
        ];
        let found = DeviceLocator::default().select(&candidates).map(|i| i.path.as_str());
        assert_eq!(found, Some("/dev/input/event7"));
    }

    #[test]
    fn test_select_by_path_is_exact() {
        let candidates = [
            info("A", "/dev/input/event1", 1, 1),
            info("B", "/dev/input/event2", 2, 2),
        ];
        let locator = DeviceLocator::by_path("/dev/input/event2");
        assert_eq!(locator.select(&candidates).map(|i| i.name.as_str()), Some("B"));
        assert!(DeviceLocator::by_path("/dev/input/event9").select(&candidates).is_none());
    }

    #[test]
    fn test_select_any_and_none() {
        let candidates = [info("A", "/dev/input/event1", 1, 1)];
        assert!(DeviceLocator::any().select(&candidates).is_some());
        assert!(DeviceLocator::by_ids(9, 9).select(&candidates).is_none());
        assert!(DeviceLocator::any().select(&[]).is_none());
    }

    #[test]
    fn test_locator_display() {
        assert_eq!(DeviceLocator::by_ids(0x046D, 0xC24F).to_string(), "046D:C24F");
        assert_eq!(DeviceLocator::by_name("g29").to_string(), "name containing \"g29\"");
        assert_eq!(DeviceLocator::any().to_string(), "any force-feedback device");
    }

    #[test]
    fn test_default_platform_max() {
        assert_eq!(DeviceModel::PolledAcquisition.default_platform_max(), 10_000);
        assert_eq!(DeviceModel::ResidentTable.default_platform_max(), 32_767);
    }

    #[test]
    fn test_info_ids() {
        assert_eq!(info("x", "p", 0x045E, 0x0034).ids(), "045E:0034");
    }
}
