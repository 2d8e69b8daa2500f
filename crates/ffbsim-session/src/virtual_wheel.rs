//! In-memory force-feedback wheel
//!
//! Emulates either native model closely enough to drive a session without
//! hardware, and lets tests inject the faults real devices produce:
//! rejected effect kinds, ownership loss, evicted effects and failing stop
//! commands. Every [`VirtualWheelControl`] clone observes the same wheel.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use ffbsim_errors::{DeviceError, DeviceResult};
use ffbsim_ffb::{EffectType, NativeEffect, SIDEWINDER_PID, SIDEWINDER_VID, TypeParams};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::device::{
    DeviceInfo, DeviceLocator, DeviceModel, DeviceProvider, DeviceSample, EffectHandle,
    ForceFeedbackDevice,
};

const VIRTUAL_MAX_EFFECTS: usize = 32;

#[derive(Debug, Clone)]
struct VirtualEffect {
    native: NativeEffect,
    downloaded: bool,
    playing: bool,
    starts: u32,
    updates: u32,
}

#[derive(Debug)]
struct WheelState {
    info: DeviceInfo,
    held: bool,
    closed: bool,
    configured: bool,
    acquired: bool,
    revoked: bool,
    autocenter: bool,
    effects: BTreeMap<u32, VirtualEffect>,
    next_handle: u32,
    rejected: HashSet<EffectType>,
    fail_start: bool,
    fail_stop: bool,
    fail_poll: bool,
    sample: DeviceSample,
    polls: u64,
}

impl WheelState {
    fn new(info: DeviceInfo) -> Self {
        Self {
            info,
            held: false,
            closed: false,
            configured: false,
            acquired: false,
            revoked: false,
            autocenter: true,
            effects: BTreeMap::new(),
            next_handle: 1,
            rejected: HashSet::new(),
            fail_start: false,
            fail_stop: false,
            fail_poll: false,
            sample: DeviceSample::default(),
            polls: 0,
        }
    }

    fn is_polled(&self) -> bool {
        self.info.model == DeviceModel::PolledAcquisition
    }

    fn ensure_open(&self) -> DeviceResult {
        if self.closed {
            Err(DeviceError::Closed)
        } else {
            Ok(())
        }
    }

    /// Polled devices refuse force output while not owned.
    fn ensure_owned(&self) -> DeviceResult {
        if self.revoked {
            Err(DeviceError::OwnershipLost)
        } else if self.is_polled() && !self.acquired {
            Err(DeviceError::NotAcquired)
        } else {
            Ok(())
        }
    }

    fn effect_mut(&mut self, handle: EffectHandle) -> DeviceResult<&mut VirtualEffect> {
        let device = self.info.name.clone();
        self.effects.get_mut(&handle.0).ok_or_else(|| {
            DeviceError::communication(device, format!("unknown effect handle {handle}"))
        })
    }

    fn stop_everything(&mut self) {
        for effect in self.effects.values_mut() {
            effect.playing = false;
        }
    }
}

/// Shared view of a virtual wheel used to build it, inject faults and
/// inspect what the session did to it.
///
/// # Examples
///
/// ```
/// use ffbsim_session::{DeviceLocator, DeviceProvider, VirtualWheelControl};
///
/// let wheel = VirtualWheelControl::sidewinder();
/// let provider = wheel.provider();
/// let device = provider.open(&DeviceLocator::default())?;
/// assert_eq!(device.info().ids(), "045E:0034");
/// assert!(provider.open(&DeviceLocator::default()).is_err());
/// # Ok::<(), ffbsim_errors::DeviceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct VirtualWheelControl {
    state: Arc<Mutex<WheelState>>,
}

impl VirtualWheelControl {
    pub fn new(info: DeviceInfo) -> Self {
        Self {
            state: Arc::new(Mutex::new(WheelState::new(info))),
        }
    }

    /// A polled-acquisition wheel with the SideWinder ids.
    pub fn sidewinder() -> Self {
        Self::new(DeviceInfo {
            name: "SideWinder Force Feedback Wheel (virtual)".to_string(),
            path: "virtual://sidewinder".to_string(),
            vendor_id: SIDEWINDER_VID,
            product_id: SIDEWINDER_PID,
            model: DeviceModel::PolledAcquisition,
            max_effects: VIRTUAL_MAX_EFFECTS,
            supported_effects: EffectType::ALL.to_vec(),
        })
    }

    /// A resident-table wheel with the SideWinder ids.
    pub fn resident() -> Self {
        Self::new(DeviceInfo {
            name: "SideWinder Force Feedback Wheel (virtual evdev)".to_string(),
            path: "virtual://event0".to_string(),
            vendor_id: SIDEWINDER_VID,
            product_id: SIDEWINDER_PID,
            model: DeviceModel::ResidentTable,
            max_effects: VIRTUAL_MAX_EFFECTS,
            supported_effects: EffectType::ALL.to_vec(),
        })
    }

    pub fn info(&self) -> DeviceInfo {
        self.state.lock().info.clone()
    }

    /// A device bound to this wheel, bypassing the provider's busy check.
    pub fn device(&self) -> VirtualWheel {
        VirtualWheel {
            info: self.info(),
            state: Arc::clone(&self.state),
        }
    }

    pub fn provider(&self) -> VirtualWheelProvider {
        VirtualWheelProvider {
            wheel: self.clone(),
        }
    }

    /// Makes `create_effect` reject every effect of `effect_type`.
    pub fn reject(&self, effect_type: EffectType) {
        self.state.lock().rejected.insert(effect_type);
    }

    /// Simulates another process taking the device: playing effects stop,
    /// polls and acquisition fail until [`Self::restore_ownership`].
    pub fn revoke_ownership(&self) {
        let mut state = self.state.lock();
        state.revoked = true;
        state.acquired = false;
        state.stop_everything();
    }

    pub fn restore_ownership(&self) {
        self.state.lock().revoked = false;
    }

    /// Drops the effect from the hardware while keeping its handle valid.
    pub fn evict(&self, handle: EffectHandle) {
        if let Some(effect) = self.state.lock().effects.get_mut(&handle.0) {
            effect.downloaded = false;
            effect.playing = false;
        }
    }

    pub fn fail_start_commands(&self, fail: bool) {
        self.state.lock().fail_start = fail;
    }

    pub fn fail_stop_commands(&self, fail: bool) {
        self.state.lock().fail_stop = fail;
    }

    pub fn fail_polls(&self, fail: bool) {
        self.state.lock().fail_poll = fail;
    }

    /// Marks the wheel as opened by someone else.
    pub fn hold(&self) {
        self.state.lock().held = true;
    }

    pub fn set_sample(&self, sample: DeviceSample) {
        self.state.lock().sample = sample;
    }

    pub fn playing_handles(&self) -> Vec<EffectHandle> {
        self.state
            .lock()
            .effects
            .iter()
            .filter(|(_, e)| e.playing)
            .map(|(id, _)| EffectHandle(*id))
            .collect()
    }

    pub fn is_playing(&self, handle: EffectHandle) -> bool {
        self.state
            .lock()
            .effects
            .get(&handle.0)
            .is_some_and(|e| e.playing)
    }

    pub fn is_downloaded(&self, handle: EffectHandle) -> bool {
        self.state
            .lock()
            .effects
            .get(&handle.0)
            .is_some_and(|e| e.downloaded)
    }

    pub fn params(&self, handle: EffectHandle) -> Option<TypeParams> {
        self.state.lock().effects.get(&handle.0).map(|e| e.native.params)
    }

    pub fn native(&self, handle: EffectHandle) -> Option<NativeEffect> {
        self.state
            .lock()
            .effects
            .get(&handle.0)
            .map(|e| e.native.clone())
    }

    pub fn start_count(&self, handle: EffectHandle) -> u32 {
        self.state.lock().effects.get(&handle.0).map_or(0, |e| e.starts)
    }

    pub fn update_count(&self, handle: EffectHandle) -> u32 {
        self.state.lock().effects.get(&handle.0).map_or(0, |e| e.updates)
    }

    /// Effects currently allocated on the wheel.
    pub fn resident_count(&self) -> usize {
        self.state.lock().effects.len()
    }

    pub fn autocenter(&self) -> bool {
        self.state.lock().autocenter
    }

    pub fn is_configured(&self) -> bool {
        self.state.lock().configured
    }

    pub fn is_acquired(&self) -> bool {
        self.state.lock().acquired
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn poll_count(&self) -> u64 {
        self.state.lock().polls
    }
}

/// Device half of a virtual wheel
#[derive(Debug)]
pub struct VirtualWheel {
    info: DeviceInfo,
    state: Arc<Mutex<WheelState>>,
}

impl ForceFeedbackDevice for VirtualWheel {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn configure(&mut self) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.configured = true;
        Ok(())
    }

    fn acquire(&mut self) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        if state.revoked {
            return Err(DeviceError::OwnershipLost);
        }
        state.acquired = true;
        Ok(())
    }

    fn unacquire(&mut self) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.acquired = false;
        state.stop_everything();
        Ok(())
    }

    fn create_effect(&mut self, effect: &NativeEffect) -> DeviceResult<EffectHandle> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        let effect_type = effect.effect_type();
        if state.rejected.contains(&effect_type) {
            return Err(DeviceError::rejected(
                effect_type.label(),
                "parameters refused by virtual wheel",
            ));
        }
        if !state.info.supports(effect_type) {
            return Err(DeviceError::unsupported(
                state.info.name.clone(),
                effect_type.label(),
            ));
        }
        if state.effects.len() >= state.info.max_effects {
            return Err(DeviceError::rejected(effect_type.label(), "effect table full"));
        }

        // Polled devices only download while owned; a resident table
        // uploads immediately.
        let downloaded = !state.is_polled() || (state.acquired && !state.revoked);
        let handle = EffectHandle(state.next_handle);
        state.next_handle += 1;
        state.effects.insert(
            handle.0,
            VirtualEffect {
                native: effect.clone(),
                downloaded,
                playing: false,
                starts: 0,
                updates: 0,
            },
        );
        trace!(handle = %handle, effect = %effect_type, downloaded, "Virtual effect created");
        Ok(handle)
    }

    fn download(&mut self, handle: EffectHandle) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.ensure_owned()?;
        state.effect_mut(handle)?.downloaded = true;
        Ok(())
    }

    fn start(&mut self, handle: EffectHandle) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.ensure_owned()?;
        if state.fail_start {
            return Err(DeviceError::communication(
                state.info.name.clone(),
                "start command refused",
            ));
        }
        let effect = state.effect_mut(handle)?;
        if !effect.downloaded {
            return Err(DeviceError::NotDownloaded { handle: handle.0 });
        }
        effect.playing = true;
        effect.starts += 1;
        Ok(())
    }

    fn stop(&mut self, handle: EffectHandle) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        if state.fail_stop {
            return Err(DeviceError::communication(
                state.info.name.clone(),
                "stop command timed out",
            ));
        }
        state.effect_mut(handle)?.playing = false;
        Ok(())
    }

    fn update(&mut self, handle: EffectHandle, params: &TypeParams) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.ensure_owned()?;
        let effect = state.effect_mut(handle)?;
        if effect.native.effect_type() != params.effect_type() {
            return Err(DeviceError::rejected(
                effect.native.effect_type().label(),
                format!("parameter block is {}", params.effect_type()),
            ));
        }
        effect.native.params = *params;
        effect.updates += 1;
        Ok(())
    }

    fn remove(&mut self, handle: EffectHandle) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.effect_mut(handle)?;
        state.effects.remove(&handle.0);
        Ok(())
    }

    fn poll(&mut self) -> DeviceResult<DeviceSample> {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.ensure_owned()?;
        if state.fail_poll {
            return Err(DeviceError::communication(
                state.info.name.clone(),
                "input report dropped",
            ));
        }
        state.polls += 1;
        Ok(state.sample)
    }

    fn set_autocenter(&mut self, enabled: bool) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.autocenter = enabled;
        Ok(())
    }

    fn close(&mut self) -> DeviceResult {
        let mut state = self.state.lock();
        state.ensure_open()?;
        state.stop_everything();
        state.closed = true;
        state.acquired = false;
        state.held = false;
        debug!(device = %state.info.name, "Virtual wheel closed");
        Ok(())
    }
}

/// Provider that hands out its wheel once
#[derive(Debug, Clone)]
pub struct VirtualWheelProvider {
    wheel: VirtualWheelControl,
}

impl VirtualWheelProvider {
    pub fn control(&self) -> &VirtualWheelControl {
        &self.wheel
    }
}

impl DeviceProvider for VirtualWheelProvider {
    fn list(&self) -> DeviceResult<Vec<DeviceInfo>> {
        Ok(vec![self.wheel.info()])
    }

    fn open(&self, locator: &DeviceLocator) -> DeviceResult<Box<dyn ForceFeedbackDevice>> {
        let candidates = self.list()?;
        let info = locator
            .select(&candidates)
            .ok_or_else(|| DeviceError::not_found(locator.to_string()))?;

        let mut state = self.wheel.state.lock();
        if state.held {
            return Err(DeviceError::busy(info.name.clone()));
        }
        state.held = true;
        state.closed = false;
        drop(state);

        Ok(Box::new(self.wheel.device()))
    }
}

#[cfg(test)]
mod tests {
    use ffbsim_ffb::{EffectDefinition, EffectKind, ForceScale, Waveform};
    use ffbsim_test_helpers::prelude::*;

    use super::*;

    fn sine() -> NativeEffect {
        ForceScale::polled().build(&EffectDefinition::new(
            "Sine",
            EffectKind::periodic(Waveform::Sine, 0.6, 200),
        ))
    }

    #[test]
    fn test_polled_effect_created_unacquired_needs_download() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let mut device = wheel.device();
        let handle = device.create_effect(&sine())?;
        assert!(!wheel.is_downloaded(handle));

        device.acquire()?;
        assert_eq!(
            device.start(handle),
            Err(DeviceError::NotDownloaded { handle: handle.0 })
        );
        device.download(handle)?;
        device.start(handle)?;
        assert_eq!(wheel.playing_handles(), vec![handle]);
        Ok(())
    }

    #[test]
    fn test_resident_model_uploads_immediately() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let mut device = wheel.device();
        let handle = device.create_effect(&sine())?;
        assert!(wheel.is_downloaded(handle));
        device.start(handle)?;
        assert!(wheel.is_playing(handle));
        Ok(())
    }

    #[test]
    fn test_revoke_stops_effects_and_blocks_acquire() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let mut device = wheel.device();
        device.acquire()?;
        let handle = device.create_effect(&sine())?;
        device.start(handle)?;

        wheel.revoke_ownership();
        assert!(wheel.playing_handles().is_empty());
        assert_eq!(device.acquire(), Err(DeviceError::OwnershipLost));
        assert_eq!(device.poll(), Err(DeviceError::OwnershipLost));

        wheel.restore_ownership();
        device.acquire()?;
        assert!(device.poll().is_ok());
        Ok(())
    }

    #[test]
    fn test_rejected_and_unsupported() {
        let wheel = VirtualWheelControl::new(DeviceInfo {
            supported_effects: vec![EffectType::Constant],
            ..VirtualWheelControl::sidewinder().info()
        });
        wheel.reject(EffectType::Constant);
        let mut device = wheel.device();

        let constant = ForceScale::polled().build(&EffectDefinition::new("C", EffectKind::constant(1.0)));
        assert!(matches!(
            device.create_effect(&constant),
            Err(DeviceError::Rejected { .. })
        ));
        assert!(matches!(
            device.create_effect(&sine()),
            Err(DeviceError::Unsupported { .. })
        ));
        assert_eq!(wheel.resident_count(), 0);
    }

    #[test]
    fn test_update_rejects_mismatched_block() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let mut device = wheel.device();
        let handle = device.create_effect(&sine())?;
        let result = device.update(handle, &TypeParams::Constant { magnitude: 5 });
        assert!(matches!(result, Err(DeviceError::Rejected { .. })));
        assert_eq!(wheel.update_count(handle), 0);
        Ok(())
    }

    #[test]
    fn test_closed_device_refuses_everything() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let mut device = wheel.device();
        let handle = device.create_effect(&sine())?;
        device.close()?;
        assert_eq!(device.start(handle), Err(DeviceError::Closed));
        assert_eq!(device.close(), Err(DeviceError::Closed));
        assert!(wheel.is_closed());
        Ok(())
    }

    #[test]
    fn test_provider_busy_and_not_found() {
        let wheel = VirtualWheelControl::sidewinder();
        let provider = wheel.provider();
        assert!(matches!(
            provider.open(&DeviceLocator::by_ids(0x046D, 0xC24F)),
            Err(DeviceError::NotFound(_))
        ));
        wheel.hold();
        assert!(matches!(
            provider.open(&DeviceLocator::default()),
            Err(DeviceError::Busy(_))
        ));
    }

    #[test]
    fn test_failing_stop_keeps_effect_playing() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let mut device = wheel.device();
        let handle = device.create_effect(&sine())?;
        device.start(handle)?;
        wheel.fail_stop_commands(true);
        assert!(matches!(
            device.stop(handle),
            Err(DeviceError::Communication { .. })
        ));
        assert!(wheel.is_playing(handle));
        Ok(())
    }
}
