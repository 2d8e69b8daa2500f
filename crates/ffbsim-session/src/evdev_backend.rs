//! Linux evdev backend (resident effect table)
//!
//! Effects are uploaded into the kernel's per-device table on creation and
//! started by id. There is no exclusive ownership to acquire; a vanished
//! device (`ENODEV`) is reported as lost ownership so the poller keeps
//! retrying until the session is closed.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use evdev::{
    AbsoluteAxisType, AttributeSetRef, Device, EventType, FFCondition, FFEffect, FFEffectData,
    FFEffectKind, FFEffectType, FFEnvelope, FFReplay, FFTrigger, FFWaveform, InputEvent,
};
use ffbsim_errors::{DeviceError, DeviceResult};
use ffbsim_ffb::{
    ConditionType, EffectDuration, EffectType, Envelope, FULL_TURN_CENTIDEGREES, NativeEffect,
    TypeParams, Waveform,
};
use tracing::{debug, info, warn};

use crate::device::{
    DeviceInfo, DeviceLocator, DeviceModel, DeviceProvider, DeviceSample, EffectHandle,
    ForceFeedbackDevice,
};

const ENODEV: i32 = 19;
/// `FF_AUTOCENTER` event code
const FF_AUTOCENTER: u16 = 0x61;
const AUTOCENTER_ON: i32 = 0xFFFF;
/// First joystick button code (`BTN_JOYSTICK`)
const BTN_JOYSTICK: u16 = 0x120;

/// Maps the kernel's feature bits onto effect types.
fn supported_effects(ff: &AttributeSetRef<FFEffectType>) -> Vec<EffectType> {
    let periodic = ff.contains(FFEffectType::FF_PERIODIC);
    let table = [
        (FFEffectType::FF_CONSTANT, EffectType::Constant, true),
        (FFEffectType::FF_RAMP, EffectType::Ramp, true),
        (FFEffectType::FF_SQUARE, EffectType::Square, periodic),
        (FFEffectType::FF_SINE, EffectType::Sine, periodic),
        (FFEffectType::FF_TRIANGLE, EffectType::Triangle, periodic),
        (FFEffectType::FF_SAW_UP, EffectType::SawtoothUp, periodic),
        (FFEffectType::FF_SAW_DOWN, EffectType::SawtoothDown, periodic),
        (FFEffectType::FF_SPRING, EffectType::Spring, true),
        (FFEffectType::FF_DAMPER, EffectType::Damper, true),
        (FFEffectType::FF_INERTIA, EffectType::Inertia, true),
        (FFEffectType::FF_FRICTION, EffectType::Friction, true),
    ];
    table
        .into_iter()
        .filter(|(bit, _, gate)| *gate && ff.contains(*bit))
        .map(|(_, effect_type, _)| effect_type)
        .collect()
}

fn describe(path: &Path, device: &Device) -> Option<DeviceInfo> {
    let ff = device.supported_ff()?;
    let supported = supported_effects(ff);
    if supported.is_empty() {
        return None;
    }
    let id = device.input_id();
    Some(DeviceInfo {
        name: device.name().unwrap_or("Unnamed device").to_string(),
        path: path.display().to_string(),
        vendor_id: id.vendor(),
        product_id: id.product(),
        model: DeviceModel::ResidentTable,
        max_effects: device.max_ff_effects(),
        supported_effects: supported,
    })
}

fn map_io(operation: &str, err: &io::Error) -> DeviceError {
    if err.raw_os_error() == Some(ENODEV) {
        DeviceError::OwnershipLost
    } else {
        DeviceError::from_io(operation, err)
    }
}

fn to_i16(value: i32) -> i16 {
    i16::try_from(value.clamp(i32::from(i16::MIN), i32::from(i16::MAX))).unwrap_or_default()
}

fn to_u16(value: u32) -> u16 {
    u16::try_from(value.min(u32::from(u16::MAX))).unwrap_or(u16::MAX)
}

/// Hundredths of a degree to the kernel's 0..=0xFFFF turn.
fn angle_units(centidegrees: u32) -> u16 {
    let turn = u64::from(centidegrees % FULL_TURN_CENTIDEGREES);
    let units = turn * 0x1_0000 / u64::from(FULL_TURN_CENTIDEGREES);
    u16::try_from(units).unwrap_or(u16::MAX)
}

fn envelope(envelope: &Envelope) -> FFEnvelope {
    FFEnvelope {
        attack_length: to_u16(envelope.attack_length_ms),
        attack_level: to_u16(envelope.attack_level),
        fade_length: to_u16(envelope.fade_length_ms),
        fade_level: to_u16(envelope.fade_level),
    }
}

fn waveform(waveform: Waveform) -> FFWaveform {
    match waveform {
        Waveform::Sine => FFWaveform::Sine,
        Waveform::Square => FFWaveform::Square,
        Waveform::Triangle => FFWaveform::Triangle,
        Waveform::SawtoothUp => FFWaveform::SawUp,
        Waveform::SawtoothDown => FFWaveform::SawDown,
    }
}

fn kind(params: &TypeParams, env: FFEnvelope) -> FFEffectKind {
    match *params {
        TypeParams::Constant { magnitude } => FFEffectKind::Constant {
            level: to_i16(magnitude),
            envelope: env,
        },
        TypeParams::Periodic {
            waveform: shape,
            magnitude,
            offset,
            phase,
            period_us,
        } => FFEffectKind::Periodic {
            waveform: waveform(shape),
            period: to_u16(period_us / 1_000),
            magnitude: to_i16(i32::try_from(magnitude).unwrap_or(i32::MAX)),
            offset: to_i16(offset),
            phase: angle_units(phase),
            envelope: env,
        },
        TypeParams::Ramp { start, end } => FFEffectKind::Ramp {
            start_level: to_i16(start),
            end_level: to_i16(end),
            envelope: env,
        },
        TypeParams::Condition {
            condition,
            positive_coefficient,
            negative_coefficient,
            positive_saturation,
            negative_saturation,
            deadband,
            offset,
        } => {
            let axis = FFCondition {
                right_saturation: to_u16(positive_saturation),
                left_saturation: to_u16(negative_saturation),
                right_coefficient: to_i16(positive_coefficient),
                left_coefficient: to_i16(negative_coefficient),
                deadband: to_u16(deadband),
                center: to_i16(offset),
            };
            // The kernel takes no coefficients for damper and inertia.
            match condition {
                ConditionType::Spring => FFEffectKind::Spring {
                    condition: [axis, axis],
                },
                ConditionType::Friction => FFEffectKind::Friction {
                    condition: [axis, axis],
                },
                ConditionType::Damper => FFEffectKind::Damper,
                ConditionType::Inertia => FFEffectKind::Inertia,
            }
        }
    }
}

fn effect_data(effect: &NativeEffect) -> FFEffectData {
    let length = match effect.duration {
        EffectDuration::Infinite => 0,
        EffectDuration::Millis(ms) => to_u16(ms),
    };
    FFEffectData {
        direction: angle_units(effect.direction),
        trigger: FFTrigger::default(),
        replay: FFReplay { length, delay: 0 },
        kind: kind(&effect.params, envelope(&effect.envelope)),
    }
}

/// An opened evdev force-feedback device
pub struct EvdevWheel {
    info: DeviceInfo,
    device: Option<Device>,
    effects: HashMap<u32, (FFEffect, NativeEffect)>,
}

impl EvdevWheel {
    fn device(&mut self) -> DeviceResult<&mut Device> {
        self.device.as_mut().ok_or(DeviceError::Closed)
    }

    fn effect(&mut self, handle: EffectHandle) -> DeviceResult<&mut (FFEffect, NativeEffect)> {
        if self.device.is_none() {
            return Err(DeviceError::Closed);
        }
        let name = self.info.name.clone();
        self.effects.get_mut(&handle.0).ok_or_else(|| {
            DeviceError::communication(name, format!("unknown effect handle {handle}"))
        })
    }

    fn send_autocenter(&mut self, value: i32) -> DeviceResult {
        let event = InputEvent::new(EventType::FORCEFEEDBACK, FF_AUTOCENTER, value);
        self.device()?
            .send_events(&[event])
            .map_err(|e| map_io("set autocenter", &e))
    }
}

impl ForceFeedbackDevice for EvdevWheel {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn configure(&mut self) -> DeviceResult {
        // Nothing to negotiate; check the node still answers.
        self.device()?
            .get_abs_state()
            .map(|_| ())
            .map_err(|e| map_io("read axis state", &e))
    }

    fn acquire(&mut self) -> DeviceResult {
        self.configure()
    }

    fn unacquire(&mut self) -> DeviceResult {
        self.device().map(|_| ())
    }

    fn create_effect(&mut self, effect: &NativeEffect) -> DeviceResult<EffectHandle> {
        let effect_type = effect.effect_type();
        if !self.info.supports(effect_type) {
            return Err(DeviceError::unsupported(
                self.info.name.clone(),
                effect_type.label(),
            ));
        }
        let uploaded = self
            .device()?
            .upload_ff_effect(effect_data(effect))
            .map_err(|e| match e.raw_os_error() {
                Some(ENODEV) => DeviceError::OwnershipLost,
                _ => DeviceError::rejected(effect_type.label(), e.to_string()),
            })?;
        let handle = EffectHandle(u32::from(uploaded.id()));
        debug!(handle = %handle, effect = %effect_type, "Effect uploaded");
        self.effects.insert(handle.0, (uploaded, effect.clone()));
        Ok(handle)
    }

    fn download(&mut self, handle: EffectHandle) -> DeviceResult {
        // Uploaded on creation.
        self.effect(handle).map(|_| ())
    }

    fn start(&mut self, handle: EffectHandle) -> DeviceResult {
        let (effect, _) = self.effect(handle)?;
        effect.play(1).map_err(|e| map_io("start effect", &e))
    }

    fn stop(&mut self, handle: EffectHandle) -> DeviceResult {
        let (effect, _) = self.effect(handle)?;
        effect.stop().map_err(|e| map_io("stop effect", &e))
    }

    fn update(&mut self, handle: EffectHandle, params: &TypeParams) -> DeviceResult {
        let (effect, native) = self.effect(handle)?;
        let mut next = native.clone();
        next.params = *params;
        effect
            .update(effect_data(&next))
            .map_err(|e| map_io("update effect", &e))?;
        *native = next;
        Ok(())
    }

    fn remove(&mut self, handle: EffectHandle) -> DeviceResult {
        self.effect(handle)?;
        // Dropping the effect erases it from the kernel table.
        self.effects.remove(&handle.0);
        Ok(())
    }

    fn poll(&mut self) -> DeviceResult<DeviceSample> {
        let device = self.device()?;
        let abs = device
            .get_abs_state()
            .map_err(|e| map_io("read axis state", &e))?;
        let keys = device
            .get_key_state()
            .map_err(|e| map_io("read button state", &e))?;

        let axis_value = |axis: AbsoluteAxisType| abs.get(usize::from(axis.0)).map_or(0, |a| a.value);
        let buttons = keys
            .iter()
            .filter_map(|key| key.code().checked_sub(BTN_JOYSTICK))
            .filter(|bit| *bit < 32)
            .fold(0u32, |mask, bit| mask | (1 << bit));

        Ok(DeviceSample {
            axis: axis_value(AbsoluteAxisType::ABS_X),
            pedals: (
                axis_value(AbsoluteAxisType::ABS_Y),
                axis_value(AbsoluteAxisType::ABS_Z),
            ),
            buttons,
        })
    }

    fn set_autocenter(&mut self, enabled: bool) -> DeviceResult {
        self.send_autocenter(if enabled { AUTOCENTER_ON } else { 0 })
    }

    fn close(&mut self) -> DeviceResult {
        self.device()?;
        self.effects.clear();
        self.device = None;
        info!(path = %self.info.path, "evdev device closed");
        Ok(())
    }
}

/// Enumerates `/dev/input/event*` nodes with force-feedback support
#[derive(Debug, Clone, Copy, Default)]
pub struct EvdevProvider;

impl EvdevProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceProvider for EvdevProvider {
    fn list(&self) -> DeviceResult<Vec<DeviceInfo>> {
        let found: Vec<DeviceInfo> = evdev::enumerate()
            .filter_map(|(path, device)| describe(&path, &device))
            .collect();
        for info in &found {
            debug!(
                name = %info.name,
                path = %info.path,
                ids = %info.ids(),
                effects = info.supported_effects.len(),
                "Force-feedback candidate"
            );
        }
        Ok(found)
    }

    fn open(&self, locator: &DeviceLocator) -> DeviceResult<Box<dyn ForceFeedbackDevice>> {
        let path = match &locator.path {
            Some(path) => path.clone(),
            None => {
                let candidates = self.list()?;
                let chosen = locator
                    .select(&candidates)
                    .ok_or_else(|| DeviceError::not_found(locator.to_string()))?;
                PathBuf::from(&chosen.path)
            }
        };

        let device =
            Device::open(&path).map_err(|e| DeviceError::from_io(path.display().to_string(), &e))?;
        let Some(info) = describe(&path, &device) else {
            warn!(path = %path.display(), "Device has no usable force-feedback support");
            return Err(DeviceError::not_found(locator.to_string()));
        };

        Ok(Box::new(EvdevWheel {
            info,
            device: Some(device),
            effects: HashMap::new(),
        }))
    }
}
