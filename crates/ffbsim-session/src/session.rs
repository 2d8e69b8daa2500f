//! Device session: ownership, effect registration and playback
//!
//! All foreground calls take `&self` and finish with bounded native-call
//! latency. The catalog and tuning sit behind one mutex; the device sits
//! behind another owned by [`DeviceLink`]. Locks are always taken in that
//! order, and the poller only ever takes the device lock.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use ffbsim_errors::{
    CatalogError, DeviceError, DeviceResult, ErrorClass, FfbSimError, InitError, PlayError,
};
use ffbsim_ffb::{EffectDefinition, EffectDuration, ForceScale};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::catalog::{CatalogEntry, EffectCatalog};
use crate::config::SessionConfig;
use crate::device::{DeviceInfo, DeviceLocator, DeviceProvider, DeviceSample, EffectHandle};
use crate::link::DeviceLink;
use crate::poller::PollingLoop;
use crate::state::AcquisitionState;
use crate::tuning::{Tuning, format_buttons, format_direction};

/// An effect definition left out of the catalog at startup
#[derive(Debug)]
pub struct RegistrationWarning {
    pub effect: String,
    pub error: FfbSimError,
}

impl RegistrationWarning {
    /// A dropped definition never aborts the session.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Degraded
    }
}

impl fmt::Display for RegistrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.effect, self.error)
    }
}

/// Outcome of catalog construction
#[derive(Debug, Default)]
pub struct InitReport {
    pub registered: usize,
    pub warnings: Vec<RegistrationWarning>,
}

impl InitReport {
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Point-in-time view for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub state: AcquisitionState,
    pub acquired: bool,
    pub axis: i32,
    pub pedals: (i32, i32),
    pub buttons: u32,
    pub current_effect: Option<String>,
    pub current_index: Option<usize>,
    pub effect_count: usize,
    /// Whether the selected effect is the one playing
    pub playing: bool,
    pub playing_effect: Option<String>,
    pub intensity: f32,
    pub intensity_raw: i32,
    pub direction: f32,
    pub direction_raw: i32,
    pub duration: EffectDuration,
    pub platform_max: i32,
}

impl SessionSnapshot {
    /// e.g. `6500 (65.0%)`
    pub fn intensity_display(&self) -> String {
        ForceScale::new(self.platform_max).format_force(self.intensity_raw)
    }

    pub fn direction_display(&self) -> String {
        format_direction(self.direction_raw)
    }

    pub fn buttons_display(&self) -> String {
        format_buttons(self.buttons)
    }
}

struct Control {
    catalog: EffectCatalog,
    tuning: Tuning,
    /// `DeviceLink::losses` when the playing slot was last checked
    losses_seen: u64,
}

/// An opened force-feedback device with its effect catalog.
///
/// Dropping the session closes it.
pub struct DeviceSession {
    link: Arc<DeviceLink>,
    control: Mutex<Control>,
    force: ForceScale,
    config: SessionConfig,
    info: DeviceInfo,
    poller: Mutex<Option<PollingLoop>>,
    autocenter_disabled: AtomicBool,
    closed: AtomicBool,
}

impl DeviceSession {
    /// Validates `config`, opens the device and builds the catalog, then
    /// starts the polling loop.
    ///
    /// Definitions the device refuses are dropped and reported in the
    /// [`InitReport`]. A failed first acquisition is left to the poller.
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, no device matches, the
    /// device is busy or cannot be configured, or no definition registers.
    pub fn initialize(
        provider: &dyn DeviceProvider,
        locator: &DeviceLocator,
        config: SessionConfig,
    ) -> Result<(Self, InitReport), InitError> {
        let session = Self::open(provider, locator, config)?;

        if let Err(err) = session.acquire() {
            info!(error = %err, "Initial acquire failed; polling loop will retry");
        }

        let report = session.register_all(session.config.effect_definitions());
        if report.registered == 0 {
            error!(rejected = report.warnings.len(), "No effect could be registered");
            session.close();
            return Err(InitError::EmptyCatalog {
                rejected: report.warnings.len(),
            });
        }

        session.start_polling().map_err(InitError::from_device)?;
        info!(
            registered = report.registered,
            dropped = report.warnings.len(),
            "Device session ready"
        );
        Ok((session, report))
    }

    /// Opens and configures the device without registering effects or
    /// starting the poller.
    ///
    /// # Errors
    ///
    /// See [`DeviceSession::initialize`].
    pub fn open(
        provider: &dyn DeviceProvider,
        locator: &DeviceLocator,
        config: SessionConfig,
    ) -> Result<Self, InitError> {
        config
            .validate()
            .map_err(|e| InitError::InvalidConfig(e.to_string()))?;

        debug!(locator = %locator, "Opening force-feedback device");
        let mut device = provider.open(locator).map_err(InitError::from_device)?;
        let info = device.info().clone();
        if let Err(invalid) = config.validate_for(info.model) {
            if let Err(err) = device.close() {
                debug!(error = %err, "Close after rejected config failed");
            }
            return Err(InitError::InvalidConfig(invalid.to_string()));
        }
        let force = config.force_scale(info.model);
        info!(
            name = %info.name,
            path = %info.path,
            ids = %info.ids(),
            model = %info.model,
            max_effects = info.max_effects,
            platform_max = force.platform_max(),
            "Opened force-feedback device"
        );

        let session = Self {
            link: Arc::new(DeviceLink::new(device)),
            control: Mutex::new(Control {
                catalog: EffectCatalog::new(),
                tuning: Tuning::from_config(&config),
                losses_seen: 0,
            }),
            force,
            config,
            info,
            poller: Mutex::new(None),
            autocenter_disabled: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        };

        let configured = session.link.device().configure();
        configured.map_err(InitError::from_device)?;

        if session.config.disable_autocenter {
            let disabled = session.link.device().set_autocenter(false);
            match disabled {
                Ok(()) => session.autocenter_disabled.store(true, Ordering::Release),
                Err(err) => warn!(error = %err, "Could not disable autocenter"),
            }
        }

        Ok(session)
    }

    /// Locks the catalog and tuning. A loss recorded since the last lock
    /// clears the playing slot, since the device already stopped everything.
    fn control(&self) -> MutexGuard<'_, Control> {
        let mut control = self.control.lock();
        let losses = self.link.losses();
        if control.losses_seen != losses {
            control.losses_seen = losses;
            if let Some(entry) = control.catalog.playing_entry() {
                debug!(effect = %entry.name(), "Playing effect cleared after ownership loss");
            }
            control.catalog.clear_playing();
        }
        control
    }

    /// Tries to take ownership now. Failure is not escalated; the poller
    /// keeps retrying.
    pub fn acquire(&self) -> DeviceResult {
        if self.is_closed() {
            return Err(DeviceError::Closed);
        }
        self.link.acquire()
    }

    /// Spawns the polling loop if it is not running.
    pub fn start_polling(&self) -> DeviceResult {
        if self.is_closed() {
            return Err(DeviceError::Closed);
        }
        let mut poller = self.poller.lock();
        if poller.is_none() {
            let started = PollingLoop::start(Arc::clone(&self.link), self.config.poll_interval())
                .map_err(|e| DeviceError::from_io("spawn polling thread", &e))?;
            *poller = Some(started);
        }
        Ok(())
    }

    fn register_all(&self, definitions: Vec<EffectDefinition>) -> InitReport {
        let mut report = InitReport::default();
        for definition in definitions {
            let name = definition.name.clone();
            match self.register_effect(definition) {
                Ok(_) => report.registered += 1,
                Err(error) => {
                    warn!(effect = %name, error = %error, "Effect dropped from catalog");
                    report.warnings.push(RegistrationWarning {
                        effect: name,
                        error,
                    });
                }
            }
        }
        report
    }

    /// Builds native parameters, allocates the effect on the device and
    /// appends it to the catalog.
    ///
    /// # Errors
    ///
    /// Invalid definitions, duplicate names, and device refusals
    /// (`Rejected`, `Unsupported`) are returned; nothing is added.
    pub fn register_effect(&self, definition: EffectDefinition) -> Result<EffectHandle, FfbSimError> {
        if self.is_closed() {
            return Err(DeviceError::Closed.into());
        }
        definition.validate()?;

        let mut control = self.control();
        if control.catalog.position(&definition.name).is_some() {
            return Err(CatalogError::DuplicateName(definition.name).into());
        }

        let native = self.force.build(&definition);
        let created = self.link.device().create_effect(&native);
        let handle = match created {
            Ok(handle) => handle,
            Err(err) => {
                if err.is_ownership_loss() {
                    self.link.mark_lost();
                }
                return Err(err.into());
            }
        };
        debug!(
            effect = %definition.name,
            kind = %definition.effect_type(),
            handle = %handle,
            "Effect registered"
        );
        control.catalog.add_resident(definition, handle)?;
        Ok(handle)
    }

    /// Stops everything, then starts `handle`.
    ///
    /// An effect that is not downloaded is downloaded once and started
    /// again. Lost ownership marks the session `Lost` and returns
    /// [`PlayError::Lost`] without retrying.
    ///
    /// # Errors
    ///
    /// Returns `Lost`, `PlayFailed`, `UnknownEffect` or `Closed`.
    pub fn play(&self, handle: EffectHandle) -> Result<(), PlayError> {
        self.ensure_open()?;
        let mut control = self.control();
        self.play_locked(&mut control, handle)
    }

    fn play_locked(&self, control: &mut Control, handle: EffectHandle) -> Result<(), PlayError> {
        let index = control
            .catalog
            .position_of_handle(handle)
            .ok_or(PlayError::UnknownEffect(handle.0))?;
        let name = control
            .catalog
            .entry(index)
            .map(|e| e.name().to_string())
            .ok_or(PlayError::UnknownEffect(handle.0))?;

        self.stop_all_locked(control);

        match self.start_with_download(handle) {
            Ok(()) => {
                control.catalog.mark_playing(index);
                info!(effect = %name, handle = %handle, "Effect playing");
                Ok(())
            }
            Err(err) if err.is_ownership_loss() => {
                self.link.mark_lost();
                warn!(effect = %name, error = %err, "Play refused: device ownership lost");
                Err(PlayError::Lost)
            }
            Err(err) => {
                warn!(effect = %name, error = %err, "Play failed");
                Err(PlayError::failed(name, err))
            }
        }
    }

    fn start_with_download(&self, handle: EffectHandle) -> DeviceResult {
        let mut device = self.link.device();
        match device.start(handle) {
            Err(DeviceError::NotDownloaded { .. }) => {
                debug!(handle = %handle, "Effect not downloaded; downloading and retrying once");
                device.download(handle)?;
                device.start(handle)
            }
            other => other,
        }
    }

    /// Stops `handle`. Device failures are logged, never returned.
    pub fn stop(&self, handle: EffectHandle) {
        let mut control = self.control();
        self.stop_locked(&mut control, handle);
    }

    fn stop_locked(&self, control: &mut Control, handle: EffectHandle) {
        let stopped = self.link.device().stop(handle);
        if let Err(err) = stopped {
            warn!(handle = %handle, error = %err, "Stop command failed; ignored");
        }
        if let Some(index) = control.catalog.position_of_handle(handle) {
            control.catalog.mark_stopped(index);
        }
    }

    /// Stops every resident effect. Never fails.
    pub fn stop_all(&self) {
        let mut control = self.control();
        self.stop_all_locked(&mut control);
    }

    fn stop_all_locked(&self, control: &mut Control) {
        let handles = control.catalog.resident_handles();
        let mut device = self.link.device();
        for handle in handles {
            if let Err(err) = device.stop(handle) {
                debug!(handle = %handle, error = %err, "Stop command failed; ignored");
            }
        }
        control.catalog.clear_playing();
    }

    /// Pushes a new level to a Constant or Periodic effect without
    /// restarting it. Ramp and Condition effects are left untouched and the
    /// call succeeds.
    ///
    /// # Errors
    ///
    /// Returns `Lost`, `UpdateFailed`, `UnknownEffect` or `Closed`.
    pub fn update_intensity(&self, handle: EffectHandle, intensity: f32) -> Result<(), PlayError> {
        self.ensure_open()?;
        let control = self.control();
        let entry = control
            .catalog
            .position_of_handle(handle)
            .and_then(|i| control.catalog.entry(i))
            .ok_or(PlayError::UnknownEffect(handle.0))?;
        self.update_entry(entry, handle, intensity)
    }

    fn update_entry(
        &self,
        entry: &CatalogEntry,
        handle: EffectHandle,
        intensity: f32,
    ) -> Result<(), PlayError> {
        let Some(params) = self.force.intensity_params(&entry.definition.kind, intensity) else {
            debug!(effect = %entry.name(), "Live intensity update not applicable; skipped");
            return Ok(());
        };
        let updated = self.link.device().update(handle, &params);
        match updated {
            Ok(()) => {
                debug!(effect = %entry.name(), intensity, "Intensity updated");
                Ok(())
            }
            Err(err) if err.is_ownership_loss() => {
                self.link.mark_lost();
                Err(PlayError::Lost)
            }
            Err(err) => Err(PlayError::UpdateFailed {
                effect: entry.name().to_string(),
                source: err,
            }),
        }
    }

    /// Stops the playing effect, then moves the cursor forward. Returns the
    /// newly selected name.
    pub fn select_next(&self) -> Option<String> {
        self.select(EffectCatalog::advance)
    }

    /// Stops the playing effect, then moves the cursor backward.
    pub fn select_previous(&self) -> Option<String> {
        self.select(EffectCatalog::retreat)
    }

    fn select(&self, step: fn(&mut EffectCatalog)) -> Option<String> {
        let mut control = self.control();
        if let Some(handle) = control.catalog.playing_entry().and_then(|e| e.handle) {
            self.stop_locked(&mut control, handle);
        }
        step(&mut control.catalog);
        let name = control.catalog.current().ok().map(|d| d.name.clone());
        debug!(effect = ?name, "Selection changed");
        name
    }

    /// Plays the effect under the cursor.
    ///
    /// # Errors
    ///
    /// As [`DeviceSession::play`], plus `EmptyCatalog`.
    pub fn play_selected(&self) -> Result<(), PlayError> {
        self.ensure_open()?;
        let mut control = self.control();
        let handle = Self::selected_handle(&control)?;
        self.play_locked(&mut control, handle)
    }

    pub fn stop_selected(&self) {
        let mut control = self.control();
        if let Ok(handle) = Self::selected_handle(&control) {
            self.stop_locked(&mut control, handle);
        }
    }

    /// Stops the selected effect if it is playing, plays it otherwise.
    /// Returns whether it is playing afterwards.
    ///
    /// # Errors
    ///
    /// As [`DeviceSession::play_selected`].
    pub fn toggle_selected(&self) -> Result<bool, PlayError> {
        self.ensure_open()?;
        let mut control = self.control();
        let handle = Self::selected_handle(&control)?;
        let playing = control
            .catalog
            .current_index()
            .is_some_and(|i| control.catalog.is_playing(i));
        if playing {
            self.stop_locked(&mut control, handle);
            Ok(false)
        } else {
            self.play_locked(&mut control, handle).map(|()| true)
        }
    }

    fn selected_handle(control: &Control) -> Result<EffectHandle, PlayError> {
        let entry = control.catalog.current_entry()?;
        // Only close() detaches handles.
        entry.handle.ok_or(PlayError::Closed)
    }

    /// Changes the session intensity and, when the selected effect is
    /// playing and takes live updates, pushes it. Returns the new value.
    pub fn adjust_intensity(&self, delta: f32) -> f32 {
        let mut control = self.control();
        let intensity = control.tuning.adjust_intensity(delta);
        debug!(intensity, raw = self.force.scale(intensity), "Intensity adjusted");

        let playing_selected = control
            .catalog
            .current_index()
            .filter(|i| control.catalog.is_playing(*i))
            .and_then(|i| control.catalog.entry(i));
        if let Some(entry) = playing_selected {
            if let Some(handle) = entry.handle {
                if let Err(err) = self.update_entry(entry, handle, intensity) {
                    warn!(effect = %entry.name(), error = %err, "Live intensity update failed");
                }
            }
        }
        intensity
    }

    /// Session-level only; never pushed to a resident effect.
    pub fn adjust_duration(&self, delta_ms: i32) -> EffectDuration {
        let duration = self.control().tuning.adjust_duration(delta_ms);
        debug!(duration = %duration, "Duration adjusted");
        duration
    }

    /// Session-level only; never pushed to a resident effect.
    pub fn adjust_direction(&self, delta: f32) -> f32 {
        let direction = self.control().tuning.adjust_direction(delta);
        debug!(direction, "Direction adjusted");
        direction
    }

    pub fn list_effect_names(&self) -> Vec<String> {
        self.control().catalog.names()
    }

    pub fn effect_count(&self) -> usize {
        self.control().catalog.len()
    }

    /// Handle registered under `name`.
    pub fn handle_of(&self, name: &str) -> Option<EffectHandle> {
        let control = self.control();
        control
            .catalog
            .position(name)
            .and_then(|i| control.catalog.entry(i))
            .and_then(|e| e.handle)
    }

    pub fn playing_handle(&self) -> Option<EffectHandle> {
        self.control().catalog.playing_entry().and_then(|e| e.handle)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let control = self.control();
        let catalog = &control.catalog;
        let tuning = &control.tuning;
        let sample: DeviceSample = self.link.sample();
        let state = self.link.state();
        let current_index = catalog.current_index();

        SessionSnapshot {
            state,
            acquired: state == AcquisitionState::Acquired,
            axis: sample.axis,
            pedals: sample.pedals,
            buttons: sample.buttons,
            current_effect: catalog.current().ok().map(|d| d.name.clone()),
            current_index,
            effect_count: catalog.len(),
            playing: current_index.is_some_and(|i| catalog.is_playing(i)),
            playing_effect: catalog.playing_entry().map(|e| e.name().to_string()),
            intensity: tuning.intensity(),
            intensity_raw: self.force.scale(tuning.intensity()),
            direction: tuning.direction(),
            direction_raw: self.force.scale(tuning.direction()),
            duration: tuning.duration(),
            platform_max: self.force.platform_max(),
        }
    }

    pub fn state(&self) -> AcquisitionState {
        self.link.state()
    }

    pub fn sample(&self) -> DeviceSample {
        self.link.sample()
    }

    /// Completed polling ticks.
    pub fn poll_ticks(&self) -> u64 {
        self.link.ticks()
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn force_scale(&self) -> ForceScale {
        self.force
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), PlayError> {
        if self.is_closed() {
            Err(PlayError::Closed)
        } else {
            Ok(())
        }
    }

    /// Stops the poller, stops and removes every effect, restores
    /// autocenter and releases the device. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(device = %self.info.name, "Closing device session");

        // The poller must be joined before the device is released.
        let poller = self.poller.lock().take();
        if let Some(mut poller) = poller {
            poller.stop();
        }

        let mut control = self.control();
        let mut device = self.link.device();
        for handle in control.catalog.resident_handles() {
            if let Err(err) = device.stop(handle) {
                debug!(handle = %handle, error = %err, "Stop during close failed");
            }
        }
        let handles = control.catalog.take_handles();
        let removed = handles.len();
        for handle in handles {
            if let Err(err) = device.remove(handle) {
                warn!(handle = %handle, error = %err, "Failed to remove effect");
            }
        }

        if self.autocenter_disabled.swap(false, Ordering::AcqRel) {
            if let Err(err) = device.set_autocenter(true) {
                warn!(error = %err, "Failed to restore autocenter");
            }
        }
        if let Err(err) = device.unacquire() {
            debug!(error = %err, "Unacquire during close failed");
        }
        if let Err(err) = device.close() {
            warn!(error = %err, "Failed to close device");
        }
        drop(device);
        drop(control);

        self.link.set_state(AcquisitionState::Unacquired);
        info!(removed, "Device session closed");
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceSession")
            .field("device", &self.info.name)
            .field("state", &self.link.state())
            .field("platform_max", &self.force.platform_max())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ffbsim_ffb::{EffectKind, EffectType, Waveform};
    use ffbsim_test_helpers::prelude::*;
    use tracing_test::traced_test;

    use super::*;
    use crate::virtual_wheel::VirtualWheelControl;

    fn small_config() -> SessionConfig {
        SessionConfig {
            effects: Some(vec![
                EffectDefinition::new("Push", EffectKind::constant(0.8)),
                EffectDefinition::new("Buzz", EffectKind::periodic(Waveform::Sine, 0.6, 200)),
            ]),
            ..SessionConfig::default()
        }
    }

    #[test]
    #[traced_test]
    fn test_rejected_effect_logged_and_dropped() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        wheel.reject(EffectType::Sine);
        let (session, report) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;

        assert_eq!(report.registered, 1);
        assert_eq!(session.list_effect_names(), vec!["Push"]);
        assert!(logs_contain("Effect dropped from catalog"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_failing_stop_is_swallowed() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;
        let push = must_some(session.handle_of("Push"), "Push is registered");
        session.play(push)?;

        wheel.fail_stop_commands(true);
        session.stop(push);
        assert_eq!(session.playing_handle(), None);
        assert!(logs_contain("Stop command failed; ignored"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_close_is_idempotent() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;
        session.close();
        session.close();

        assert!(wheel.is_closed());
        assert_eq!(wheel.resident_count(), 0);
        assert!(logs_contain("Device session closed"));
        assert_eq!(session.play_selected(), Err(PlayError::Closed));
        Ok(())
    }

    #[test]
    fn test_invalid_config_rejected_before_open() {
        let wheel = VirtualWheelControl::sidewinder();
        let config = SessionConfig {
            poll_interval_ms: 0,
            ..SessionConfig::default()
        };
        let result = DeviceSession::open(&wheel.provider(), &DeviceLocator::default(), config);
        assert!(matches!(result, Err(InitError::InvalidConfig(_))));
        assert!(!wheel.is_configured());
    }

    #[test]
    fn test_resident_platform_max_beyond_16_bits_rejected() {
        let wheel = VirtualWheelControl::resident();
        let config = SessionConfig {
            platform_max: Some(65_535),
            ..SessionConfig::default()
        };
        let result = DeviceSession::open(&wheel.provider(), &DeviceLocator::default(), config);
        assert!(matches!(result, Err(InitError::InvalidConfig(ref reason)) if reason.contains("platform_max")));
        assert!(!wheel.is_configured());
        assert!(wheel.is_closed());
    }

    #[test]
    fn test_register_duplicate_name() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;
        let result = session.register_effect(EffectDefinition::new("Push", EffectKind::constant(0.1)));
        assert!(matches!(
            result,
            Err(FfbSimError::Catalog(CatalogError::DuplicateName(_)))
        ));
        assert_eq!(wheel.resident_count(), 2);
        Ok(())
    }

    #[test]
    fn test_autocenter_disabled_then_restored() -> TestResult {
        let wheel = VirtualWheelControl::resident();
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;
        assert!(!wheel.autocenter());
        drop(session);
        assert!(wheel.autocenter());
        Ok(())
    }

    #[test]
    fn test_snapshot_display_helpers() -> TestResult {
        let wheel = VirtualWheelControl::sidewinder();
        let (session, _) =
            DeviceSession::initialize(&wheel.provider(), &DeviceLocator::default(), small_config())?;
        session.adjust_direction(0.2);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.intensity_display(), "5000 (50.0%)");
        assert_eq!(snapshot.direction_display(), "Right (2000)");
        assert_eq!(snapshot.buttons_display(), "None");
        assert_eq!(snapshot.current_effect.as_deref(), Some("Push"));
        Ok(())
    }
}
