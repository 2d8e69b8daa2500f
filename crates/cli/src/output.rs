//! Output formatting for CLI responses and the interactive screens

use anyhow::Error;
use colored::*;
use ffbsim_session::{DeviceInfo, DeviceLocator, InitReport, SessionSnapshot};
use serde_json::json;

use crate::error::CliError;

const RULE: &str = "=====================================================";

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Troubleshooting steps for failures an operator can fix.
pub fn hints_for(error: &CliError, locator: &DeviceLocator) -> Vec<String> {
    match error {
        CliError::DeviceNotFound(_) => vec![
            format!("Make sure the wheel ({locator}) is plugged in"),
            "Check that the kernel driver is loaded (lsusb, dmesg)".to_string(),
            "Check read/write permission on /dev/input/event*".to_string(),
            "Run `ffbsim devices` to see what was found".to_string(),
        ],
        CliError::DeviceBusy(_) => {
            vec!["Close other programs using the wheel and try again".to_string()]
        }
        CliError::EmptyCatalog { .. } => vec![
            "The device refused every effect; run with -v and check the log file".to_string(),
        ],
        _ => Vec::new(),
    }
}

pub fn print_hints(error: &CliError, locator: &DeviceLocator) {
    let hints = hints_for(error, locator);
    if hints.is_empty() {
        return;
    }
    eprintln!();
    eprintln!("{}", "Check that:".bold());
    for (i, hint) in hints.iter().enumerate() {
        eprintln!("  {}. {hint}", i.saturating_add(1));
    }
}

/// Print device list in specified format
pub fn print_device_list(devices: &[DeviceInfo], json: bool) -> Result<(), CliError> {
    if json {
        let output = json!({
            "success": true,
            "devices": devices
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if devices.is_empty() {
        println!("{}", "No force-feedback devices found".yellow());
        return Ok(());
    }

    println!("{}", "Force-feedback devices:".bold());
    for device in devices {
        println!(
            "  {} {} ({})",
            "●".green(),
            device.name.bold(),
            device.path.dimmed()
        );
        println!("    Ids: {}", device.ids());
        println!("    Model: {}", device.model);
        println!("    Simultaneous effects: {}", device.max_effects);
        let families: Vec<String> = device
            .supported_effects
            .iter()
            .map(|t| format!("{t:?}"))
            .collect();
        println!("    Effects: {}", families.join(", "));
    }
    Ok(())
}

/// Summary printed once the session is ready.
pub fn print_init_report(info: &DeviceInfo, report: &InitReport) {
    println!("{} {} ({})", "Device:".bold(), info.name, info.path);
    println!(
        "{} {} registered, {} dropped",
        "Effects:".bold(),
        report.registered,
        report.warnings.len()
    );
    for warning in &report.warnings {
        println!("  {} {warning}", "!".yellow());
    }
}

/// Status screen lines, uncolored.
pub fn status_lines(info: &DeviceInfo, snapshot: &SessionSnapshot, names: &[String]) -> Vec<String> {
    let mut lines = vec![
        "=== FORCE FEEDBACK SIMULATOR ===".to_string(),
        RULE.to_string(),
        format!("Device: {} [{}]", info.name, snapshot.state),
        format!("Path: {}", info.path),
    ];
    if snapshot.acquired {
        lines.push(format!("Wheel position: {}", snapshot.axis));
        lines.push(format!(
            "Pedals: throttle={} brake={}",
            snapshot.pedals.0, snapshot.pedals.1
        ));
        lines.push(format!("Buttons: {}", snapshot.buttons_display()));
    }
    lines.push(RULE.to_string());

    if let (Some(index), Some(name)) = (snapshot.current_index, &snapshot.current_effect) {
        lines.push(format!(
            "Current effect: [{}/{}] {} {}",
            index.saturating_add(1),
            snapshot.effect_count,
            name,
            if snapshot.playing { "[PLAYING]" } else { "[STOPPED]" }
        ));
    }
    lines.push(format!("Intensity: {}", snapshot.intensity_display()));
    lines.push(format!("Direction: {}", snapshot.direction_display()));
    lines.push(format!("Duration: {}", snapshot.duration));
    lines.push(RULE.to_string());

    lines.push("Available effects:".to_string());
    for (i, name) in names.iter().enumerate() {
        let marker = if snapshot.current_index == Some(i) { "►" } else { " " };
        lines.push(format!("  {marker} {name}"));
    }
    lines.push(RULE.to_string());
    lines.push("Space play/stop  n/p next/prev  s stop all  h help  q quit".to_string());
    lines
}

pub fn help_lines(device_path: &str) -> Vec<String> {
    let mut lines: Vec<String> = [
        RULE,
        "         HELP - FORCE FEEDBACK SIMULATOR",
        RULE,
        "",
        "MAIN CONTROLS:",
        "  SPACE       Play/stop the current effect",
        "  N           Next effect",
        "  P           Previous effect",
        "  S           Stop all effects",
        "",
        "ADJUSTMENTS:",
        "  +  =        Increase intensity",
        "  -  _        Decrease intensity",
        "  ]  [        Longer / shorter duration",
        "  .  ,        Direction right / left",
        "",
        "NAVIGATION:",
        "  H           Toggle this help",
        "  ESC         Leave help, or quit",
        "  Q           Quit",
        "",
        "EFFECTS:",
        "  Constant    steady push in one direction",
        "  Periodic    rhythmic vibration",
        "  Ramp        force that builds up or fades",
        "  Condition   spring, damper, inertia, friction",
        "",
        "PERMISSIONS:",
    ]
    .iter()
    .map(|line| (*line).to_string())
    .collect();
    lines.push(format!("  If the device cannot be opened: sudo chmod 666 {device_path}"));
    lines.push("  or add your user to the 'input' group".to_string());
    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("   Press H or ESC to return".to_string());
    lines.push(RULE.to_string());
    lines
}

/// Applies screen styling: section headers bold, playing marker green.
pub fn styled(line: &str) -> String {
    if line.starts_with("===") {
        return line.cyan().to_string();
    }
    if line.ends_with(':') && !line.starts_with(' ') {
        return line.bold().to_string();
    }
    if line.ends_with("[PLAYING]") {
        return line.green().bold().to_string();
    }
    if line.starts_with("  ►") {
        return line.yellow().to_string();
    }
    line.to_string()
}
