use anyhow::{Context, Result};
use scribe_engine::ProcessingController;
use scribe_storage::{FileLicense, TRIAL_DAYS};

use crate::cli::LicenseCommands;

pub fn handle(cmd: LicenseCommands, controller: &mut ProcessingController) -> Result<()> {
    match cmd {
        LicenseCommands::Status => status(controller),
        LicenseCommands::Trial => trial(controller),
        LicenseCommands::Activate { key } => activate(&key),
        LicenseCommands::Upgrade => upgrade(controller),
    }
}

fn status(controller: &ProcessingController) -> Result<()> {
    let info = controller.get_licensing_info();

    println!("License: {}", info.license_status);
    println!("  Premium: {}", if info.premium_licensed { "yes" } else { "no" });
    if let Some(days) = info.trial_days_remaining {
        println!("  Trial days remaining: {}", days);
    }
    println!("  File: {}", FileLicense::default_path().display());

    Ok(())
}

fn trial(controller: &mut ProcessingController) -> Result<()> {
    if !controller.start_trial() {
        let info = controller.get_licensing_info();
        anyhow::bail!(
            "Trial not started (license is {}); a trial can only be started once",
            info.license_status
        );
    }

    let info = controller.get_licensing_info();
    println!("✓ Started premium trial");
    if let Some(days) = info.trial_days_remaining {
        println!("  Days remaining: {}", days);
    }

    Ok(())
}

fn activate(key: &str) -> Result<()> {
    let mut license = FileLicense::open_default()?;
    license
        .activate(key)
        .context("License key was not accepted")?;

    println!("✓ License activated");
    println!("  Status: {}", license.status());

    Ok(())
}

fn upgrade(controller: &ProcessingController) -> Result<()> {
    let info = controller.get_upgrade_info();

    println!("Current license: {}", info.current_status);
    println!("Premium features:");
    for feature in &info.premium_features {
        println!("  - {}", feature);
    }
    if !info.current_status.is_premium() {
        println!();
        println!("Start a {}-day trial with: scribe license trial", TRIAL_DAYS);
    }

    Ok(())
}
