//! Device command handlers.
//!
//! Operates on raw device records from the directory, so unsupported
//! device types (hubs, keypads) show up here even though they never
//! become sensors.

use tabled::Tabled;

use scoutly_core::{Bridge, Device, DeviceDirectory, DeviceId, TriggerState};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    vendor_type: String,
    #[tabled(rename = "Trigger")]
    trigger: String,
    #[tabled(rename = "Available")]
    available: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone().unwrap_or_default(),
            vendor_type: d.vendor_type.clone(),
            trigger: trigger_summary(d),
            available: if d.is_available() { "yes" } else { "no" }.into(),
        }
    }
}

fn trigger_summary(d: &Device) -> String {
    match d.reported.as_ref().and_then(|r| r.trigger.as_ref()) {
        None => "-".into(),
        Some(TriggerState::Simple(state)) => state.clone(),
        Some(TriggerState::SmokeCo { smoke, co }) => {
            format!("smoke={smoke} co={}", co.as_deref().unwrap_or("ok"))
        }
    }
}

fn detail(d: &Device) -> String {
    let reported = d.reported.as_ref();
    let mut lines = vec![
        format!("ID:           {}", d.id),
        format!("Name:         {}", d.name.as_deref().unwrap_or("-")),
        format!("Type:         {}", d.vendor_type),
        format!("Trigger:      {}", trigger_summary(d)),
        format!("Available:    {}", if d.is_available() { "yes" } else { "no" }),
        format!("Battery low:  {}", d.battery_low()),
    ];
    if let Some(r) = reported {
        if let Some(ref m) = r.manufacturer {
            lines.push(format!("Manufacturer: {m}"));
        }
        if let Some(ref m) = r.model {
            lines.push(format!("Model:        {m}"));
        }
        if let Some(ref fw) = r.fw_version {
            lines.push(format!("Firmware:     {fw}"));
        }
    }
    lines.push(format!("Fetched:      {}", d.fetched_at.to_rfc3339()));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(bridge: &Bridge, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let directory = bridge.directory().await?;

    match args.command {
        DevicesCommand::List => {
            let devices = directory.list_devices().await?;
            // Closure, not the `DeviceRow::from` fn item -- the fn item
            // is not general enough for the for<'a> Fn bound.
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        DevicesCommand::Show { id } => {
            let device = directory.get_device(&DeviceId::from(id.as_str())).await?;
            let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
        }
    }

    Ok(())
}
