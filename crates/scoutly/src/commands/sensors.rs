//! Sensor command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use scoutly_core::{BinarySensor, Bridge, DeviceId, SemanticClass};

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output;

// ── Serializable view ───────────────────────────────────────────────

/// Snapshot of one sensor's externally visible state.
#[derive(Serialize)]
struct SensorView {
    id: DeviceId,
    name: String,
    class: SemanticClass,
    active: bool,
    available: bool,
    attribution: &'static str,
    device_type: String,
    battery_low: bool,
    manufacturer: Option<String>,
    model: Option<String>,
    sw_version: Option<String>,
}

impl From<&Arc<BinarySensor>> for SensorView {
    fn from(s: &Arc<BinarySensor>) -> Self {
        let attrs = s.attributes();
        let info = s.device_info();
        Self {
            id: s.id().clone(),
            name: s.name(),
            class: s.semantic_class(),
            active: s.is_active(),
            available: s.is_available(),
            attribution: attrs.attribution,
            device_type: attrs.device_type,
            battery_low: attrs.battery_low,
            manufacturer: info.manufacturer,
            model: info.model,
            sw_version: info.sw_version,
        }
    }
}

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SensorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Battery")]
    battery: String,
}

fn to_row(v: &SensorView, color: bool) -> SensorRow {
    SensorRow {
        id: v.id.to_string(),
        name: v.name.clone(),
        class: v.class.to_string(),
        state: output::state_label(v.active, color),
        available: if v.available { "yes" } else { "no" }.into(),
        battery: if v.battery_low { "low" } else { "ok" }.into(),
    }
}

fn detail(v: &SensorView) -> String {
    let mut lines = vec![
        format!("ID:           {}", v.id),
        format!("Name:         {}", v.name),
        format!("Class:        {}", v.class),
        format!("State:        {}", if v.active { "on" } else { "off" }),
        format!("Available:    {}", if v.available { "yes" } else { "no" }),
        format!("Battery low:  {}", v.battery_low),
        format!("Device type:  {}", v.device_type),
        format!("Attribution:  {}", v.attribution),
    ];
    if let Some(ref m) = v.manufacturer {
        lines.push(format!("Manufacturer: {m}"));
    }
    if let Some(ref m) = v.model {
        lines.push(format!("Model:        {m}"));
    }
    if let Some(ref fw) = v.sw_version {
        lines.push(format!("Firmware:     {fw}"));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(bridge: &Bridge, args: SensorsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        SensorsCommand::List { active } => {
            let snapshot = bridge.sensors();
            let mut views: Vec<SensorView> = snapshot.iter().map(SensorView::from).collect();
            if active {
                views.retain(|v| v.active);
            }
            views.sort_by(|a, b| a.name.cmp(&b.name));

            let out = output::render_list(
                &global.output,
                &views,
                |v| to_row(v, color),
                |v| v.id.to_string(),
            );
            output::print_output(&out, global.quiet);
        }

        SensorsCommand::Show { id, fresh } => {
            let device_id = DeviceId::from(id.as_str());
            let sensor = bridge.sensor(&device_id).ok_or_else(|| CliError::NotFound {
                resource_type: "sensor".into(),
                identifier: id,
                list_command: "sensors list".into(),
            })?;

            if fresh {
                let directory = bridge.directory().await?;
                sensor.refresh(directory.as_ref()).await?;
            }

            let view = SensorView::from(&sensor);
            let out = output::render_single(&global.output, &view, detail, |v| v.id.to_string());
            output::print_output(&out, global.quiet);
        }
    }

    Ok(())
}
