//! `templates` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;

use contracts::{TemplatePreset, PRESETS};

use crate::cli::TemplatesArgs;

#[derive(Serialize)]
struct PresetInfo {
    id: &'static str,
    name: &'static str,
    channel: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'static str>,
    body: &'static str,
}

impl From<&TemplatePreset> for PresetInfo {
    fn from(preset: &TemplatePreset) -> Self {
        Self {
            id: preset.id,
            name: preset.name,
            channel: preset.channel.as_str(),
            subject: preset.subject,
            body: preset.body,
        }
    }
}

/// Execute the `templates` command
pub fn run_templates(args: &TemplatesArgs) -> Result<()> {
    if args.json {
        let presets: Vec<PresetInfo> = PRESETS.iter().map(PresetInfo::from).collect();
        let json =
            serde_json::to_string_pretty(&presets).context("Failed to serialize templates")?;
        println!("{}", json);
    } else {
        print_presets();
    }

    Ok(())
}

fn print_presets() {
    println!("📝 Built-in templates ({})\n", PRESETS.len());
    for preset in PRESETS {
        println!("{} [{}] - {}", preset.id, preset.channel.as_str(), preset.name);
        if let Some(subject) = preset.subject {
            println!("   Subject: {}", subject);
        }
        for line in preset.body.lines() {
            println!("   | {}", line);
        }
        println!();
    }
    println!("Use `preset = \"<id>\"` under [template] in a campaign file.");
}
