//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{
    CampaignBlueprint, MessageTemplate, PlaceholderMode, SenderType, NAME_PLACEHOLDER,
};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<CampaignSummary>,
}

#[derive(Serialize)]
struct CampaignSummary {
    name: String,
    channel: &'static str,
    recipient_count: usize,
    batch_count: usize,
    sender: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating campaign");

    let result = validate_campaign(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Campaign validation failed")
    }
}

fn validate_campaign(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let loaded = config_loader::ConfigLoader::load_from_path(&args.config).and_then(|bp| {
        let template = bp.message_template()?;
        Ok((bp, template))
    });

    match loaded {
        Ok((blueprint, template)) => {
            let warnings = collect_warnings(&blueprint, &template);
            let recipient_count = blueprint.recipients.len();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(CampaignSummary {
                    name: blueprint.campaign.name.clone(),
                    channel: blueprint.campaign.channel.as_str(),
                    recipient_count,
                    batch_count: recipient_count.div_ceil(blueprint.dispatch.batch_size),
                    sender: blueprint.sender.name.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect campaign warnings (non-fatal issues)
fn collect_warnings(blueprint: &CampaignBlueprint, template: &MessageTemplate) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.sender.sender_type == SenderType::Log {
        warnings.push(format!(
            "Sender '{}' only logs messages - nothing will be delivered",
            blueprint.sender.name
        ));
    }

    if blueprint.dispatch.inter_batch_delay_ms == 0 && blueprint.recipients.len() > blueprint.dispatch.batch_size {
        warnings.push("dispatch.inter_batch_delay_ms is 0 - provider rate limits may be hit".to_string());
    }

    let occurrences = template.body.matches(NAME_PLACEHOLDER).count();
    if occurrences == 0 {
        warnings.push(format!(
            "Template body has no {NAME_PLACEHOLDER} placeholder - every recipient gets identical text"
        ));
    } else if occurrences > 1 && template.placeholder_mode == PlaceholderMode::First {
        warnings.push(format!(
            "Template body contains {NAME_PLACEHOLDER} {occurrences} times but only the first is replaced (placeholder_mode = \"first\")"
        ));
    }

    let mut unresolved = unresolved_placeholders(&template.body);
    if let Some(ref subject) = template.subject {
        for token in unresolved_placeholders(subject) {
            if !unresolved.contains(&token) {
                unresolved.push(token);
            }
        }
    }
    if !unresolved.is_empty() {
        warnings.push(format!(
            "Placeholders {} are sent verbatim",
            unresolved.join(", ")
        ));
    }

    let unnamed = blueprint
        .recipients
        .iter()
        .filter(|r| r.display_name.trim().is_empty())
        .count();
    if unnamed > 0 {
        warnings.push(format!(
            "{unnamed} recipient(s) have an empty display_name"
        ));
    }

    warnings
}

/// `{token}` occurrences other than `{name}`, in order of first appearance
fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(len) = after.find('}') else {
            break;
        };
        let inner = &after[..len];
        if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            let token = format!("{{{inner}}}");
            if token != NAME_PLACEHOLDER && !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        rest = &after[len + 1..];
    }

    tokens
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Campaign is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Campaign: {}", summary.name);
            println!("  Channel: {}", summary.channel);
            println!("  Recipients: {}", summary.recipient_count);
            println!("  Batches: {}", summary.batch_count);
            println!("  Sender: {}", summary.sender);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Campaign is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
