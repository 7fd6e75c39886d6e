//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{CampaignBlueprint, MessageTemplate, PlaceholderMode, SenderType};

use crate::cli::InfoArgs;

/// Campaign info for JSON output
#[derive(Serialize)]
struct CampaignInfo {
    version: String,
    campaign: CampaignSection,
    template: TemplateInfo,
    dispatch: DispatchInfo,
    sender: SenderInfo,
    recipient_count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    recipients: Vec<RecipientInfo>,
}

#[derive(Serialize)]
struct CampaignSection {
    name: String,
    channel: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
}

#[derive(Serialize)]
struct TemplateInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    preset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    body: String,
    placeholder_mode: PlaceholderMode,
}

#[derive(Serialize)]
struct DispatchInfo {
    batch_size: usize,
    inter_batch_delay_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_timeout_ms: Option<u64>,
    batch_count: usize,
    min_duration_ms: u64,
}

#[derive(Serialize)]
struct SenderInfo {
    name: String,
    sender_type: SenderType,
    /// Only keys: values may hold credentials
    param_keys: Vec<String>,
}

#[derive(Serialize)]
struct RecipientInfo {
    address: String,
    display_name: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading campaign info");

    if !args.config.exists() {
        anyhow::bail!("Campaign file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load campaign from {}", args.config.display()))?;
    let template = blueprint.message_template()?;

    let info = build_campaign_info(&blueprint, &template, args.recipients);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize campaign info")?;
        println!("{}", json);
    } else {
        print_campaign_info(&info);
    }

    Ok(())
}

fn build_campaign_info(
    blueprint: &CampaignBlueprint,
    template: &MessageTemplate,
    with_recipients: bool,
) -> CampaignInfo {
    let dispatch = &blueprint.dispatch;
    let batch_count = blueprint.recipients.len().div_ceil(dispatch.batch_size);

    let mut param_keys: Vec<String> = blueprint.sender.params.keys().cloned().collect();
    param_keys.sort();

    let recipients = if with_recipients {
        blueprint
            .recipients
            .iter()
            .map(|r| RecipientInfo {
                address: r.address.clone(),
                display_name: r.display_name.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    CampaignInfo {
        version: format!("{:?}", blueprint.version),
        campaign: CampaignSection {
            name: blueprint.campaign.name.clone(),
            channel: blueprint.campaign.channel.as_str(),
            from: blueprint
                .sender_identity()
                .map(|from| format!("{} <{}>", from.name, from.email)),
        },
        template: TemplateInfo {
            preset: blueprint.template.preset.clone(),
            subject: template.subject.clone(),
            body: template.body.clone(),
            placeholder_mode: template.placeholder_mode,
        },
        dispatch: DispatchInfo {
            batch_size: dispatch.batch_size,
            inter_batch_delay_ms: dispatch.inter_batch_delay_ms,
            send_timeout_ms: dispatch.send_timeout_ms,
            batch_count,
            min_duration_ms: dispatch.inter_batch_delay_ms
                * batch_count.saturating_sub(1) as u64,
        },
        sender: SenderInfo {
            name: blueprint.sender.name.clone(),
            sender_type: blueprint.sender.sender_type,
            param_keys,
        },
        recipient_count: blueprint.recipients.len(),
        recipients,
    }
}

fn print_campaign_info(info: &CampaignInfo) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Outreach Campaign                           ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📣 Campaign");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Name: {}", info.campaign.name);
    println!("   ├─ Channel: {}", info.campaign.channel);
    match &info.campaign.from {
        Some(from) => println!("   └─ From: {}", from),
        None => println!("   └─ From: (sender default)"),
    }

    println!("\n📝 Template");
    if let Some(ref preset) = info.template.preset {
        println!("   ├─ Preset: {}", preset);
    }
    if let Some(ref subject) = info.template.subject {
        println!("   ├─ Subject: {}", subject);
    }
    println!("   ├─ Placeholder mode: {:?}", info.template.placeholder_mode);
    println!("   └─ Body:");
    for line in info.template.body.lines() {
        println!("        | {}", line);
    }

    let dispatch = &info.dispatch;
    println!("\n⚙️  Dispatch");
    println!("   ├─ Batch size: {}", dispatch.batch_size);
    println!("   ├─ Inter-batch delay: {} ms", dispatch.inter_batch_delay_ms);
    match dispatch.send_timeout_ms {
        Some(ms) => println!("   ├─ Send timeout: {} ms", ms),
        None => println!("   ├─ Send timeout: none"),
    }
    println!("   ├─ Batches: {}", dispatch.batch_count);
    println!(
        "   └─ Minimum duration: {:.1}s",
        dispatch.min_duration_ms as f64 / 1000.0
    );

    println!("\n📤 Sender");
    println!("   ├─ Name: {}", info.sender.name);
    println!("   ├─ Type: {:?}", info.sender.sender_type);
    println!("   └─ Params: {}", info.sender.param_keys.join(", "));

    println!("\n👥 Recipients ({})", info.recipient_count);
    for (i, recipient) in info.recipients.iter().enumerate() {
        let prefix = if i == info.recipients.len() - 1 {
            "└─"
        } else {
            "├─"
        };
        println!(
            "   {} {} <{}>",
            prefix, recipient.display_name, recipient.address
        );
    }

    println!();
}
