//! `send` command implementation.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::Instant;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{CampaignBlueprint, DispatchSummary, DispatchVerdict, MessageTemplate};
use dispatcher::{
    create_sender, render_message, BatchDispatcher, DispatchHandle, MessageSender,
};
use observability::{
    record_batch_completed, record_dispatch_summary, record_send_outcome,
    DispatchStatsAggregator,
};

use crate::cli::SendArgs;
use crate::error::CliError;
use crate::report::RunReport;

/// Execute the `send` command
pub async fn run_send(args: &SendArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading campaign");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut blueprint = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load campaign from {}", args.config.display()))?;

    apply_overrides(&mut blueprint, args);
    ConfigLoader::validate(&blueprint)
        .map_err(|e| CliError::invalid_override(e.to_string()))?;

    let template = blueprint.message_template()?;

    info!(
        campaign = %blueprint.campaign.name,
        channel = blueprint.campaign.channel.as_str(),
        recipients = blueprint.recipients.len(),
        batch_size = blueprint.dispatch.batch_size,
        delay_ms = blueprint.dispatch.inter_batch_delay_ms,
        sender = %blueprint.sender.name,
        "Campaign loaded"
    );

    if args.dry_run {
        info!("Dry run mode - campaign is valid, nothing will be sent");
        print_dry_run(&blueprint, &template);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let report = dispatch_campaign(blueprint, template).await?;
    report.print_summary();
    finish(&report)
}

/// Command-line values win over the campaign file
fn apply_overrides(blueprint: &mut CampaignBlueprint, args: &SendArgs) {
    if let Some(batch_size) = args.batch_size {
        info!(batch_size, "Overriding batch size from CLI");
        blueprint.dispatch.batch_size = batch_size;
    }
    if let Some(delay_ms) = args.delay_ms {
        info!(delay_ms, "Overriding inter-batch delay from CLI");
        blueprint.dispatch.inter_batch_delay_ms = delay_ms;
    }
    if let Some(timeout_ms) = args.send_timeout_ms {
        info!(timeout_ms, "Overriding send timeout from CLI");
        blueprint.dispatch.send_timeout_ms = Some(timeout_ms);
    }
}

/// Run the dispatch in the background, racing it against Ctrl+C / SIGTERM
async fn dispatch_campaign(
    blueprint: CampaignBlueprint,
    template: MessageTemplate,
) -> Result<RunReport> {
    let sender = Arc::new(
        create_sender(&blueprint.sender)
            .with_context(|| format!("Failed to create sender '{}'", blueprint.sender.name))?,
    );
    let dispatcher = BatchDispatcher::from_blueprint(&blueprint)?;

    let sender_name = sender.name().to_string();
    let channel = blueprint.campaign.channel;
    let aggregator = Arc::new(Mutex::new(DispatchStatsAggregator::new()));

    let started = Instant::now();
    let handle = DispatchHandle::spawn_observed(
        dispatcher,
        blueprint.recipients.clone(),
        template,
        sender,
        {
            let aggregator = Arc::clone(&aggregator);
            let sender_name = sender_name.clone();
            move |report| {
                for outcome in &report.outcomes {
                    record_send_outcome(&sender_name, channel, outcome.status);
                }
                record_batch_completed(report.outcomes.len(), report.elapsed);
                if let Ok(mut stats) = aggregator.lock() {
                    stats.update(&report.outcomes, report.elapsed);
                }
            }
        },
    );

    let mut progress_rx = handle.subscribe();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Starting dispatch...");

    let interrupted = loop {
        let progress = *progress_rx.borrow_and_update();
        if progress.is_finished() {
            break false;
        }

        tokio::select! {
            changed = progress_rx.changed() => {
                if changed.is_err() {
                    break false;
                }
                let progress = *progress_rx.borrow();
                info!(
                    batch = progress.batches_done,
                    of = progress.total_batches,
                    completed = progress.completed,
                    total = progress.total,
                    failed = progress.failed,
                    percent = format!("{:.0}", progress.percent()),
                    "Progress"
                );
            }
            _ = &mut shutdown => {
                warn!("Received shutdown signal, stopping dispatch...");
                break true;
            }
        }
    };

    let summary = if interrupted {
        handle.abort();
        let progress = handle.progress();
        DispatchSummary {
            success_count: progress.success,
            failed_count: progress.failed,
        }
    } else {
        handle.join().await.context("Dispatch execution failed")?
    };

    record_dispatch_summary(&blueprint.campaign.name, &summary);

    let metrics = aggregator
        .lock()
        .map(|stats| stats.summary())
        .unwrap_or_default();

    Ok(RunReport {
        campaign: blueprint.campaign.name,
        sender: sender_name,
        total: blueprint.recipients.len() as u64,
        summary,
        duration: started.elapsed(),
        interrupted,
        metrics,
    })
}

/// Map the run outcome to the process result
fn finish(report: &RunReport) -> Result<()> {
    if report.interrupted {
        return Err(CliError::Interrupted {
            completed: report.summary.total(),
            total: report.total,
        }
        .into());
    }

    match report.summary.verdict() {
        DispatchVerdict::Delivered => {
            info!(sent = report.summary.success_count, "Campaign delivered");
            Ok(())
        }
        DispatchVerdict::PartiallyDelivered => {
            warn!(
                sent = report.summary.success_count,
                failed = report.summary.failed_count,
                "Campaign partially delivered"
            );
            Ok(())
        }
        DispatchVerdict::Failed => Err(CliError::AllSendsFailed {
            failed: report.summary.failed_count,
        }
        .into()),
        DispatchVerdict::Empty => {
            warn!("Campaign has no recipients, nothing was sent");
            Ok(())
        }
    }
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print the plan and a preview of the first message for dry-run mode
fn print_dry_run(blueprint: &CampaignBlueprint, template: &MessageTemplate) {
    let dispatch = &blueprint.dispatch;
    let recipients = blueprint.recipients.len();
    let batches = recipients.div_ceil(dispatch.batch_size);
    let min_duration =
        Duration::from_millis(dispatch.inter_batch_delay_ms) * batches.saturating_sub(1) as u32;

    println!("\n=== Dispatch Plan ===\n");
    println!("Campaign: {}", blueprint.campaign.name);
    println!("Channel: {}", blueprint.campaign.channel.as_str());
    println!(
        "Sender: {} ({:?})",
        blueprint.sender.name, blueprint.sender.sender_type
    );
    println!("Recipients: {}", recipients);
    println!(
        "Batches: {} x {} (pause {} ms)",
        batches, dispatch.batch_size, dispatch.inter_batch_delay_ms
    );
    println!("Minimum duration: {:.1}s", min_duration.as_secs_f64());

    if let Some(first) = blueprint.recipients.first() {
        let preview = render_message(
            template,
            first,
            blueprint.campaign.channel,
            blueprint.sender_identity().as_ref(),
        );
        println!("\nPreview ({}):", preview.recipient_address);
        if let Some(ref subject) = preview.subject {
            println!("  Subject: {}", subject);
        }
        for line in preview.body.lines() {
            println!("  | {}", line);
        }
    }

    println!();
}
