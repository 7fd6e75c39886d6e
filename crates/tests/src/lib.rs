//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 -> 分发器 -> 发送器 e2e 测试（无需真实邮件服务）
//! - 限速节奏回归

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        find_preset, Channel, ConfigVersion, DispatchSummary, DispatchVerdict, PlaceholderMode,
        SenderType, PRESETS,
    };

    #[test]
    fn test_blueprint_toml_round_trip() {
        let content = r#"
[campaign]
name = "Visitor Passes"
channel = "whatsapp"

[template]
preset = "gate_pass_approved"
placeholder_mode = "all"

[dispatch]
batch_size = 3
inter_batch_delay_ms = 500
send_timeout_ms = 2000

[sender]
name = "outbox"
sender_type = "outbox"
params = { dir = "./outbox" }

[[recipients]]
address = "+15550100"
display_name = "John Doe"

[[recipients]]
address = "+15550101"
display_name = "Jane Smith"
"#;
        let original = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&original).unwrap();
        let reloaded = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();

        assert_eq!(reloaded.version, ConfigVersion::V1);
        assert_eq!(reloaded.campaign.name, "Visitor Passes");
        assert_eq!(reloaded.campaign.channel, Channel::Whatsapp);
        assert_eq!(reloaded.template.preset.as_deref(), Some("gate_pass_approved"));
        assert_eq!(reloaded.template.placeholder_mode, PlaceholderMode::All);
        assert_eq!(reloaded.dispatch.batch_size, 3);
        assert_eq!(reloaded.dispatch.inter_batch_delay_ms, 500);
        assert_eq!(reloaded.dispatch.send_timeout_ms, Some(2000));
        assert_eq!(reloaded.sender.sender_type, SenderType::Outbox);
        assert_eq!(reloaded.sender.params, original.sender.params);
        assert_eq!(reloaded.recipients, original.recipients);
        assert_eq!(
            reloaded.message_template().unwrap(),
            original.message_template().unwrap()
        );
    }

    #[test]
    fn test_catalog_snapshot() {
        let ids: Vec<_> = PRESETS.iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![
                "welcome",
                "meeting_reminder",
                "gate_pass_approved",
                "status_update"
            ]
        );
        assert!(find_preset("WELCOME").is_some());
    }

    #[test]
    fn test_summary_serde_shape() {
        let summary = DispatchSummary {
            success_count: 10,
            failed_count: 2,
        };
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["success_count"], 10);
        assert_eq!(json["failed_count"], 2);
        assert_eq!(summary.verdict(), DispatchVerdict::PartiallyDelivered);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, DispatchStatus, MessageSender, ResolvedMessage};
    use dispatcher::{create_sender, BatchDispatcher, DispatchHandle};
    use observability::DispatchStatsAggregator;
    use tokio::time::Instant;

    fn campaign_toml(outbox: &Path, recipients: usize, delay_ms: u64) -> String {
        let mut content = format!(
            r#"
[campaign]
name = "Quarterly Update"
channel = "email"
from_name = "Outreach Team"
from_email = "team@example.com"

[template]
preset = "welcome"

[dispatch]
batch_size = 5
inter_batch_delay_ms = {delay_ms}

[sender]
name = "outbox"
sender_type = "outbox"
params = {{ dir = '{}' }}
"#,
            outbox.display()
        );
        for i in 0..recipients {
            content.push_str(&format!(
                "\n[[recipients]]\naddress = \"client{i}@example.com\"\ndisplay_name = \"Client {i}\"\n"
            ));
        }
        content
    }

    /// Fails every address on the `bounce.test` domain, records the rest
    struct BouncingSender {
        delivered: Mutex<Vec<ResolvedMessage>>,
    }

    impl BouncingSender {
        fn new() -> Self {
            Self {
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessageSender for BouncingSender {
        fn name(&self) -> &str {
            "bouncing"
        }

        async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if message.recipient_address.ends_with("@bounce.test") {
                return Err(ContractError::send_failed(
                    "bouncing",
                    &message.recipient_address,
                    "mailbox unavailable",
                ));
            }
            self.delivered.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    /// End-to-end test: campaign file -> BatchDispatcher -> OutboxSender
    ///
    /// 验证完整的数据流：
    /// 1. ConfigLoader 解析并校验活动配置
    /// 2. create_sender 按配置构建 outbox 发送器
    /// 3. 每个收件人生成一个消息文件，{name} 已替换
    #[tokio::test]
    async fn test_e2e_campaign_to_outbox() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = dir.path().join("outbox");
        let content = campaign_toml(&outbox, 12, 0);

        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let template = blueprint.message_template().unwrap();
        let sender = create_sender(&blueprint.sender).unwrap();
        let dispatcher = BatchDispatcher::from_blueprint(&blueprint).unwrap();

        let summary = dispatcher
            .dispatch(&blueprint.recipients, &template, &sender)
            .await;

        assert_eq!(summary.success_count, 12);
        assert_eq!(summary.failed_count, 0);

        let files: Vec<_> = fs::read_dir(&outbox)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(files.len(), 12);

        let mut addresses = HashSet::new();
        for path in files {
            let message: ResolvedMessage =
                serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
            let index: usize = message
                .recipient_address
                .trim_start_matches("client")
                .trim_end_matches("@example.com")
                .parse()
                .unwrap();
            assert!(message.body.starts_with(&format!("Dear Client {index},")));
            assert_eq!(message.subject.as_deref(), Some("Welcome to Our Services"));
            assert_eq!(message.from.as_ref().unwrap().email, "team@example.com");
            addresses.insert(message.recipient_address);
        }
        assert_eq!(addresses.len(), 12);
    }

    #[tokio::test]
    async fn test_e2e_partial_failure_is_counted_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let mut content = campaign_toml(&dir.path().join("unused"), 4, 0);
        content.push_str(
            "\n[[recipients]]\naddress = \"gone@bounce.test\"\ndisplay_name = \"Gone\"\n",
        );
        content.push_str(
            "\n[[recipients]]\naddress = \"left@bounce.test\"\ndisplay_name = \"Left\"\n",
        );

        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let template = blueprint.message_template().unwrap();
        let dispatcher = BatchDispatcher::from_blueprint(&blueprint).unwrap();
        let sender = BouncingSender::new();

        let mut aggregator = DispatchStatsAggregator::new();
        let summary = dispatcher
            .dispatch_observed(&blueprint.recipients, &template, &sender, |report| {
                aggregator.update(&report.outcomes, report.elapsed);
            })
            .await;

        assert_eq!(summary.success_count, 4);
        assert_eq!(summary.failed_count, 2);
        assert_eq!(summary.total(), blueprint.recipients.len() as u64);

        assert_eq!(aggregator.total_batches, 2);
        assert_eq!(aggregator.totals, summary);
        assert_eq!(aggregator.failures_by_domain.get("bounce.test"), Some(&2));
        assert_eq!(sender.delivered.lock().unwrap().len(), 4);
    }

    /// 12 recipients, batch 5, delay 1s: three batches, two pauses
    #[tokio::test(start_paused = true)]
    async fn test_e2e_pacing_through_handle() {
        let dir = tempfile::tempdir().unwrap();
        let content = campaign_toml(&dir.path().join("unused"), 12, 1000);

        let blueprint = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap();
        let template = blueprint.message_template().unwrap();
        let dispatcher = BatchDispatcher::from_blueprint(&blueprint).unwrap();
        let sender = Arc::new(BouncingSender::new());

        let batch_sizes = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();
        let handle = DispatchHandle::spawn_observed(
            dispatcher,
            blueprint.recipients.clone(),
            template,
            Arc::clone(&sender),
            {
                let batch_sizes = Arc::clone(&batch_sizes);
                move |report| {
                    let ok = report
                        .outcomes
                        .iter()
                        .all(|o| o.status == DispatchStatus::Success);
                    assert!(ok);
                    batch_sizes.lock().unwrap().push(report.outcomes.len());
                }
            },
        );

        let mut progress_rx = handle.subscribe();
        let summary = handle.join().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(summary.success_count, 12);
        assert_eq!(*batch_sizes.lock().unwrap(), vec![5, 5, 2]);

        // three batches of 10ms sends plus two 1s pauses
        assert!(elapsed >= Duration::from_millis(2030), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(2100), "elapsed {elapsed:?}");

        let progress = *progress_rx.borrow_and_update();
        assert!(progress.is_finished());
        assert_eq!(progress.batches_done, 3);
        assert_eq!(progress.total_batches, 3);
    }

    #[tokio::test]
    async fn test_e2e_rejects_invalid_campaign_before_sending() {
        let dir = tempfile::tempdir().unwrap();
        let content = campaign_toml(&dir.path().join("outbox"), 2, 0)
            .replace("client1@example.com", "client0@example.com");

        let err = ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap_err();
        assert!(err.to_string().contains("duplicate recipient"));
        assert!(!dir.path().join("outbox").exists());
    }
}
