//! CampaignBlueprint - Config Loader 输出
//!
//! 描述一次完整的群发活动：活动信息、模板、批处理参数、发送器与收件人列表。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{
    find_preset, Channel, ContractError, MessageTemplate, PlaceholderMode, Recipient,
    SenderIdentity,
};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的活动配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CampaignBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 活动设置
    #[validate(nested)]
    pub campaign: CampaignConfig,

    /// 消息模板
    pub template: TemplateConfig,

    /// 批处理参数
    #[serde(default)]
    #[validate(nested)]
    pub dispatch: DispatchSettings,

    /// 发送器配置
    #[serde(default)]
    #[validate(nested)]
    pub sender: SenderConfig,

    /// 收件人列表
    #[serde(default)]
    #[validate(nested)]
    pub recipients: Vec<Recipient>,
}

/// 活动设置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CampaignConfig {
    /// 活动名称
    #[validate(length(min = 1, message = "campaign name cannot be empty"))]
    pub name: String,

    /// 投递渠道
    #[serde(default)]
    pub channel: Channel,

    /// 发件人名称 (可选)
    #[serde(default)]
    pub from_name: Option<String>,

    /// 发件人邮箱 (可选)
    #[serde(default)]
    #[validate(email(message = "from_email must be a valid email address"))]
    pub from_email: Option<String>,
}

/// 模板配置：预设 + 显式覆盖
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// 内置模板 ID
    #[serde(default)]
    pub preset: Option<String>,

    /// 邮件主题 (覆盖预设)
    #[serde(default)]
    pub subject: Option<String>,

    /// 正文 (覆盖预设)
    #[serde(default)]
    pub body: Option<String>,

    /// 占位符替换模式
    #[serde(default)]
    pub placeholder_mode: PlaceholderMode,
}

/// 批处理参数
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchSettings {
    /// 每批收件人数量，必须 > 0
    #[serde(default = "default_batch_size")]
    #[validate(range(min = 1, message = "batch_size must be > 0"))]
    pub batch_size: usize,

    /// 批次间隔 (毫秒)
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,

    /// 单次发送超时 (毫秒)，None = 不限
    #[serde(default)]
    #[validate(range(min = 1, message = "send_timeout_ms must be > 0"))]
    pub send_timeout_ms: Option<u64>,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            send_timeout_ms: None,
        }
    }
}

fn default_batch_size() -> usize {
    5
}

fn default_inter_batch_delay_ms() -> u64 {
    1000
}

/// 发送器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SenderConfig {
    /// 发送器名称
    #[validate(length(min = 1, message = "sender name cannot be empty"))]
    pub name: String,

    /// 发送器类型
    pub sender_type: SenderType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            name: "log".to_string(),
            sender_type: SenderType::Log,
            params: HashMap::new(),
        }
    }
}

/// 发送器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    /// 日志输出 (模拟投递)
    Log,
    /// 写入本地发件箱目录
    Outbox,
    /// HTTP 邮件中继
    Relay,
}

impl TemplateConfig {
    /// Merge preset and explicit fields into the template actually sent
    ///
    /// The subject is dropped for channels without one.
    pub fn resolve(&self, channel: Channel) -> Result<MessageTemplate, ContractError> {
        let preset = match &self.preset {
            Some(id) => Some(find_preset(id).ok_or_else(|| ContractError::UnknownPreset {
                preset: id.clone(),
            })?),
            None => None,
        };

        let body = self
            .body
            .clone()
            .or_else(|| preset.map(|p| p.body.to_string()))
            .ok_or_else(|| {
                ContractError::config_validation(
                    "template.body",
                    "body is required when no preset is given",
                )
            })?;

        let subject = if channel.has_subject() {
            self.subject
                .clone()
                .or_else(|| preset.and_then(|p| p.subject.map(str::to_string)))
        } else {
            None
        };

        Ok(MessageTemplate::new(subject, body).with_placeholder_mode(self.placeholder_mode))
    }
}

impl CampaignBlueprint {
    /// Resolve the campaign's template for its channel
    pub fn message_template(&self) -> Result<MessageTemplate, ContractError> {
        self.template.resolve(self.campaign.channel)
    }

    /// Originator identity, if the campaign names one
    pub fn sender_identity(&self) -> Option<SenderIdentity> {
        match (&self.campaign.from_name, &self.campaign.from_email) {
            (None, None) => None,
            (name, email) => Some(SenderIdentity {
                name: name.clone().unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
                email: email.clone().unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            }),
        }
    }
}

/// Fallback originator name
pub const DEFAULT_FROM_NAME: &str = "Outreach";
/// Fallback originator address
pub const DEFAULT_FROM_EMAIL: &str = "noreply@localhost";

#[cfg(test)]
mod tests {
    use super::*;

    fn template(preset: Option<&str>, subject: Option<&str>, body: Option<&str>) -> TemplateConfig {
        TemplateConfig {
            preset: preset.map(str::to_string),
            subject: subject.map(str::to_string),
            body: body.map(str::to_string),
            placeholder_mode: PlaceholderMode::First,
        }
    }

    #[test]
    fn test_resolve_from_preset() {
        let resolved = template(Some("welcome"), None, None)
            .resolve(Channel::Email)
            .unwrap();
        assert_eq!(resolved.subject.as_deref(), Some("Welcome to Our Services"));
        assert!(resolved.body.starts_with("Dear {name}"));
    }

    #[test]
    fn test_explicit_fields_override_preset() {
        let resolved = template(Some("welcome"), Some("Hello"), Some("Hi {name}"))
            .resolve(Channel::Email)
            .unwrap();
        assert_eq!(resolved.subject.as_deref(), Some("Hello"));
        assert_eq!(resolved.body, "Hi {name}");
    }

    #[test]
    fn test_subject_dropped_for_whatsapp() {
        let resolved = template(None, Some("ignored"), Some("Hi {name}"))
            .resolve(Channel::Whatsapp)
            .unwrap();
        assert!(resolved.subject.is_none());
    }

    #[test]
    fn test_unknown_preset() {
        let err = template(Some("nope"), None, None)
            .resolve(Channel::Email)
            .unwrap_err();
        assert!(matches!(err, ContractError::UnknownPreset { .. }));
    }

    #[test]
    fn test_missing_body() {
        let err = template(None, Some("s"), None)
            .resolve(Channel::Email)
            .unwrap_err();
        assert!(err.to_string().contains("template.body"));
    }

    #[test]
    fn test_dispatch_settings_defaults() {
        let settings: DispatchSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.batch_size, 5);
        assert_eq!(settings.inter_batch_delay_ms, 1000);
        assert!(settings.send_timeout_ms.is_none());
    }

    #[test]
    fn test_zero_batch_size_fails_field_rules() {
        let settings = DispatchSettings {
            batch_size: 0,
            ..DispatchSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
