//! 配置校验模块
//!
//! 校验规则：
//! - 字段级规则 (derive Validate)：batch_size > 0、名称非空、from_email 合法
//! - 模板可解析 (preset 存在 / body 非空)
//! - email 渠道必须有主题，且收件地址为合法邮箱
//! - 至少一个收件人，收件地址唯一
//! - relay 发送器仅支持 email 渠道，且凭据参数齐全

use std::collections::HashSet;

use ::validator::{Validate, ValidateEmail};
use contracts::{CampaignBlueprint, Channel, ContractError, SenderType};

/// Credential params a relay sender cannot work without
const RELAY_REQUIRED_PARAMS: [&str; 3] = ["service_id", "template_id", "public_key"];

/// 校验 CampaignBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &CampaignBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_template(blueprint)?;
    validate_recipients(blueprint)?;
    validate_sender(blueprint)?;
    Ok(())
}

/// 字段级规则
fn validate_fields(blueprint: &CampaignBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("campaign", e.to_string()))
}

/// 校验模板
fn validate_template(blueprint: &CampaignBlueprint) -> Result<(), ContractError> {
    let template = blueprint.message_template()?;

    if template.body.trim().is_empty() {
        return Err(ContractError::config_validation(
            "template.body",
            "message content cannot be empty",
        ));
    }

    if blueprint.campaign.channel == Channel::Email
        && template.subject.as_deref().map_or(true, |s| s.trim().is_empty())
    {
        return Err(ContractError::config_validation(
            "template.subject",
            "email subject is required for the email channel",
        ));
    }

    Ok(())
}

/// 校验收件人
fn validate_recipients(blueprint: &CampaignBlueprint) -> Result<(), ContractError> {
    if blueprint.recipients.is_empty() {
        return Err(ContractError::config_validation(
            "recipients",
            "at least one recipient is required",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, recipient) in blueprint.recipients.iter().enumerate() {
        if !seen.insert(recipient.address.as_str()) {
            return Err(ContractError::config_validation(
                format!("recipients[{}].address", idx),
                format!("duplicate recipient address '{}'", recipient.address),
            ));
        }

        if blueprint.campaign.channel == Channel::Email && !recipient.address.validate_email() {
            return Err(ContractError::config_validation(
                format!("recipients[{}].address", idx),
                format!("'{}' is not a valid email address", recipient.address),
            ));
        }
    }

    Ok(())
}

/// 校验发送器配置
fn validate_sender(blueprint: &CampaignBlueprint) -> Result<(), ContractError> {
    let sender = &blueprint.sender;
    if sender.sender_type != SenderType::Relay {
        return Ok(());
    }

    if blueprint.campaign.channel != Channel::Email {
        return Err(ContractError::config_validation(
            "sender.sender_type",
            format!(
                "relay sender only delivers email, campaign channel is '{}'",
                blueprint.campaign.channel.as_str()
            ),
        ));
    }

    for key in RELAY_REQUIRED_PARAMS {
        if sender.params.get(key).map_or(true, |v| v.is_empty()) {
            return Err(ContractError::config_validation(
                format!("sender.params.{}", key),
                "required for relay sender",
            ));
        }
    }

    Ok(())
}
