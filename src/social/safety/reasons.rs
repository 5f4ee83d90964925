//! 举报/屏蔽原因表
//!
//! 所有原因及其元数据集中在一张静态表中，判定逻辑（必填说明、自动隐藏、
//! 屏蔽时自动举报）都是基于这张表的纯函数。

use crate::social::error::{SdkError, SdkResult};
use serde::Serialize;

/// 严重等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// 单条原因的元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonInfo {
    pub code: &'static str,
    pub label: &'static str,
    pub severity: Severity,
    /// 提交时必须附带文字说明
    pub requires_details: bool,
    /// 可作为举报原因；为 false 的原因只能用于屏蔽
    pub reportable: bool,
}

const fn reason(
    code: &'static str,
    label: &'static str,
    severity: Severity,
    requires_details: bool,
    reportable: bool,
) -> ReasonInfo {
    ReasonInfo {
        code,
        label,
        severity,
        requires_details,
        reportable,
    }
}

pub static REASONS: &[ReasonInfo] = &[
    reason("underage", "Underage person", Severity::Critical, false, true),
    reason("non_consensual", "Non-consensual content", Severity::Critical, false, true),
    reason("illegal_content", "Illegal content", Severity::Critical, false, true),
    reason("harassment", "Harassment or bullying", Severity::High, false, true),
    reason("threats_violence", "Threats or violence", Severity::High, false, true),
    reason("hate_speech", "Hate speech", Severity::High, false, true),
    reason("scam_fraud", "Scam or fraud", Severity::High, false, true),
    reason("impersonation", "Impersonation", Severity::Medium, true, true),
    reason("copyright", "Copyright infringement", Severity::Medium, true, true),
    reason("inappropriate_content", "Inappropriate content", Severity::Medium, false, true),
    reason("spam", "Spam", Severity::Low, false, true),
    reason("other", "Other", Severity::Low, true, true),
    reason("not_interested", "Not interested", Severity::Low, false, false),
    reason("unwanted_contact", "Unwanted contact", Severity::Low, false, false),
];

pub fn lookup_reason(code: &str) -> Option<&'static ReasonInfo> {
    REASONS.iter().find(|r| r.code == code)
}

/// 校验举报原因和说明，返回原因元数据
pub fn validate_report_reason(
    reason_code: &str,
    details: Option<&str>,
) -> SdkResult<&'static ReasonInfo> {
    if reason_code.trim().is_empty() {
        return Err(SdkError::validation("请选择举报原因"));
    }
    let info = lookup_reason(reason_code)
        .ok_or_else(|| SdkError::validation(format!("未知的举报原因: {}", reason_code)))?;
    if !info.reportable {
        return Err(SdkError::validation(format!(
            "原因 {} 只能用于屏蔽，不能用于举报",
            reason_code
        )));
    }
    let has_details = details.map(|d| !d.trim().is_empty()).unwrap_or(false);
    if info.requires_details && !has_details {
        return Err(SdkError::validation(format!(
            "举报原因 {} 需要填写详细说明",
            reason_code
        )));
    }
    Ok(info)
}

/// 严重（critical/high）举报提交成功后自动隐藏内容
pub fn should_auto_hide(info: &ReasonInfo) -> bool {
    info.severity >= Severity::High
}

/// 屏蔽时是否需要顺带举报该用户
pub fn should_auto_report(info: &ReasonInfo) -> bool {
    info.reportable && info.severity != Severity::Low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_unique() {
        let mut codes: Vec<_> = REASONS.iter().map(|r| r.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), REASONS.len());
    }

    #[test]
    fn unknown_reason_is_rejected() {
        assert!(matches!(
            validate_report_reason("made_up", None),
            Err(SdkError::Validation(_))
        ));
        assert!(matches!(
            validate_report_reason("", None),
            Err(SdkError::Validation(_))
        ));
    }

    #[test]
    fn details_required_reasons_need_non_blank_details() {
        assert!(validate_report_reason("copyright", None).is_err());
        assert!(validate_report_reason("copyright", Some("   ")).is_err());
        assert!(validate_report_reason("copyright", Some("my photo set")).is_ok());
        assert!(validate_report_reason("spam", None).is_ok());
    }

    #[test]
    fn block_only_reasons_cannot_be_reported() {
        assert!(validate_report_reason("not_interested", None).is_err());
    }

    #[test]
    fn auto_hide_and_auto_report_follow_severity() {
        let critical = lookup_reason("underage").unwrap();
        let high = lookup_reason("harassment").unwrap();
        let medium = lookup_reason("inappropriate_content").unwrap();
        let low = lookup_reason("spam").unwrap();

        assert!(should_auto_hide(critical));
        assert!(should_auto_hide(high));
        assert!(!should_auto_hide(medium));
        assert!(!should_auto_hide(low));

        assert!(should_auto_report(high));
        assert!(should_auto_report(medium));
        assert!(!should_auto_report(low));
        assert!(!should_auto_report(lookup_reason("unwanted_contact").unwrap()));
    }
}
