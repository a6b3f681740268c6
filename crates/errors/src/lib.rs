//! tray-errors - 统一错误处理
//!
//! 基于 RFC 7807 Problem Details 规范

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// 状态不允许该操作（例如对已归还的发运单再次归还）
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 外部存储/API 协作方失败，原因原样保留
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 错误类别（用于日志与 metrics 标签）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::InvalidState(_) => "invalid_state",
            Self::Collaborator(_) => "collaborator",
            Self::Internal(_) => "internal",
        }
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::InvalidState(_) => 409,
            Self::Collaborator(_) => 502,
            Self::Internal(_) => 500,
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: format!("/problems/{}", self.kind().replace('_', "-")),
            title: self.problem_title().to_string(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
        }
    }

    fn problem_title(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Resource Not Found",
            Self::Validation(_) => "Validation Error",
            Self::InvalidState(_) => "Invalid State",
            Self::Collaborator(_) => "Collaborator Error",
            Self::Internal(_) => "Internal Server Error",
        }
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::not_found("dispatch 7").status_code(), 404);
        assert_eq!(AppError::validation("hq_boxes").status_code(), 400);
        assert_eq!(AppError::invalid_state("returned").status_code(), 409);
        assert_eq!(AppError::collaborator("timeout").status_code(), 502);
        assert_eq!(AppError::internal("boom").status_code(), 500);
    }

    #[test]
    fn test_problem_details() {
        let problem = AppError::invalid_state("dispatch 3 already returned").to_problem_details();
        assert_eq!(problem.r#type, "/problems/invalid-state");
        assert_eq!(problem.title, "Invalid State");
        assert_eq!(problem.status, 409);
        assert_eq!(problem.detail, "Invalid state: dispatch 3 already returned");

        let json = serde_json::to_value(&problem).unwrap();
        assert!(json.get("instance").is_none());
    }
}
