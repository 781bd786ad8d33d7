//! 错误类型体系
//!
//! 区分三类失败：
//! - **链路失败**（`Driver`）：握手/应答格式错误、读超时、串口错误。链路随之失效，需要重新上电。
//! - **采集失败**（`Capture`）：相机不可用或读帧失败。本步作废，串口链路不受影响。
//! - **调用顺序错误**（`ContractViolation`）：`execute_action` / `retrieve_state` 未严格交替。
//!
//! 控制板返回空 reward 不是错误，见 [`StepResponse::NoOutcome`](helio_protocol::StepResponse::NoOutcome)。

use crate::state::PhaseKind;
use helio_driver::{CaptureError, DriverError};
use helio_tools::ConfigError;
use thiserror::Error;

/// 客户端错误类型
#[derive(Debug, Error)]
pub enum ClientError {
    // ==================== Fatal Errors (链路失效) ====================
    /// 设备链路错误
    #[error("Device link error: {0}")]
    Driver(#[from] DriverError),

    // ==================== Step Errors ====================
    /// 图像采集错误
    #[error("Image capture error: {0}")]
    Capture(#[from] CaptureError),

    // ==================== Usage Errors ====================
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 调用顺序违反交替约定
    #[error("Contract violation: {operation} is not allowed in phase {phase}")]
    ContractViolation {
        /// 被拒绝的操作
        operation: &'static str,
        /// 调用时所处阶段
        phase: PhaseKind,
    },
}

impl ClientError {
    /// 是否为致命错误（链路已失效，需要重新打开）
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Driver(_))
    }

    /// 是否为调用顺序错误
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ClientError::ContractViolation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helio_protocol::ProtocolError;

    #[test]
    fn test_classification() {
        let err: ClientError = DriverError::from(ProtocolError::LinkFailed).into();
        assert!(err.is_fatal());
        assert!(!err.is_contract_violation());

        let err: ClientError = CaptureError::NoFrame("gone".to_string()).into();
        assert!(!err.is_fatal());

        let err = ClientError::ContractViolation {
            operation: "retrieve_state",
            phase: PhaseKind::Idle,
        };
        assert!(err.is_contract_violation());
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_display() {
        let err = ClientError::ContractViolation {
            operation: "execute_action",
            phase: PhaseKind::Pending,
        };
        assert_eq!(
            err.to_string(),
            "Contract violation: execute_action is not allowed in phase PENDING"
        );

        let err: ClientError = DriverError::from(ProtocolError::Timeout {
            waiting_for: "step response",
            timeout_ms: 120_000,
        })
        .into();
        assert!(err.to_string().starts_with("Device link error: Protocol error:"));
    }
}
