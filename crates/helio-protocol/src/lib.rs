//! # Helio Protocol
//!
//! 太阳能跟踪器控制板串口文本协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量（握手令牌、命令前缀）
//! - `control`: 动作 → 命令字符串编码
//! - `feedback`: 握手应答 / 单步应答解析
//!
//! ## 线协议
//!
//! ```text
//! 握手:   host -> device  "INIT"
//!         device -> host  "RECV,<float>\n"
//! 单步:   host -> device  "S<float>" | "N" | "P<float>"
//!         device -> host  "<reward>,<angle>\n"   或 ",<...>"（reward 为空 = 无结果）
//! ```

pub mod constants;
pub mod control;
pub mod feedback;

// 重新导出常用类型
pub use constants::*;
pub use control::*;
pub use feedback::*;

use thiserror::Error;

/// 协议解析错误类型
///
/// 所有变体都视为链路级致命错误：调用方不应自动重试。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// 握手失败：应答不是 `RECV,<float>`，或超时内没有应答
    #[error("Handshake failed: {reason}")]
    HandshakeFailed { reason: String },

    /// 单步应答格式错误
    #[error("Malformed response {line:?}: {reason}")]
    MalformedResponse { line: String, reason: String },

    /// 等待设备应答超时
    #[error("Timed out after {timeout_ms}ms waiting for {waiting_for}")]
    Timeout {
        waiting_for: &'static str,
        timeout_ms: u64,
    },

    /// 链路已失效（之前发生过协议错误）
    #[error("Link failed earlier and must be reopened")]
    LinkFailed,

    /// 无法识别的动作符号
    #[error("Unknown action symbol: {0:?}")]
    UnknownAction(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ProtocolError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        ProtocolError::MalformedResponse {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}

/// 去掉行尾的 `\r` / `\n`
///
/// 控制板使用 Arduino `Serial.println`，行尾为 `\r\n`。
pub fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
