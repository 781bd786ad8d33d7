//! 设备链路
//!
//! `DeviceLink` 独占串口通道，负责握手和"一问一答"的命令交换。
//!
//! # 失效语义
//!
//! 任何一次握手或交换失败（超时、格式错误、通道错误）都会把链路标记为失效，
//! 之后的 `exchange` 直接返回 [`ProtocolError::LinkFailed`]，不再访问串口。
//! 控制板在协议失步后需要重新上电或手动复位，因此这里不做自动重连。

use crate::error::DriverError;
use helio_protocol::{
    ActionCommand, INIT_TOKEN, ProtocolError, StepResponse, parse_handshake,
};
use helio_serial::{SerialChannel, SerialError};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// 类型擦除后的串口通道
pub type BoxedChannel = Box<dyn SerialChannel + Send>;

/// 控制板链路
pub struct DeviceLink<C: SerialChannel = BoxedChannel> {
    channel: C,
    /// 每次等待应答的超时时间
    response_timeout: Duration,
    /// 握手时控制板报告的初始角度
    initial_angle: f64,
    /// 是否已失效
    failed: bool,
}

impl<C: SerialChannel> DeviceLink<C> {
    /// 在已打开的通道上执行握手
    ///
    /// 丢弃收发缓冲区 → 发送 `INIT` → 等待 `RECV,<float>`。
    ///
    /// # 错误
    /// - `ProtocolError::HandshakeFailed`: 应答不是 `RECV,<float>`，或 `response_timeout` 内没有应答
    pub fn open(mut channel: C, response_timeout: Duration) -> Result<Self, DriverError> {
        info!(
            "Establishing communication with panel controller on {}",
            channel.describe()
        );

        channel.clear_all()?;
        channel.write_all(INIT_TOKEN)?;
        channel.flush()?;

        let reply = match channel.read_line(response_timeout) {
            Ok(line) => line,
            Err(SerialError::Timeout) => {
                let e = ProtocolError::HandshakeFailed {
                    reason: format!(
                        "no reply within {}ms",
                        response_timeout.as_millis()
                    ),
                };
                error!("Controller did not answer handshake: {}", e);
                return Err(e.into());
            },
            Err(e) => return Err(e.into()),
        };
        let initial_angle = parse_handshake(&reply).inspect_err(|e| {
            error!("Invalid handshake reply from controller: {}", e);
        })?;

        info!(
            "Connection established, initial angle along ns axis is {}",
            initial_angle
        );

        Ok(Self {
            channel,
            response_timeout,
            initial_angle,
            failed: false,
        })
    }

    /// 发送一条命令并读取一条应答记录
    ///
    /// 顺序：丢弃发送缓冲 → 写命令 → 等待一行应答 → 丢弃接收缓冲。
    /// 控制板每条命令只应答一条记录，读取后立即丢弃接收缓冲区中的残余字节。
    ///
    /// reward 字段为空时返回 [`StepResponse::NoOutcome`]，链路保持可用。
    pub fn exchange(&mut self, command: &str) -> Result<StepResponse, DriverError> {
        if self.failed {
            return Err(ProtocolError::LinkFailed.into());
        }

        let result = self.exchange_inner(command);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn exchange_inner(&mut self, command: &str) -> Result<StepResponse, DriverError> {
        self.channel.clear_output()?;
        self.channel.write_all(command.as_bytes())?;
        self.channel.flush()?;
        debug!("Transmitted command {:?} to controller", command);

        let reply = read_reply(&mut self.channel, self.response_timeout, "step response")?;

        self.channel.clear_input()?;
        debug!("Received response {:?} from controller", reply);

        let response = StepResponse::parse(&reply)?;
        if response.is_no_outcome() {
            warn!(
                "Controller reported no outcome for command {:?} (response {:?})",
                command, reply
            );
        }
        Ok(response)
    }

    /// 编码动作并交换
    pub fn send_action(
        &mut self,
        action: &ActionCommand,
        panel_step: f64,
    ) -> Result<StepResponse, DriverError> {
        self.exchange(&action.encode(panel_step))
    }

    /// 握手时控制板报告的初始角度
    pub fn initial_angle(&self) -> f64 {
        self.initial_angle
    }

    /// 应答超时
    pub fn response_timeout(&self) -> Duration {
        self.response_timeout
    }

    /// 链路是否已失效
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// 通道描述
    pub fn describe(&self) -> String {
        self.channel.describe()
    }
}

impl<C: SerialChannel> std::fmt::Debug for DeviceLink<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceLink")
            .field("channel", &self.channel.describe())
            .field("response_timeout", &self.response_timeout)
            .field("initial_angle", &self.initial_angle)
            .field("failed", &self.failed)
            .finish()
    }
}

/// 读取一行应答，串口超时映射为协议超时
fn read_reply<C: SerialChannel>(
    channel: &mut C,
    timeout: Duration,
    waiting_for: &'static str,
) -> Result<String, DriverError> {
    match channel.read_line(timeout) {
        Ok(line) => Ok(line),
        Err(SerialError::Timeout) => Err(ProtocolError::Timeout {
            waiting_for,
            timeout_ms: timeout.as_millis() as u64,
        }
        .into()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helio_serial::{MockChannel, MockOp, MockReply};

    const TIMEOUT: Duration = Duration::from_secs(120);

    fn open_link(extra_lines: &[&str]) -> (DeviceLink<MockChannel>, MockChannel) {
        let channel = MockChannel::with_lines(["RECV,12.5"]);
        for line in extra_lines {
            channel.push_line(*line);
        }
        let observer = channel.clone();
        let link = DeviceLink::open(channel, TIMEOUT).unwrap();
        (link, observer)
    }

    #[test]
    fn test_handshake_success() {
        let (link, observer) = open_link(&[]);
        assert_eq!(link.initial_angle(), 12.5);
        assert!(!link.is_failed());
        assert_eq!(
            observer.ops(),
            vec![
                MockOp::ClearInput,
                MockOp::ClearOutput,
                MockOp::Write(b"INIT".to_vec()),
                MockOp::Flush,
                MockOp::ReadLine,
            ]
        );
    }

    #[test]
    fn test_handshake_invalid_reply() {
        let channel = MockChannel::with_lines(["ERR"]);
        let err = DeviceLink::open(channel, TIMEOUT).unwrap_err();
        assert!(matches!(
            err,
            DriverError::Protocol(ProtocolError::HandshakeFailed { .. })
        ));
    }

    #[test]
    fn test_handshake_timeout() {
        let channel = MockChannel::new();
        channel.push_reply(MockReply::Timeout);
        let err = DeviceLink::open(channel, Duration::from_millis(250)).unwrap_err();
        match err {
            DriverError::Protocol(ProtocolError::HandshakeFailed { reason }) => {
                assert!(reason.contains("250ms"), "reason: {}", reason)
            },
            other => panic!("Expected Protocol(HandshakeFailed), got {:?}", other),
        }
    }

    #[test]
    fn test_exchange_sequence_and_parse() {
        let (mut link, observer) = open_link(&["3.5,0.2"]);
        observer.clear_ops();

        let resp = link.exchange("S0.1").unwrap();
        assert_eq!(
            resp,
            StepResponse::Outcome {
                reward: 3.5,
                angle: 0.2
            }
        );
        assert_eq!(
            observer.ops(),
            vec![
                MockOp::ClearOutput,
                MockOp::Write(b"S0.1".to_vec()),
                MockOp::Flush,
                MockOp::ReadLine,
                MockOp::ClearInput,
            ]
        );
    }

    #[test]
    fn test_exchange_discards_trailing_bytes() {
        let (mut link, observer) = open_link(&[]);
        observer.push_reply(MockReply::LineWithTrailing {
            line: "1.0,0.1".to_string(),
            trailing: vec!["9.9,9.9".to_string()],
        });
        observer.push_line("2.0,0.2");

        assert_eq!(link.exchange("N").unwrap().reward_or_zero(), 1.0);
        // 残余记录被丢弃，下一次读到的是真正的应答
        assert_eq!(link.exchange("N").unwrap().reward_or_zero(), 2.0);
    }

    #[test]
    fn test_exchange_no_outcome_keeps_link_usable() {
        let (mut link, _observer) = open_link(&[",0.3", "1.0,0.4"]);
        assert!(link.exchange("S0.1").unwrap().is_no_outcome());
        assert!(!link.is_failed());
        assert_eq!(link.exchange("S0.1").unwrap().reward_or_zero(), 1.0);
    }

    #[test]
    fn test_exchange_timeout_fails_link() {
        let (mut link, observer) = open_link(&[]);
        observer.push_reply(MockReply::Timeout);
        observer.push_line("1.0,0.4");

        let err = link.exchange("N").unwrap_err();
        assert!(matches!(
            err,
            DriverError::Protocol(ProtocolError::Timeout { .. })
        ));
        assert!(link.is_failed());

        // 失效后不再访问串口
        observer.clear_ops();
        let err = link.exchange("N").unwrap_err();
        assert!(matches!(err, DriverError::Protocol(ProtocolError::LinkFailed)));
        assert!(observer.ops().is_empty());
        assert_eq!(observer.remaining_replies(), 1);
    }

    #[test]
    fn test_exchange_malformed_fails_link() {
        let (mut link, _observer) = open_link(&["abc,def"]);
        let err = link.exchange("N").unwrap_err();
        assert!(matches!(
            err,
            DriverError::Protocol(ProtocolError::MalformedResponse { .. })
        ));
        assert!(link.is_failed());
    }

    #[test]
    fn test_send_action_encodes() {
        let (mut link, observer) = open_link(&["1.0,0.1", "1.0,0.0", "1.0,0.0"]);
        link.send_action(&ActionCommand::Forward, 0.1).unwrap();
        link.send_action(&ActionCommand::Backward, 0.1).unwrap();
        link.send_action(&ActionCommand::NoOp, 0.1).unwrap();
        assert_eq!(
            observer.written_strings(),
            vec!["INIT", "S0.1", "S-0.1", "N"]
        );
    }
}
