//! 反馈解析
//!
//! 解析控制板的握手应答和单步应答。

use crate::constants::*;
use crate::{ProtocolError, trim_line_ending};

/// 解析握手应答 `RECV,<float>`
///
/// 返回控制板报告的初始角度（运动轴方向，弧度）。
pub fn parse_handshake(line: &str) -> Result<f64, ProtocolError> {
    let line = trim_line_ending(line);
    let failed = || ProtocolError::HandshakeFailed {
        reason: format!("unexpected reply {:?}", line),
    };

    let mut fields = line.split(FIELD_SEPARATOR);
    if fields.next() != Some(HANDSHAKE_REPLY_PREFIX) {
        return Err(failed());
    }
    let angle = fields
        .next()
        .and_then(|field| field.trim().parse::<f64>().ok())
        .filter(|angle| angle.is_finite())
        .ok_or_else(failed)?;
    if fields.next().is_some() {
        return Err(failed());
    }

    Ok(angle)
}

/// 单步应答
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepResponse {
    /// 正常结果：奖励值和动作后的角度
    Outcome { reward: f64, angle: f64 },
    /// reward 字段为空：控制板未给出结果（瞬时失败）
    ///
    /// 调用方应将结果视为 0，且不更新任何角度状态。
    NoOutcome,
}

impl StepResponse {
    /// 解析 `<reward>,<angle>` 记录
    ///
    /// reward 字段为空（包括空行）时返回 [`StepResponse::NoOutcome`]，
    /// 不区分"瞬时故障"和"格式错误"。
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = trim_line_ending(line);
        let mut fields = line.split(FIELD_SEPARATOR);

        let reward_field = fields.next().unwrap_or_default().trim();
        if reward_field.is_empty() {
            return Ok(StepResponse::NoOutcome);
        }

        let reward = parse_float(line, "reward", reward_field)?;
        let angle_field = fields
            .next()
            .ok_or_else(|| ProtocolError::malformed(line, "missing angle field"))?;
        let angle = parse_float(line, "angle", angle_field.trim())?;

        if fields.next().is_some() {
            return Err(ProtocolError::malformed(line, "unexpected extra fields"));
        }

        Ok(StepResponse::Outcome { reward, angle })
    }

    /// 数值结果，`NoOutcome` 视为 0
    pub fn reward_or_zero(&self) -> f64 {
        match self {
            StepResponse::Outcome { reward, .. } => *reward,
            StepResponse::NoOutcome => 0.0,
        }
    }

    /// 是否为无结果应答
    pub fn is_no_outcome(&self) -> bool {
        matches!(self, StepResponse::NoOutcome)
    }
}

fn parse_float(line: &str, field: &str, text: &str) -> Result<f64, ProtocolError> {
    let value: f64 = text
        .parse()
        .map_err(|_| ProtocolError::malformed(line, format!("{field} is not a number: {text:?}")))?;
    if !value.is_finite() {
        return Err(ProtocolError::malformed(line, format!("{field} is not finite")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handshake_ok() {
        assert_eq!(parse_handshake("RECV,12.5").unwrap(), 12.5);
        assert_eq!(parse_handshake("RECV,-0.25\r\n").unwrap(), -0.25);
        assert_eq!(parse_handshake("RECV, 3\n").unwrap(), 3.0);
    }

    #[test]
    fn test_parse_handshake_rejects_other_replies() {
        for reply in ["ERR", "", "RECV", "RECV,", "RECV,abc", "RCV,1.0", "RECV,1.0,2.0", "RECV,nan"] {
            match parse_handshake(reply) {
                Err(ProtocolError::HandshakeFailed { .. }) => {},
                other => panic!("reply {:?} should fail handshake, got {:?}", reply, other),
            }
        }
    }

    #[test]
    fn test_parse_step_outcome() {
        let resp = StepResponse::parse("4.75,0.3\r\n").unwrap();
        assert_eq!(
            resp,
            StepResponse::Outcome {
                reward: 4.75,
                angle: 0.3
            }
        );
        assert_eq!(resp.reward_or_zero(), 4.75);
        assert!(!resp.is_no_outcome());
    }

    #[test]
    fn test_parse_step_empty_reward_is_no_outcome() {
        for line in [",0.3\n", ",", "\n", "", ",garbage"] {
            let resp = StepResponse::parse(line).unwrap();
            assert!(resp.is_no_outcome(), "line {:?}", line);
            assert_eq!(resp.reward_or_zero(), 0.0);
        }
    }

    #[test]
    fn test_parse_step_malformed() {
        assert!(matches!(
            StepResponse::parse("1.0"),
            Err(ProtocolError::MalformedResponse { .. })
        ));
        assert!(matches!(
            StepResponse::parse("abc,1.0"),
            Err(ProtocolError::MalformedResponse { .. })
        ));
        assert!(matches!(
            StepResponse::parse("1.0,xyz"),
            Err(ProtocolError::MalformedResponse { .. })
        ));
        assert!(matches!(
            StepResponse::parse("1.0,2.0,3.0"),
            Err(ProtocolError::MalformedResponse { .. })
        ));
    }
}
