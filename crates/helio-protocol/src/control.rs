//! 控制命令编码
//!
//! 将决策层的动作符号映射为发送给控制板的命令字符串。

use crate::ProtocolError;
use crate::constants::*;
use std::fmt;
use std::str::FromStr;

/// 绝对位置命令
///
/// 保留原始字面量，编码时原样透传（控制板负责解析目标值）。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsolutePosition {
    target: f64,
    literal: String,
}

impl AbsolutePosition {
    /// 由目标角度（弧度）构造，字面量为 `P<target>`
    pub fn new(target: f64) -> Self {
        Self {
            target,
            literal: format!("{}{}", ABSOLUTE_COMMAND_PREFIX, format_radians(target)),
        }
    }

    /// 目标角度（弧度）
    pub fn target(&self) -> f64 {
        self.target
    }

    /// 原始命令字面量
    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl FromStr for AbsolutePosition {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix(ABSOLUTE_COMMAND_PREFIX)
            .ok_or_else(|| ProtocolError::UnknownAction(s.to_string()))?;
        let target: f64 = body
            .trim()
            .parse()
            .map_err(|_| ProtocolError::ParseError(format!("invalid absolute target in {s:?}")))?;
        if !target.is_finite() {
            return Err(ProtocolError::ParseError(format!(
                "absolute target must be finite: {s:?}"
            )));
        }
        Ok(Self {
            target,
            literal: s.to_string(),
        })
    }
}

/// 单轴跟踪器的动作
///
/// 封闭集合 `forward` / `backward` / `no-op`，外加可扩展的绝对位置形式。
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionCommand {
    /// 正向转动一个步长
    Forward,
    /// 反向转动一个步长
    Backward,
    /// 保持不动
    #[default]
    NoOp,
    /// 转到绝对位置
    Absolute(AbsolutePosition),
}

impl ActionCommand {
    /// 单轴跟踪器的基础动作集合（顺序与决策层枚举一致）
    pub fn single_axis_actions() -> [ActionCommand; 3] {
        [
            ActionCommand::NoOp,
            ActionCommand::Forward,
            ActionCommand::Backward,
        ]
    }

    /// 构造绝对位置动作
    pub fn absolute(target: f64) -> Self {
        ActionCommand::Absolute(AbsolutePosition::new(target))
    }

    /// 编码为线上命令字符串
    ///
    /// - `Forward` → `S<panel_step>`
    /// - `Backward` → `S-<panel_step>`
    /// - `Absolute` → 原样透传
    /// - `NoOp` → `N`
    pub fn encode(&self, panel_step: f64) -> String {
        match self {
            ActionCommand::Forward => {
                format!("{}{}", STEP_COMMAND_PREFIX, format_radians(panel_step))
            },
            ActionCommand::Backward => {
                format!("{}-{}", STEP_COMMAND_PREFIX, format_radians(panel_step))
            },
            ActionCommand::Absolute(position) => position.literal().to_string(),
            ActionCommand::NoOp => NO_OP_COMMAND.to_string(),
        }
    }

    /// 宽松解析：无法识别的符号一律视为 `NoOp`
    pub fn from_symbol_or_noop(symbol: &str) -> Self {
        symbol.parse().unwrap_or(ActionCommand::NoOp)
    }

    /// 动作符号（用于日志和决策层）
    pub fn symbol(&self) -> &str {
        match self {
            ActionCommand::Forward => "forward",
            ActionCommand::Backward => "backward",
            ActionCommand::NoOp => "no-op",
            ActionCommand::Absolute(position) => position.literal(),
        }
    }
}

impl FromStr for ActionCommand {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "forward" | "F" => Ok(ActionCommand::Forward),
            "backward" | "B" => Ok(ActionCommand::Backward),
            "no-op" | "noop" | "N" => Ok(ActionCommand::NoOp),
            other if other.starts_with(ABSOLUTE_COMMAND_PREFIX) => {
                Ok(ActionCommand::Absolute(other.parse()?))
            },
            other => Err(ProtocolError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 弧度值的文本格式
///
/// 整数值保留 `.0`（`1.0` 而不是 `1`），与控制板固件期望的浮点文本一致。
fn format_radians(value: f64) -> String {
    format!("{:?}", value)
}
