//! 控制步状态机
//!
//! ```text
//!              execute_action                 (成功)
//!   IDLE ──────────────────────► EXECUTING ─────────────► PENDING
//!    ▲  ▲                           │  │                     │
//!    │  │          (失败)           │  │ (空 reward)         │ retrieve_state
//!    │  └───────────────────────────┘  ▼                     │
//!    │                               STALE ──────────────────┤
//!    │            retrieve_state (返回上一次的状态)          │
//!    └───────────────────────────────────────────────────────┘
//! ```
//!
//! `STALE` 是空 reward 之后的 IDLE：允许再执行动作，也允许取回一次上一次的状态。

use super::world::WorldState;
use crate::error::ClientError;
use std::fmt;

/// 阶段标签（不含缓存内容）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Idle,
    Executing,
    Pending,
    Stale,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseKind::Idle => "IDLE",
            PhaseKind::Executing => "EXECUTING",
            PhaseKind::Pending => "PENDING",
            PhaseKind::Stale => "STALE",
        };
        f.write_str(s)
    }
}

/// 控制步阶段
///
/// `Pending` 持有待取回的状态，这是唯一的缓存槽。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StepPhase {
    #[default]
    Idle,
    Executing,
    Pending(WorldState),
    Stale,
}

/// 取回结果
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved {
    /// 本步新合成的状态
    Fresh(WorldState),
    /// 空 reward 之后：沿用上一次的状态
    Unchanged,
}

impl StepPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            StepPhase::Idle => PhaseKind::Idle,
            StepPhase::Executing => PhaseKind::Executing,
            StepPhase::Pending(_) => PhaseKind::Pending,
            StepPhase::Stale => PhaseKind::Stale,
        }
    }

    /// 进入 EXECUTING（只允许从 IDLE / STALE）
    pub fn begin_execute(&mut self) -> Result<(), ClientError> {
        match self {
            StepPhase::Idle | StepPhase::Stale => {
                *self = StepPhase::Executing;
                Ok(())
            },
            other => Err(violation("execute_action", other.kind())),
        }
    }

    /// EXECUTING → PENDING
    pub fn complete(&mut self, state: WorldState) {
        debug_assert_eq!(self.kind(), PhaseKind::Executing);
        *self = StepPhase::Pending(state);
    }

    /// EXECUTING → STALE（空 reward）
    pub fn complete_without_outcome(&mut self) {
        debug_assert_eq!(self.kind(), PhaseKind::Executing);
        *self = StepPhase::Stale;
    }

    /// EXECUTING → IDLE（链路或采集失败）
    pub fn abort(&mut self) {
        *self = StepPhase::Idle;
    }

    /// 取回缓存并回到 IDLE（只允许从 PENDING / STALE）
    pub fn take(&mut self) -> Result<Retrieved, ClientError> {
        match std::mem::take(self) {
            StepPhase::Pending(state) => Ok(Retrieved::Fresh(state)),
            StepPhase::Stale => Ok(Retrieved::Unchanged),
            other => {
                let kind = other.kind();
                *self = other;
                Err(violation("retrieve_state", kind))
            },
        }
    }
}

fn violation(operation: &'static str, phase: PhaseKind) -> ClientError {
    ClientError::ContractViolation { operation, phase }
}
