//! 决策过程接口
//!
//! 上层框架只通过两个操作驱动环境：执行动作得到 reward，再取回该步的状态。

use crate::error::ClientError;
use crate::state::WorldState;
use crate::tracker::ControlStep;
use helio_driver::FrameSource;
use helio_protocol::ActionCommand;
use helio_serial::SerialChannel;

/// 决策过程环境
pub trait Environment {
    type Action;
    type State;
    type Error;

    /// 可用动作
    fn actions(&self) -> Vec<Self::Action>;

    /// 执行动作，返回 reward
    fn execute_action(&mut self, action: &Self::Action) -> Result<f64, Self::Error>;

    /// 取回上一次执行产生的状态
    fn retrieve_state(&mut self) -> Result<Self::State, Self::Error>;

    /// 执行并取回（严格交替的便捷组合）
    fn step(&mut self, action: &Self::Action) -> Result<(f64, Self::State), Self::Error> {
        let reward = self.execute_action(action)?;
        let state = self.retrieve_state()?;
        Ok((reward, state))
    }
}

impl<C: SerialChannel, S: FrameSource> Environment for ControlStep<C, S> {
    type Action = ActionCommand;
    type State = WorldState;
    type Error = ClientError;

    fn actions(&self) -> Vec<ActionCommand> {
        ControlStep::actions(self).to_vec()
    }

    fn execute_action(&mut self, action: &ActionCommand) -> Result<f64, ClientError> {
        ControlStep::execute_action(self, action)
    }

    fn retrieve_state(&mut self) -> Result<WorldState, ClientError> {
        ControlStep::retrieve_state(self)
    }
}
