//! step 命令
//!
//! 执行一个动作、取回状态，以 JSON 打印。

use anyhow::{Context, Result};
use clap::Args;
use helio_protocol::ActionCommand;

use super::{open_tracker, step_summary};
use crate::settings::SettingsArgs;

/// 单步命令参数
#[derive(Args, Debug)]
pub struct StepCommand {
    /// 动作：forward | backward | no-op | P<弧度>
    #[arg(allow_hyphen_values = true)]
    pub action: String,

    /// 输出完整的对象视图（含像素属性）
    #[arg(long)]
    pub objects: bool,
}

impl StepCommand {
    pub fn execute(&self, settings: &SettingsArgs) -> Result<()> {
        let action: ActionCommand = self
            .action
            .parse()
            .with_context(|| format!("Invalid action {:?}", self.action))?;
        let config = settings.load()?;
        let mut tracker = open_tracker(config)?;

        let reward = tracker.execute_action(&action)?;
        let state = tracker.retrieve_state()?;

        let output = if self.objects {
            serde_json::json!({
                "reward": reward,
                "state": state,
                "objects": state.objects(),
            })
        } else {
            step_summary(1, reward, &state)
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
