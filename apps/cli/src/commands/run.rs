//! run 命令
//!
//! 每个控制周期执行一次动作，逐行打印 JSON 摘要。Ctrl-C 在两步之间停止。

use anyhow::{Context, Result, bail};
use clap::Args;
use helio_protocol::ActionCommand;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::{open_tracker, step_summary};
use crate::settings::SettingsArgs;

/// 睡眠时检查停止信号的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 循环执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 每步执行的动作
    #[arg(short, long, default_value = "forward", allow_hyphen_values = true)]
    pub action: String,

    /// 执行步数（默认一直运行）
    #[arg(short = 'n', long)]
    pub steps: Option<u64>,

    /// 步间隔秒数（默认取 controlTimestepMinutes）
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

impl RunCommand {
    pub fn execute(&self, settings: &SettingsArgs) -> Result<()> {
        let action: ActionCommand = self
            .action
            .parse()
            .with_context(|| format!("Invalid action {:?}", self.action))?;
        let config = settings.load()?;
        let interval = match self.interval_secs {
            Some(secs) => Duration::from_secs(secs),
            None => config.control_timestep(),
        };
        if self.steps == Some(0) {
            bail!("--steps must be at least 1");
        }

        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl-C handler")?;

        let mut tracker = open_tracker(config)?;
        info!(
            "Running action {} every {:?}{}",
            action,
            interval,
            self.steps.map(|n| format!(" for {} steps", n)).unwrap_or_default()
        );
        println!("💡 Press Ctrl-C to stop");

        let mut index = 0u64;
        while running.load(Ordering::SeqCst) {
            index += 1;
            match tracker.execute_action(&action) {
                Ok(reward) => {
                    let state = tracker.retrieve_state()?;
                    println!("{}", serde_json::to_string(&step_summary(index, reward, &state))?);
                },
                Err(e) if e.is_fatal() => {
                    return Err(e).context(
                        "Controller link lost; power-cycle or reset the controller and restart",
                    );
                },
                // 采集失败只作废本步，链路仍可用
                Err(e) if !e.is_contract_violation() => {
                    warn!("Step {} discarded: {}", index, e);
                },
                Err(e) => return Err(e.into()),
            }

            if self.steps.is_some_and(|n| index >= n) {
                break;
            }
            if !sleep_while_running(interval, &running) {
                break;
            }
        }

        if !running.load(Ordering::SeqCst) {
            warn!("Stopped by user after {} steps", index);
        }
        println!("✅ Completed {} steps", index);
        Ok(())
    }
}

/// 分片睡眠，收到停止信号时提前返回 `false`
fn sleep_while_running(duration: Duration, running: &AtomicBool) -> bool {
    let deadline = Instant::now().checked_add(duration);
    loop {
        if !running.load(Ordering::SeqCst) {
            return false;
        }
        let remaining =
            deadline.map_or(POLL_INTERVAL, |d| d.saturating_duration_since(Instant::now()));
        if remaining.is_zero() {
            return true;
        }
        thread::sleep(POLL_INTERVAL.min(remaining));
    }
}
