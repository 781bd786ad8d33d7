//! 控制步编排
//!
//! 一次交互：编码动作 → 链路交换 → 解析结果 →（可选）采集图像 → 合成状态 → 缓存待取回。
//!
//! 上层决策框架以两次独立调用驱动一步：先 [`ControlStep::execute_action`] 得到 reward，
//! 再 [`ControlStep::retrieve_state`] 取回该步产生的状态。两次调用必须严格交替，
//! 否则返回 [`ClientError::ContractViolation`]。

use crate::error::ClientError;
use crate::state::{PanelPose, PhaseKind, Retrieved, StateBuilder, StepPhase, WorldState};
use chrono::{DateTime, Utc};
use helio_driver::{
    BoxedChannel, BoxedFrameSource, DeviceLink, FrameSource, ImageFeatures, ImagePipeline,
};
use helio_protocol::{ActionCommand, StepResponse};
use helio_serial::SerialChannel;
use helio_tools::{Clock, day_of_year};
use tracing::{debug, info, warn};

/// 类型擦除后的时钟
pub type BoxedClock = Box<dyn Clock + Send>;

/// 真实硬件上的跟踪器
pub type SolarTracker = ControlStep<BoxedChannel, BoxedFrameSource>;

/// 一步的结果
enum StepOutcome {
    Advanced { reward: f64, state: WorldState },
    NoOutcome,
}

/// 控制步状态机
///
/// 独占串口链路和相机，生命周期内不释放。
pub struct ControlStep<C: SerialChannel = BoxedChannel, S: FrameSource = BoxedFrameSource> {
    link: DeviceLink<C>,
    /// `None` 表示未启用图像
    camera: Option<ImagePipeline<S>>,
    state_builder: StateBuilder,
    clock: BoxedClock,
    /// 单步转动角度（弧度）
    panel_step: f64,
    /// 最近一次合成状态的时刻
    now: DateTime<Utc>,
    /// 最近一次合成的状态
    current: WorldState,
    phase: StepPhase,
}

impl<C: SerialChannel, S: FrameSource> ControlStep<C, S> {
    /// 在已握手的链路上创建控制步
    ///
    /// 以 `angle_ew = 0`、`angle_ns = 初始角度` 在 `start_time` 合成初始状态；
    /// 启用图像时先采集一帧。之后每一步的时间戳取自 `clock`。
    pub fn new(
        link: DeviceLink<C>,
        mut camera: Option<ImagePipeline<S>>,
        state_builder: StateBuilder,
        clock: BoxedClock,
        start_time: DateTime<Utc>,
        panel_step: f64,
    ) -> Result<Self, ClientError> {
        let image = match camera.as_mut() {
            Some(pipeline) => {
                info!("Capturing initial frame from {}", pipeline.describe());
                Some(pipeline.capture()?)
            },
            None => None,
        };

        let now = start_time;
        let current = state_builder.build(PanelPose::single_axis(link.initial_angle()), image, now);
        info!(
            "Tracker ready: initial angle {}, sun azimuth {:.2}, altitude {:.2}",
            link.initial_angle(),
            current.sun_azimuth(),
            current.sun_altitude()
        );

        Ok(Self {
            link,
            camera,
            state_builder,
            clock,
            panel_step,
            now,
            current,
            phase: StepPhase::Idle,
        })
    }

    /// 执行动作并返回 reward
    ///
    /// 只允许在 IDLE（含 STALE）阶段调用。控制板返回空 reward 时返回 `0.0`，
    /// 不推进面板角度也不合成新状态。
    pub fn execute_action(&mut self, action: &ActionCommand) -> Result<f64, ClientError> {
        let from = self.phase.kind();
        self.phase.begin_execute().inspect_err(|e| {
            warn!("{}", e);
        })?;
        debug!("Phase {} -> {}", from, PhaseKind::Executing);

        match self.run_step(action) {
            Ok(StepOutcome::Advanced { reward, state }) => {
                info!(
                    "Action {} yielded reward {}, panel angle {}",
                    action,
                    reward,
                    state.panel().angle_ns
                );
                self.current = state.clone();
                self.phase.complete(state);
                debug!("Phase {} -> {}", PhaseKind::Executing, PhaseKind::Pending);
                Ok(reward)
            },
            Ok(StepOutcome::NoOutcome) => {
                info!("Action {} produced no outcome, state unchanged", action);
                self.phase.complete_without_outcome();
                debug!("Phase {} -> {}", PhaseKind::Executing, PhaseKind::Stale);
                Ok(0.0)
            },
            Err(e) => {
                self.phase.abort();
                debug!("Phase {} -> {} after error", PhaseKind::Executing, PhaseKind::Idle);
                Err(e)
            },
        }
    }

    /// 按符号执行动作（未知符号视为空操作）
    pub fn execute_symbol(&mut self, symbol: &str) -> Result<f64, ClientError> {
        self.execute_action(&ActionCommand::from_symbol_or_noop(symbol))
    }

    fn run_step(&mut self, action: &ActionCommand) -> Result<StepOutcome, ClientError> {
        let (reward, angle_ns) = match self.link.send_action(action, self.panel_step)? {
            StepResponse::Outcome { reward, angle } => (reward, angle),
            StepResponse::NoOutcome => return Ok(StepOutcome::NoOutcome),
        };

        let image = self.capture()?;
        self.now = self.clock.now();
        let state = self
            .state_builder
            .build(PanelPose::single_axis(angle_ns), image, self.now);
        Ok(StepOutcome::Advanced { reward, state })
    }

    fn capture(&mut self) -> Result<Option<ImageFeatures>, ClientError> {
        match self.camera.as_mut() {
            Some(pipeline) => Ok(Some(pipeline.capture()?)),
            None => Ok(None),
        }
    }

    /// 取回上一次 `execute_action` 产生的状态
    ///
    /// 只允许在 PENDING 阶段调用；空 reward 之后（STALE）返回上一次已知的状态。
    pub fn retrieve_state(&mut self) -> Result<WorldState, ClientError> {
        let from = self.phase.kind();
        let retrieved = self.phase.take().inspect_err(|e| {
            warn!("{}", e);
        })?;
        debug!("Phase {} -> {}", from, PhaseKind::Idle);

        Ok(match retrieved {
            Retrieved::Fresh(state) => state,
            Retrieved::Unchanged => self.current.clone(),
        })
    }

    /// 最近一次合成的状态（不改变阶段）
    pub fn current_state(&self) -> &WorldState {
        &self.current
    }

    /// 当前阶段
    pub fn phase(&self) -> PhaseKind {
        self.phase.kind()
    }

    /// 握手时控制板报告的初始角度
    pub fn initial_angle(&self) -> f64 {
        self.link.initial_angle()
    }

    pub fn panel_step(&self) -> f64 {
        self.panel_step
    }

    /// 内部时钟的年内日序
    pub fn day_of_year(&self) -> u32 {
        day_of_year(self.now)
    }

    /// 内部时钟
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// 可用动作
    pub fn actions(&self) -> [ActionCommand; 3] {
        ActionCommand::single_axis_actions()
    }

    /// 是否启用图像
    pub fn uses_image(&self) -> bool {
        self.camera.is_some()
    }

    /// 链路是否已失效
    pub fn is_link_failed(&self) -> bool {
        self.link.is_failed()
    }

    pub fn link(&self) -> &DeviceLink<C> {
        &self.link
    }
}

impl<C: SerialChannel, S: FrameSource> std::fmt::Debug for ControlStep<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlStep")
            .field("link", &self.link)
            .field("camera", &self.camera)
            .field("panel_step", &self.panel_step)
            .field("now", &self.now)
            .field("phase", &self.phase.kind())
            .finish_non_exhaustive()
    }
}
