//! 客户端接口模块
//!
//! 本模块提供太阳能跟踪器的上层接口，包括：
//! - 控制步状态机（`execute_action` / `retrieve_state` 严格交替）
//! - 世界状态合成（面板位姿 + 太阳位置 + 可选图像特征）
//! - 决策过程接口 [`Environment`]
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的模块。
//! 如果需要直接收发控制板命令，可以使用 `helio-driver` 的 `DeviceLink`。

pub mod builder;
pub mod environment;
pub mod error;
pub mod state;
pub mod tracker;

// 重新导出常用类型
pub use builder::TrackerBuilder;
pub use environment::Environment;
pub use error::ClientError;
pub use state::{
    ObjectClass, PanelPose, PhaseKind, StateBuilder, StateObject, SunObservation, WorldState,
};
pub use tracker::{BoxedClock, ControlStep, SolarTracker};
