//! 世界状态、状态合成与控制步状态机

pub mod builder;
pub mod machine;
pub mod world;

pub use builder::{BoxedSunProvider, StateBuilder};
pub use machine::{PhaseKind, Retrieved, StepPhase};
pub use world::{ObjectClass, PanelPose, StateObject, SunObservation, WorldState, attr};
