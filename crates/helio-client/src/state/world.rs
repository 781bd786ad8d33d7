//! 世界状态快照
//!
//! 内部以固定结构保存（面板位姿、太阳观测、可选图像特征），
//! 需要"类别 → 对象 → 属性表"视图时通过 [`WorldState::objects`] 生成。

use chrono::{DateTime, Utc};
use helio_driver::ImageFeatures;
use helio_tools::SunPosition;
use std::collections::BTreeMap;
use std::fmt;

/// 面板位姿（弧度）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanelPose {
    /// 东西向角度（单轴跟踪器固定为 0）
    pub angle_ew: f64,
    /// 南北向角度（控制板反馈）
    pub angle_ns: f64,
}

impl PanelPose {
    /// 单轴位姿
    pub fn single_axis(angle_ns: f64) -> Self {
        Self {
            angle_ew: 0.0,
            angle_ns,
        }
    }
}

/// 太阳观测：位置 + 可选图像特征
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SunObservation {
    pub position: SunPosition,
    pub image: Option<ImageFeatures>,
}

/// 对象类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum ObjectClass {
    Agent,
    Sun,
    Time,
    WorldPosition,
    Panel,
}

impl ObjectClass {
    /// 声明的全部类别
    pub const ALL: [ObjectClass; 5] = [
        ObjectClass::Agent,
        ObjectClass::Sun,
        ObjectClass::Time,
        ObjectClass::WorldPosition,
        ObjectClass::Panel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Agent => "agent",
            ObjectClass::Sun => "sun",
            ObjectClass::Time => "time",
            ObjectClass::WorldPosition => "worldPosition",
            ObjectClass::Panel => "panel",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 属性名
pub mod attr {
    pub const ANGLE_EW: &str = "angle_ew";
    pub const ANGLE_NS: &str = "angle_ns";
    pub const ANGLE_AZ: &str = "angle_AZ";
    pub const ANGLE_ALT: &str = "angle_ALT";
    /// 像素属性前缀（`pix0..pixN-1`）
    pub const PIXEL_PREFIX: &str = "pix";
}

/// 带名字和属性表的对象
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StateObject {
    pub class: ObjectClass,
    pub name: String,
    pub attributes: BTreeMap<String, f64>,
}

impl StateObject {
    fn new(class: ObjectClass, name: &str) -> Self {
        Self {
            class,
            name: name.to_string(),
            attributes: BTreeMap::new(),
        }
    }

    fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// 读取属性
    pub fn attribute(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).copied()
    }

    /// 是否存在像素属性
    pub fn has_pixel_attributes(&self) -> bool {
        self.attributes.keys().any(|k| is_pixel_key(k))
    }
}

fn is_pixel_key(key: &str) -> bool {
    key.strip_prefix(attr::PIXEL_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// 世界状态
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldState {
    panel: PanelPose,
    sun: SunObservation,
    timestamp: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
}

impl WorldState {
    pub fn new(
        panel: PanelPose,
        sun: SunObservation,
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            panel,
            sun,
            timestamp,
            latitude,
            longitude,
        }
    }

    pub fn panel(&self) -> PanelPose {
        self.panel
    }

    pub fn sun(&self) -> &SunObservation {
        &self.sun
    }

    pub fn sun_position(&self) -> SunPosition {
        self.sun.position
    }

    /// 太阳方位角（度）
    pub fn sun_azimuth(&self) -> f64 {
        self.sun.position.azimuth
    }

    /// 太阳高度角（度）
    pub fn sun_altitude(&self) -> f64 {
        self.sun.position.altitude
    }

    pub fn image(&self) -> Option<&ImageFeatures> {
        self.sun.image.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// 类别 → 对象列表视图
    ///
    /// 所有声明类别都会出现；只有 `panel` 和 `sun` 含对象。
    pub fn objects(&self) -> BTreeMap<ObjectClass, Vec<StateObject>> {
        let mut objects: BTreeMap<ObjectClass, Vec<StateObject>> =
            ObjectClass::ALL.iter().map(|&class| (class, Vec::new())).collect();

        let panel = StateObject::new(ObjectClass::Panel, "panel")
            .with(attr::ANGLE_EW, self.panel.angle_ew)
            .with(attr::ANGLE_NS, self.panel.angle_ns);

        let mut sun = StateObject::new(ObjectClass::Sun, "sun")
            .with(attr::ANGLE_AZ, self.sun.position.azimuth)
            .with(attr::ANGLE_ALT, self.sun.position.altitude);
        if let Some(image) = &self.sun.image {
            for (i, &p) in image.pixels().iter().enumerate() {
                sun = sun.with(format!("{}{}", attr::PIXEL_PREFIX, i), f64::from(p));
            }
        }

        objects.entry(ObjectClass::Panel).or_default().push(panel);
        objects.entry(ObjectClass::Sun).or_default().push(sun);
        objects
    }

    /// 按类别和名字查找对象
    pub fn object(&self, class: ObjectClass, name: &str) -> Option<StateObject> {
        self.objects()
            .remove(&class)?
            .into_iter()
            .find(|o| o.name == name)
    }
}
