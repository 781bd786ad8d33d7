//! 协议常量定义

/// 握手令牌（4 字节，不带换行）
pub const INIT_TOKEN: &[u8; 4] = b"INIT";

/// 握手应答前缀
pub const HANDSHAKE_REPLY_PREFIX: &str = "RECV";

/// 单步移动命令前缀（后跟带符号弧度）
pub const STEP_COMMAND_PREFIX: char = 'S';

/// 空操作命令
pub const NO_OP_COMMAND: &str = "N";

/// 绝对位置命令的保留前缀
pub const ABSOLUTE_COMMAND_PREFIX: char = 'P';

/// 应答字段分隔符
pub const FIELD_SEPARATOR: char = ',';

/// 默认单步角度增量（弧度）
pub const DEFAULT_PANEL_STEP_RAD: f64 = 0.1;

/// 默认串口路径（按平台）
#[cfg(target_os = "linux")]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";
#[cfg(target_os = "macos")]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/cu.usbmodem14101";
#[cfg(target_os = "windows")]
pub const DEFAULT_SERIAL_PORT: &str = "COM3";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// 默认波特率（Arduino 固件）
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// 默认应答超时（秒）
///
/// 控制板执行一次转动并测量输出功率后才应答，可能需要较长时间。
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 120;
