//! 配置解析
//!
//! 配置文件 → 命令行覆盖 → 校验。

use anyhow::{Context, Result, bail};
use clap::Args;
use helio_tools::TrackerConfig;
use std::path::PathBuf;

/// 默认配置文件路径：`<config_dir>/helio/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Cannot determine the platform config directory")?;
    path.push("helio");
    path.push("config.toml");
    Ok(path)
}

/// 全局配置参数
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// 配置文件路径（默认 <config_dir>/helio/config.toml）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 串口（覆盖配置）
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// 波特率（覆盖配置）
    #[arg(short, long, global = true)]
    pub baud: Option<u32>,

    /// 站点纬度（覆盖配置）
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    /// 站点经度（覆盖配置）
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// 静态图像帧源（覆盖配置）
    #[arg(long, global = true)]
    pub image: Option<PathBuf>,

    /// 禁用图像采集
    #[arg(long, global = true)]
    pub no_image: bool,
}

impl SettingsArgs {
    /// 生效的配置文件路径
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => default_config_path(),
        }
    }

    /// 加载配置并应用命令行覆盖
    pub fn load(&self) -> Result<TrackerConfig> {
        let path = self.config_path()?;

        let mut config = if path.exists() {
            TrackerConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        } else if self.config.is_some() {
            bail!("Config file {} does not exist", path.display());
        } else {
            match (self.latitude, self.longitude) {
                (Some(lat), Some(lon)) => TrackerConfig::new(lat, lon),
                _ => bail!(
                    "No config file at {}; pass --latitude and --longitude or create one",
                    path.display()
                ),
            }
        };

        self.apply(&mut config);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    fn apply(&self, config: &mut TrackerConfig) {
        if let Some(port) = &self.port {
            config.serial_port = port.clone();
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(lat) = self.latitude {
            config.latitude_degrees = lat;
        }
        if let Some(lon) = self.longitude {
            config.longitude_degrees = lon;
        }
        if let Some(image) = &self.image {
            config.image_path = Some(image.clone());
        }
        if self.no_image {
            config.use_image = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        TrackerConfig::new(10.0, 20.0).save_to_file(&path).unwrap();

        let args = SettingsArgs {
            config: Some(path),
            port: Some("/dev/ttyUSB7".to_string()),
            no_image: true,
            ..Default::default()
        };
        let config = args.load().unwrap();
        assert_eq!(config.serial_port, "/dev/ttyUSB7");
        assert!(!config.use_image);
        assert_eq!(config.latitude_degrees, 10.0);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let args = SettingsArgs {
            config: Some(PathBuf::from("/nonexistent/helio.toml")),
            latitude: Some(1.0),
            longitude: Some(2.0),
            ..Default::default()
        };
        assert!(args.load().is_err());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        TrackerConfig::new(10.0, 20.0).save_to_file(&path).unwrap();

        let args = SettingsArgs {
            config: Some(path),
            latitude: Some(120.0),
            ..Default::default()
        };
        assert!(args.load().is_err());
    }
}
