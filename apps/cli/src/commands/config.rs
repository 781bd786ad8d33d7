//! 配置管理命令

use anyhow::Result;
use clap::Subcommand;

use crate::settings::SettingsArgs;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 打印生效配置（TOML）
    Show,

    /// 校验配置
    Check,

    /// 打印配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(&self, settings: &SettingsArgs) -> Result<()> {
        match self {
            ConfigCommand::Show => {
                let config = settings.load()?;
                print!("{}", config.to_toml_string()?);
            },

            ConfigCommand::Check => {
                let path = settings.config_path()?;
                let config = settings.load()?;
                println!("✅ Configuration OK ({})", path.display());
                println!("  serialPort: {}", config.serial_port);
                println!(
                    "  site: {:.4}, {:.4}",
                    config.latitude_degrees, config.longitude_degrees
                );
                if config.use_image {
                    println!(
                        "  image: {}x{} ({} features)",
                        config.downsample_width,
                        config.downsample_height,
                        config.image_feature_len()
                    );
                } else {
                    println!("  image: disabled");
                }
            },

            ConfigCommand::Path => {
                println!("{}", settings.config_path()?.display());
            },
        }
        Ok(())
    }
}
