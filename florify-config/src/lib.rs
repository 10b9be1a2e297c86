use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// 指定配置文件路径的环境变量。
pub const CONFIG_ENV: &str = "FLORIFY_CONFIG";

/// 应用配置的根结构。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// 从显式路径加载配置。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 自动发现配置文件：优先读取环境变量 `FLORIFY_CONFIG`，否则寻找 `./config/default.toml`。
    /// 若文件缺失，则返回默认配置。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "获取当前工作目录失败".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// 日志配置，支持设置默认等级。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 新建文档的页面尺寸，默认 A4 竖版。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageConfig {
    #[serde(default = "PageConfig::default_width")]
    pub width: f64,
    #[serde(default = "PageConfig::default_height")]
    pub height: f64,
    #[serde(default = "PageConfig::default_unit")]
    pub unit: String,
}

impl PageConfig {
    fn default_width() -> f64 {
        210.0
    }

    fn default_height() -> f64 {
        297.0
    }

    fn default_unit() -> String {
        "mm".to_string()
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            unit: Self::default_unit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_grid_size")]
    pub grid_size: f64,
    #[serde(default = "EditorConfig::default_snap")]
    pub snap_to_grid: bool,
    #[serde(default = "EditorConfig::default_hit_tolerance")]
    pub hit_tolerance: f64,
    /// 每文档单位对应的显示像素，3.78 即 96 DPI 下的 px/mm。
    #[serde(default = "EditorConfig::default_display_scale")]
    pub display_scale: f64,
}

impl EditorConfig {
    fn default_grid_size() -> f64 {
        10.0
    }

    fn default_snap() -> bool {
        true
    }

    fn default_hit_tolerance() -> f64 {
        5.0
    }

    fn default_display_scale() -> f64 {
        3.78
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: Self::default_grid_size(),
            snap_to_grid: Self::default_snap(),
            hit_tolerance: Self::default_hit_tolerance(),
            display_scale: Self::default_display_scale(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub blueprint_path: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件 {path:?} 失败: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
