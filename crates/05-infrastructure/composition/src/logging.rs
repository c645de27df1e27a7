//! 日志初始化

use crate::errors::{CompositionError, CompositionResult};
use once_cell::sync::OnceCell;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

static LOGGING_INITIALIZED: OnceCell<bool> = OnceCell::new();

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 过滤表达式，例如 `info,di_impl=debug`
    pub filter: String,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            filter: "info".to_string(),
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }
}

/// 初始化全局日志订阅者
///
/// 每个进程只尝试一次。返回本次调用是否安装了订阅者；
/// 已有其他订阅者时不会报错。
pub fn init_logging(config: &LoggingConfig) -> CompositionResult<bool> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|e| CompositionError::Logging {
        message: format!("无效的过滤表达式 {:?}: {}", config.filter, e),
    })?;

    let mut installed_now = false;
    let installed = *LOGGING_INITIALIZED.get_or_init(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_target)
            .with_thread_ids(config.show_thread_ids)
            .with_file(config.show_file)
            .with_line_number(config.show_line_number);

        let result = if config.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        installed_now = result.is_ok();
        installed_now
    });

    if installed_now {
        info!("日志系统初始化完成");
    } else {
        debug!("日志系统已初始化, 跳过 (本进程安装: {})", installed);
    }
    Ok(installed_now)
}
