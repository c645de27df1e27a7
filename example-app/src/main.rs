//! # 示例应用程序
//!
//! 从描述符文件构建服务注册表，解析服务并读取业务规则。
//!
//! ```text
//! cd example-app && cargo run -- --descriptor config/services.toml
//! ```

mod domain;

use anyhow::Context;
use clap::Parser;
use di_abstractions::{BusinessRulesService, BusinessRulesServiceExt, RuleKey};
use di_impl::RuleSetService;
use domain::{BidFloorRule, CampaignRule, FrequencyCapRule, PacingService};
use infrastructure_composition::{RegistryBuilder, RegistrySettings, ServiceContext};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 未指定描述符文件时使用
const DEFAULT_DESCRIPTORS: &str = "config/services.toml";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 服务注册表示例")]
struct Args {
    /// 注册表设置文件，缺省时读取 config/registry.*（可选）
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// 描述符文件，可重复
    #[arg(short, long = "descriptor")]
    descriptors: Vec<PathBuf>,

    /// 日志过滤表达式，覆盖设置文件
    #[arg(long)]
    log_level: Option<String>,

    /// 输出 JSON 日志
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn settings(&self) -> anyhow::Result<RegistrySettings> {
        let mut settings = match &self.settings {
            Some(path) => RegistrySettings::load_from(path, true)
                .with_context(|| format!("读取设置文件 {}", path.display()))?,
            None => RegistrySettings::load()?,
        };
        if let Some(level) = &self.log_level {
            settings.log_filter = level.clone();
        }
        settings.json_logs |= self.json_logs;
        settings.descriptor_files.extend(self.descriptors.iter().cloned());
        if settings.descriptor_files.is_empty() {
            settings.descriptor_files.push(PathBuf::from(DEFAULT_DESCRIPTORS));
        }
        Ok(settings)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = args.settings()?;

    let registry = RegistryBuilder::new()
        .with_catalog(domain::catalog()?)
        .with_settings(&settings)?
        .install()
        .context("构建服务注册表")?;
    info!("启动 Lorn ADSP 示例应用, 注册表 {}", registry.id());

    demonstrate_services()?;
    demonstrate_rules()?;

    for service in registry.services() {
        info!(
            "服务 {} 键 {:?} 模块 {} 已构建 {}",
            service.canonical_key,
            service.keys,
            service.module,
            service.is_built()
        );
    }

    if let Some(registry) = ServiceContext::reset() {
        registry.clear();
    }
    info!("应用已关闭");
    Ok(())
}

/// 演示服务解析
fn demonstrate_services() -> anyhow::Result<()> {
    let registry = ServiceContext::current()?;
    let pacing = registry.get_as::<PacingService>("pacing")?;
    info!(
        "预算节奏: 日预算 {:.2} {}, 每小时 {:.2}, 地区 {}",
        pacing.daily_budget,
        pacing.currency,
        pacing.hourly_budget(),
        pacing.region.as_deref().unwrap_or("-")
    );

    let again = registry.get_as::<PacingService>("PacingService")?;
    info!("别名与类型名解析到同一实例: {}", Arc::ptr_eq(&again, &pacing));
    Ok(())
}

/// 演示业务规则读取
fn demonstrate_rules() -> anyhow::Result<()> {
    let registry = ServiceContext::current()?;
    let rules = registry.get_as::<RuleSetService>("BusinessRulesService")?;
    info!("已加载 {} 个业务规则", rules.loaded_rules().len());

    for key in CampaignRule::ALL {
        if rules.find_rule(&key.rule_key()).is_none() {
            warn!("规则未配置: {}", key.rule_key());
        }
    }

    let cap = rules.rule::<FrequencyCapRule, _>(CampaignRule::FrequencyCap)?;
    info!(
        "频次控制: {} 小时内最多 {} 次, 广告位 {:?}",
        cap.window_hours, cap.max_impressions, cap.placement
    );

    let floor = rules.rule::<BidFloorRule, _>(CampaignRule::BidFloor)?;
    info!("底价: {:.2} {}", floor.floor, floor.currency);
    Ok(())
}
