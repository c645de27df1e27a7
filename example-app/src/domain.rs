//! 示例领域：预算节奏服务与投放规则

use component_macros::{Properties, PropertyEnum, RuleKey};
use config_abstractions::ConfigurationProvider;
use config_impl::{JsonConfigurationProvider, TomlConfigurationProvider};
use di_abstractions::{BusinessRule, Service, ServiceBase};
use di_impl::{ProviderType, RuleSetService, RuleType, ServiceType, TypeCatalog};
use infrastructure_common::{BoxError, ConfigurationElements, LoadResult, ParameterKind};
use std::sync::Arc;

/// 预算节奏服务
#[derive(Debug, Default, Properties)]
pub struct PacingService {
    pub daily_budget: f64,
    pub currency: String,
    #[property(skip)]
    base: ServiceBase,
    #[property(skip)]
    pub region: Option<String>,
}

impl PacingService {
    /// 每小时预算
    pub fn hourly_budget(&self) -> f64 {
        self.daily_budget / 24.0
    }
}

impl Service for PacingService {
    fn register_configuration_provider(&mut self, provider: Box<dyn ConfigurationProvider>) {
        self.base.register(provider);
    }

    fn configuration_providers(&self) -> &[Box<dyn ConfigurationProvider>] {
        self.base.providers()
    }

    fn load_elements(&mut self, elements: ConfigurationElements) -> Result<(), BoxError> {
        self.region = elements.setting("region").map(str::to_string);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PropertyEnum)]
pub enum Placement {
    Banner,
    Interstitial,
    Native,
}

/// 投放规则键
#[derive(Debug, Clone, Copy, RuleKey)]
pub enum CampaignRule {
    FrequencyCap,
    BidFloor,
}

impl CampaignRule {
    pub const ALL: [CampaignRule; 2] = [CampaignRule::FrequencyCap, CampaignRule::BidFloor];
}

/// 频次控制
#[derive(Debug, Clone, Default, Properties)]
pub struct FrequencyCapRule {
    pub max_impressions: u32,
    pub window_hours: u32,
    pub placement: Option<Placement>,
}

impl BusinessRule for FrequencyCapRule {
    fn clone_rule(&self) -> Option<Box<dyn BusinessRule>> {
        Some(Box::new(self.clone()))
    }
}

/// 底价
#[derive(Debug, Default, Properties)]
pub struct BidFloorRule {
    pub floor: f64,
    pub currency: String,
}

impl BusinessRule for BidFloorRule {}

/// 示例程序的类型目录
pub fn catalog() -> LoadResult<Arc<TypeCatalog>> {
    TypeCatalog::builder()
        .with_service(ServiceType::of::<PacingService>("PacingService").in_module("pacing"))
        .with_service(RuleSetService::catalog_entry("RuleSetService"))
        .with_provider(ProviderType::of::<TomlConfigurationProvider>(
            "TomlConfigurationProvider",
        ))
        .with_provider(ProviderType::of::<JsonConfigurationProvider>(
            "JsonConfigurationProvider",
        ))
        .with_rule(RuleType::of::<FrequencyCapRule>("FrequencyCapRule"))
        .with_rule(RuleType::new("BidFloorRule").with_constructor(
            vec![ParameterKind::Float],
            |args| {
                Ok(Box::new(BidFloorRule {
                    floor: args.get(0)?,
                    ..BidFloorRule::default()
                }))
            },
        ))
        .with_enum::<Placement>()
        .build()
}
