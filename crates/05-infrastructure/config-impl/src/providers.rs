//! 配置提供者实现

use crate::document::DescriptorDocument;
use config_abstractions::ConfigurationProvider;
use infrastructure_common::{
    ConfigError, ConfigurationElement, ConfigurationElements, ConversionResult, ParameterKind,
    PropertyTarget, PropertyType, PropertyValue,
};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// 内存配置提供者
///
/// 直接返回构造时给定的元素，主要用于测试和程序内装配。
#[derive(Debug, Clone)]
pub struct InMemoryConfigurationProvider {
    name: String,
    elements: ConfigurationElements,
}

impl InMemoryConfigurationProvider {
    /// 创建新的内存配置提供者
    pub fn new(elements: ConfigurationElements) -> Self {
        Self {
            name: "InMemoryConfigurationProvider".to_string(),
            elements,
        }
    }

    /// 设置提供者名称
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 追加元素
    pub fn with_element(mut self, element: impl Into<ConfigurationElement>) -> Self {
        self.elements.push(element);
        self
    }

    /// 追加设置项
    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.elements.push_setting(name, value);
        self
    }
}

impl Default for InMemoryConfigurationProvider {
    fn default() -> Self {
        Self::new(ConfigurationElements::new())
    }
}

impl PropertyTarget for InMemoryConfigurationProvider {}

impl ConfigurationProvider for InMemoryConfigurationProvider {
    fn get_elements(&self) -> Result<ConfigurationElements, ConfigError> {
        Ok(self.elements.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 描述符文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentFormat {
    Json,
    Toml,
}

/// 文件型提供者的共享状态
///
/// 路径可以在构造时给出，也可以通过 `Path` 属性设置；
/// 首次读取时加载并缓存，`reload` 时重新读取。
#[derive(Debug)]
struct DocumentFile {
    format: DocumentFormat,
    path: Option<PathBuf>,
    cache: RwLock<Option<ConfigurationElements>>,
}

impl DocumentFile {
    fn new(format: DocumentFormat, path: Option<PathBuf>) -> Self {
        Self {
            format,
            path,
            cache: RwLock::new(None),
        }
    }

    fn provider_name(&self) -> &'static str {
        match self.format {
            DocumentFormat::Json => "JsonConfigurationProvider",
            DocumentFormat::Toml => "TomlConfigurationProvider",
        }
    }

    fn read(&self) -> Result<ConfigurationElements, ConfigError> {
        let path = self.path.as_ref().ok_or_else(|| ConfigError::PathNotSet {
            provider: self.provider_name().to_string(),
        })?;
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        debug!("加载描述符文件: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let document = self.parse(&content).map_err(|source| {
            error!("描述符文件解析失败: {}, {}", path.display(), source);
            ConfigError::ParseError {
                path: path.display().to_string(),
                source,
            }
        })?;

        let elements = document.into_elements();
        debug!(
            "描述符文件加载完成: {}, 共 {} 个元素",
            path.display(),
            elements.len()
        );
        Ok(elements)
    }

    fn parse(
        &self,
        content: &str,
    ) -> Result<DescriptorDocument, Box<dyn std::error::Error + Send + Sync>> {
        match self.format {
            DocumentFormat::Json => Ok(serde_json::from_str(content)?),
            DocumentFormat::Toml => Ok(toml::from_str(content)?),
        }
    }

    fn elements(&self) -> Result<ConfigurationElements, ConfigError> {
        if let Some(elements) = self.cache.read().as_ref() {
            return Ok(elements.clone());
        }
        let elements = self.read()?;
        *self.cache.write() = Some(elements.clone());
        Ok(elements)
    }

    fn reload(&mut self) -> Result<(), ConfigError> {
        let elements = self.read()?;
        *self.cache.get_mut() = Some(elements);
        Ok(())
    }

    fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        *self.cache.get_mut() = None;
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn path_property_kind(name: &str) -> Option<ParameterKind> {
    name.eq_ignore_ascii_case("path")
        .then(<PathBuf as PropertyType>::kind)
}

fn set_path_property(
    file: &mut DocumentFile,
    name: &str,
    value: PropertyValue,
) -> ConversionResult<()> {
    if !name.eq_ignore_ascii_case("path") {
        return Err(infrastructure_common::ConversionError::UnknownProperty {
            property: name.to_string(),
        });
    }
    file.set_path(PathBuf::from_value(value)?);
    Ok(())
}

/// JSON 描述符文件提供者
#[derive(Debug)]
pub struct JsonConfigurationProvider {
    file: DocumentFile,
}

impl JsonConfigurationProvider {
    /// 创建并立即加载
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut provider = Self::unconfigured();
        provider.file.set_path(path.as_ref().to_path_buf());
        provider.file.reload()?;
        Ok(provider)
    }

    /// 创建未设置路径的提供者，路径由 `Path` 属性给出
    pub fn unconfigured() -> Self {
        Self {
            file: DocumentFile::new(DocumentFormat::Json, None),
        }
    }

    /// 文件路径
    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }
}

impl Default for JsonConfigurationProvider {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl PropertyTarget for JsonConfigurationProvider {
    fn property_kind(&self, name: &str) -> Option<ParameterKind> {
        path_property_kind(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> ConversionResult<()> {
        set_path_property(&mut self.file, name, value)
    }
}

impl ConfigurationProvider for JsonConfigurationProvider {
    fn get_elements(&self) -> Result<ConfigurationElements, ConfigError> {
        self.file.elements()
    }

    fn name(&self) -> &str {
        self.file.provider_name()
    }

    fn reload(&mut self) -> Result<(), ConfigError> {
        self.file.reload()
    }
}

/// TOML 描述符文件提供者
#[derive(Debug)]
pub struct TomlConfigurationProvider {
    file: DocumentFile,
}

impl TomlConfigurationProvider {
    /// 创建并立即加载
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut provider = Self::unconfigured();
        provider.file.set_path(path.as_ref().to_path_buf());
        provider.file.reload()?;
        Ok(provider)
    }

    /// 创建未设置路径的提供者，路径由 `Path` 属性给出
    pub fn unconfigured() -> Self {
        Self {
            file: DocumentFile::new(DocumentFormat::Toml, None),
        }
    }

    /// 文件路径
    pub fn path(&self) -> Option<&Path> {
        self.file.path()
    }
}

impl Default for TomlConfigurationProvider {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl PropertyTarget for TomlConfigurationProvider {
    fn property_kind(&self, name: &str) -> Option<ParameterKind> {
        path_property_kind(name)
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> ConversionResult<()> {
        set_path_property(&mut self.file, name, value)
    }
}

impl ConfigurationProvider for TomlConfigurationProvider {
    fn get_elements(&self) -> Result<ConfigurationElements, ConfigError> {
        self.file.elements()
    }

    fn name(&self) -> &str {
        self.file.provider_name()
    }

    fn reload(&mut self) -> Result<(), ConfigError> {
        self.file.reload()
    }
}

/// 按文件扩展名选择提供者
pub fn provider_for_path<P: AsRef<Path>>(
    path: P,
) -> Result<Box<dyn ConfigurationProvider>, ConfigError> {
    let path = path.as_ref();
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => {
            Ok(Box::new(TomlConfigurationProvider::new(path)?))
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            Ok(Box::new(JsonConfigurationProvider::new(path)?))
        }
        _ => Err(ConfigError::ProviderError {
            provider: "provider_for_path".to_string(),
            message: format!("不支持的描述符文件格式: {}", path.display()),
        }),
    }
}
