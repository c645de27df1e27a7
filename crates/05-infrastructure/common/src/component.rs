//! 组件基础接口定义
//!
//! 服务、工厂和规则在注册表中以 trait 对象保存，需要时再还原为具体类型。

use std::any::Any;
use std::sync::Arc;

/// 类型擦除辅助 trait
///
/// 对所有 `Any + Send + Sync` 类型自动实现，作为 trait 对象的超 trait
/// 使用，从而可以把 `Arc<dyn Service>` 等还原为具体类型。
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    fn into_any_box(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

    /// 具体类型名
    fn concrete_type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn into_any_box(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn concrete_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// 取类型名的最后一段（不含模块路径）
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
