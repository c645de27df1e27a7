//! 组件生命周期管理

use std::sync::atomic::{AtomicBool, Ordering};

/// 可释放资源的组件
///
/// 规则注册表清空或关闭时，对支持释放的条目调用 [`Disposable::dispose`]。
pub trait Disposable: Send + Sync {
    /// 释放资源，可能被调用多次，实现应保证幂等
    fn dispose(&self);
}

/// 释放标记
///
/// 记录组件是否已经释放，用于保证释放逻辑只执行一次。
#[derive(Debug, Default)]
pub struct DisposeFlag {
    disposed: AtomicBool,
}

impl DisposeFlag {
    /// 创建新的释放标记
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记为已释放，首次调用返回 `true`
    pub fn mark(&self) -> bool {
        !self.disposed.swap(true, Ordering::AcqRel)
    }

    /// 是否已释放
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
