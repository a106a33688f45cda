//! # 配置模块
//!
//! ## 设计思路
//!
//! 将接收链路的可调策略集中到 `IntakeConfig`，保证运行时行为可观测、可测试。
//! 当前图片一次只存在一张，配置项刻意保持少量。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置。
//! - 体积上限对齐剪贴板/拖放场景的常见图片大小，防止异常输入占满内存。

/// 图片接收配置。
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// 候选文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 导出文件名是否默认附带日期前缀。
    pub default_include_date: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            default_include_date: true,
        }
    }
}
