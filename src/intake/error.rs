//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片接收链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 图片接收统一错误类型。
///
/// 该类型会在命令层被上转为 `AppError`，最终透传给前端。
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("剪贴板错误：{0}")]
    Clipboard(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("状态错误：{0}")]
    State(String),
}

impl From<IntakeError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: IntakeError) -> Self {
        error.to_string()
    }
}
