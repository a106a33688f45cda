//! # 图片接收模块（intake）
//!
//! ## 设计思路
//!
//! 该模块将“输入事件规整 → 接收校验 → 预览句柄 → 元数据 → 导出动作”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装）
//! - `service`：承载可注入状态（`IntakeServiceState`）与异步尺寸解码
//! - `manager`：单图生命周期状态机（接收、替换即释放、删除）
//! - `source`：粘贴/拖放适配器与候选文件模型
//! - `handle`：预览句柄仓库（创建与撤销的唯一所有者）
//! - `export`：另存为命名与剪贴板复制
//! - `format`：体积与日期文件名纯函数
//! - `config/error`：配置与错误模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 前端 invoke / 原生拖放事件
//!    ↓
//! commands.rs（参数适配）
//!    ↓
//! service.rs（State 注入、串行化、快照广播）
//!    ↓
//! manager.rs（状态转移 + generation 校验）
//!    ├─ source.rs（粘贴/拖放 → CandidateFile）
//!    ├─ handle.rs（预览文件写入与撤销）
//!    ├─ format.rs（体积/日期命名）
//!    └─ export.rs（另存为 + 剪贴板）
//!    ↓
//! 返回 StateSnapshot / AppError 给前端
//! ```

pub mod commands;
mod config;
mod error;
mod export;
mod format;
mod handle;
mod manager;
mod service;
mod source;
#[cfg(test)]
mod test_util;

pub use config::IntakeConfig;
pub use error::IntakeError;
pub use export::{DownloadRequest, PreparedClipboardImage, write_to_clipboard};
pub use format::{date_file_name, format_bytes};
pub use handle::{HandleStore, PreviewHandle};
pub use manager::{ImageMetadata, ImageView, IntakeManager, IntakeTicket, StateSnapshot};
pub use service::{IntakeServiceState, STATE_EVENT};
pub use source::{
    CandidateFile, PastedItem, candidate_from_dropped_paths, candidate_from_pasted_items,
};
