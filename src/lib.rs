//! # PasteDrop — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 前端 (单页 dist/index.html)               │
//! │                                                          │
//! │  粘贴/拖放区 ── 预览 ── 重命名 ── 日期开关 ── 操作按钮     │
//! │       │  (invoke + image-intake-updated 事件)            │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC (Result<T, AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ intake ───── 单图接收状态机                           │
//! │  │   ├─ source          粘贴/拖放 → CandidateFile        │
//! │  │   ├─ manager         替换即释放 + generation 校验      │
//! │  │   ├─ handle          预览句柄创建/撤销                 │
//! │  │   ├─ export          另存为命名 / 剪贴板复制           │
//! │  │   └─ service         注入状态 + 异步尺寸解码           │
//! │  │                                                       │
//! │  └─ storage ──── 预览目录 (会话级，启动时清空)            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 Tauri command 的返回类型 |
//! | [`intake`] | 当前图片的完整生命周期：接收、预览、重命名、导出、删除 |
//! | [`storage`] | 预览文件目录的获取、创建与启动清理 |

pub mod error;
pub mod intake;
pub mod storage;
