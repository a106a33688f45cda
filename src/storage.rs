//! 预览存储目录管理模块
//!
//! # 设计思路
//!
//! 统一管理当前图片预览文件所在目录。预览文件是会话级资源，
//! 不做跨启动持久化，应用启动时清空上次残留。
//!
//! # 实现思路
//!
//! - 目录固定在应用缓存目录下的 `previews` 子目录，
//!   与 asset 协议的 `$APPCACHE` 范围对齐。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tauri::AppHandle;
use tauri::Manager;

use crate::error::AppError;

/// 存储目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取预览文件目录
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的预览目录
/// - `Err(AppError::Storage)` — 无法获取或创建目录
pub fn get_preview_dir(app: &AppHandle) -> Result<PathBuf, AppError> {
    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| AppError::Storage(format!("获取应用缓存目录失败: {}", e)))?;

    let preview_dir = cache_dir.join("previews");
    if !preview_dir.exists() {
        fs::create_dir_all(&preview_dir)
            .map_err(|e| AppError::Storage(format!("创建预览目录失败: {}", e)))?;
    }
    Ok(preview_dir)
}

/// 清空预览目录中的残留文件（应用启动时调用）。
///
/// 单个文件删除失败只记录警告，不中断启动。
pub fn clear_preview_dir(app: &AppHandle) -> Result<(), AppError> {
    let dir = get_preview_dir(app)?;
    let entries = fs::read_dir(&dir)
        .map_err(|e| AppError::Storage(format!("读取预览目录失败: {}", e)))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Err(e) = fs::remove_file(&path) {
                log::warn!("清理残留预览文件失败（{}）: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

/// 获取预览目录信息（路径 + 占用大小 + 文件数）
#[tauri::command]
pub fn get_preview_dir_info(app: AppHandle) -> Result<StorageInfo, AppError> {
    let dir = get_preview_dir(&app)?;
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if dir.exists() {
        if let Ok(entries) = fs::read_dir(&dir) {
            for entry in entries.flatten() {
                if let Ok(metadata) = entry.metadata() {
                    if metadata.is_file() {
                        total_size += metadata.len();
                        file_count += 1;
                    }
                }
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}
