//! # Tauri 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `IntakeServiceState`，保持命令函数薄、稳定、易测试。
//!
//! 剪贴板复制失败按约定只记录日志、不向前端抛错；
//! 另存为通过系统保存对话框完成，取消对话框不是错误。

use std::path::PathBuf;

use tauri::{AppHandle, State, Wry};
use tauri_plugin_dialog::DialogExt;

use crate::error::AppError;

use super::manager::StateSnapshot;
use super::service::IntakeServiceState;
use super::source::PastedItem;

/// 接收前端粘贴事件携带的剪贴板条目。
#[tauri::command]
pub async fn intake_pasted_items(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
    items: Vec<PastedItem>,
) -> Result<StateSnapshot, AppError> {
    Ok(state.intake_pasted_items(&app, items)?)
}

/// 接收拖放的文件路径（前端转发或原生事件兜底用）。
#[tauri::command]
pub async fn intake_dropped_paths(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
    paths: Vec<String>,
) -> Result<StateSnapshot, AppError> {
    let paths: Vec<PathBuf> = paths.into_iter().map(PathBuf::from).collect();
    Ok(state.intake_dropped_paths(&app, paths)?)
}

/// 设置拖拽悬停标志。
#[tauri::command]
pub fn set_dragging(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
    dragging: bool,
) -> Result<StateSnapshot, AppError> {
    Ok(state.set_dragging(&app, dragging)?)
}

/// 重命名当前图片。
#[tauri::command]
pub fn update_image_name(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
    name: String,
) -> Result<StateSnapshot, AppError> {
    Ok(state.update_name(&app, name)?)
}

/// 切换导出文件名的日期开关。
#[tauri::command]
pub fn set_include_date(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
    include_date: bool,
) -> Result<StateSnapshot, AppError> {
    Ok(state.set_include_date(&app, include_date)?)
}

/// 查询当前状态快照。
#[tauri::command]
pub fn get_intake_snapshot(
    state: State<'_, IntakeServiceState>,
) -> Result<StateSnapshot, AppError> {
    Ok(state.snapshot()?)
}

/// 删除当前图片。
#[tauri::command]
pub fn delete_image(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
) -> Result<StateSnapshot, AppError> {
    Ok(state.delete_image(&app)?)
}

/// 另存当前图片：弹出保存对话框，文件名由重命名与日期开关决定。
///
/// 返回保存后的路径；无图片或用户取消时返回 `Ok(None)`。
#[tauri::command]
pub async fn download_image(
    state: State<'_, IntakeServiceState>,
    app: AppHandle<Wry>,
) -> Result<Option<String>, AppError> {
    let Some(request) = state.download_request()? else {
        log::debug!("💾 无当前图片，另存为无操作");
        return Ok(None);
    };

    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_file_name(&request.file_name)
        .save_file(move |picked| {
            let _ = tx.send(picked);
        });

    let picked = rx
        .await
        .map_err(|_| AppError::Dialog("保存对话框结果通道中断".to_string()))?;

    let Some(file_path) = picked else {
        log::debug!("💾 用户取消另存为");
        return Ok(None);
    };

    let path = file_path
        .as_path()
        .map(|path| path.to_path_buf())
        .ok_or_else(|| AppError::Dialog("保存对话框返回了不受支持的路径".to_string()))?;

    std::fs::write(&path, &request.bytes)?;
    log::info!("💾 图片已保存：{}（{} 字节）", path.display(), request.bytes.len());
    Ok(Some(path.to_string_lossy().to_string()))
}

/// 复制当前图片到系统剪贴板。
///
/// 写入失败只记录日志，前端始终收到 `Ok`（失败时界面无可见反馈）。
#[tauri::command]
pub async fn copy_image(state: State<'_, IntakeServiceState>) -> Result<(), AppError> {
    if let Err(e) = state.copy_current() {
        log::warn!("⚠️ 复制图片到剪贴板失败: {}", e);
    }
    Ok(())
}
