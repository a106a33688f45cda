// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # PasteDrop — 应用入口
//!
//! 本文件仅负责应用初始化、插件/命令注册与原生拖放事件接线。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use pastedrop::{intake, storage};
use tauri::{DragDropEvent, Manager, WindowEvent};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        // 插件初始化
        .plugin(tauri_plugin_dialog::init())
        // 应用设置
        .setup(|app| {
            log::info!("setup: begin");
            let handle = app.handle().clone();

            // 预览文件是会话级资源，启动时清掉上次残留
            if let Err(err) = storage::clear_preview_dir(&handle) {
                log::warn!("setup: 清理预览目录失败，继续启动: {err}");
            }

            match storage::get_preview_dir(&handle) {
                Ok(preview_dir) => match intake::IntakeServiceState::new(preview_dir) {
                    Ok(service) => {
                        app.manage(service);
                        log::info!("setup: intake service managed");
                    }
                    Err(err) => {
                        log::error!("setup: 图片接收服务初始化失败，应用将以受限模式运行: {err}");
                    }
                },
                Err(err) => {
                    log::error!("setup: 预览目录不可用，应用将以受限模式运行: {err}");
                }
            }

            log::info!("setup: complete");
            Ok(())
        })
        // 原生拖放事件：悬停标志 + 落下文件转入接收链路
        .on_window_event(|window, event| {
            let WindowEvent::DragDrop(drag_event) = event else {
                return;
            };

            let app = window.app_handle().clone();
            let Some(service) = app.try_state::<intake::IntakeServiceState>() else {
                return;
            };

            match drag_event {
                DragDropEvent::Enter { .. } => {
                    if let Err(err) = service.set_dragging(&app, true) {
                        log::warn!("设置拖拽标志失败: {err}");
                    }
                }
                DragDropEvent::Leave => {
                    if let Err(err) = service.set_dragging(&app, false) {
                        log::warn!("复位拖拽标志失败: {err}");
                    }
                }
                DragDropEvent::Drop { paths, .. } => {
                    if let Err(err) = service.intake_dropped_paths(&app, paths.clone()) {
                        log::warn!("处理拖放文件失败: {err}");
                    }
                }
                // Over 期间标志已由 Enter 置位，保持即可
                _ => {}
            }
        })
        // 注册所有 Tauri 命令
        .invoke_handler(tauri::generate_handler![
            // 图片接收
            intake::commands::intake_pasted_items,
            intake::commands::intake_dropped_paths,
            intake::commands::set_dragging,
            intake::commands::get_intake_snapshot,
            // 重命名与导出
            intake::commands::update_image_name,
            intake::commands::set_include_date,
            intake::commands::download_image,
            intake::commands::copy_image,
            intake::commands::delete_image,
            // 存储目录信息
            storage::get_preview_dir_info,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
