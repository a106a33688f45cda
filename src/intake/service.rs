//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `IntakeServiceState` 作为 Tauri 注入状态，替代全局单例。
//! 好处：
//! 1. 生命周期清晰（由 `main.rs` 统一管理）
//! 2. 测试可创建独立实例，减少共享状态副作用
//! 3. 粘贴命令与原生拖放事件共用同一入口
//!
//! ## 实现思路
//!
//! - 状态机本体由 `Mutex` 保护，命令层与拖放事件都经由这里串行化。
//! - 尺寸解码在阻塞线程池读取预览文件头，完成后携带 generation 回写，
//!   过期结果在状态机里被丢弃。
//! - 每次状态转移后向前端广播 `image-intake-updated` 快照事件。

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tauri::{AppHandle, Emitter, Wry};

use super::manager::{IntakeManager, IntakeTicket, StateSnapshot};
use super::source::{self, CandidateFile, PastedItem};
use super::{DownloadRequest, IntakeConfig, IntakeError, export};

/// 状态快照广播事件名。
pub const STATE_EVENT: &str = "image-intake-updated";

/// 图片接收服务状态。
///
/// 作为 Tauri `State` 注入到命令层，内部持有 `IntakeManager`。
pub struct IntakeServiceState {
    manager: Arc<Mutex<IntakeManager>>,
}

impl IntakeServiceState {
    /// 使用默认配置创建服务状态。
    pub fn new(preview_dir: PathBuf) -> Result<Self, IntakeError> {
        Self::with_config(IntakeConfig::default(), preview_dir)
    }

    /// 使用自定义配置创建服务状态，主要用于测试。
    pub fn with_config(config: IntakeConfig, preview_dir: PathBuf) -> Result<Self, IntakeError> {
        let manager = IntakeManager::new(config, preview_dir)?;
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, IntakeManager>, IntakeError> {
        self.manager
            .lock()
            .map_err(|_| IntakeError::State("状态机锁已中毒".to_string()))
    }

    /// 粘贴入口：从剪贴板条目中选图并接收。
    ///
    /// 没有图片条目时保持状态不变，直接返回当前快照。
    pub fn intake_pasted_items(
        &self,
        app: &AppHandle<Wry>,
        items: Vec<PastedItem>,
    ) -> Result<StateSnapshot, IntakeError> {
        let max_file_size = self.lock()?.config().max_file_size;

        match source::candidate_from_pasted_items(&items, max_file_size)? {
            Some(candidate) => self.intake_candidate(app, candidate),
            None => {
                log::debug!("📋 粘贴内容不含图片条目，忽略");
                self.snapshot()
            }
        }
    }

    /// 拖放入口：先复位拖拽标志，再尝试接收第一个图片文件。
    ///
    /// 非图片或空列表只复位标志，状态保持不变。
    pub fn intake_dropped_paths(
        &self,
        app: &AppHandle<Wry>,
        paths: Vec<PathBuf>,
    ) -> Result<StateSnapshot, IntakeError> {
        let max_file_size = {
            let mut manager = self.lock()?;
            manager.set_dragging(false);
            manager.config().max_file_size
        };

        match source::candidate_from_dropped_paths(&paths, max_file_size)? {
            Some(candidate) => self.intake_candidate(app, candidate),
            None => {
                let snapshot = self.snapshot()?;
                Self::emit_state(app, &snapshot);
                Ok(snapshot)
            }
        }
    }

    /// 接收已规整的候选文件并启动异步尺寸解码。
    pub fn intake_candidate(
        &self,
        app: &AppHandle<Wry>,
        candidate: CandidateFile,
    ) -> Result<StateSnapshot, IntakeError> {
        let (ticket, snapshot) = {
            let mut manager = self.lock()?;
            let ticket = manager.intake(candidate)?;
            (ticket, manager.snapshot())
        };

        Self::emit_state(app, &snapshot);
        self.spawn_dimension_probe(app, ticket);
        Ok(snapshot)
    }

    /// 设置拖拽悬停标志。
    pub fn set_dragging(
        &self,
        app: &AppHandle<Wry>,
        dragging: bool,
    ) -> Result<StateSnapshot, IntakeError> {
        let snapshot = {
            let mut manager = self.lock()?;
            manager.set_dragging(dragging);
            manager.snapshot()
        };
        Self::emit_state(app, &snapshot);
        Ok(snapshot)
    }

    /// 重命名当前图片；无图片时为无操作。
    pub fn update_name(
        &self,
        app: &AppHandle<Wry>,
        name: String,
    ) -> Result<StateSnapshot, IntakeError> {
        let snapshot = {
            let mut manager = self.lock()?;
            manager.update_name(name);
            manager.snapshot()
        };
        Self::emit_state(app, &snapshot);
        Ok(snapshot)
    }

    /// 切换导出文件名的日期开关。
    pub fn set_include_date(
        &self,
        app: &AppHandle<Wry>,
        include_date: bool,
    ) -> Result<StateSnapshot, IntakeError> {
        let snapshot = {
            let mut manager = self.lock()?;
            manager.set_include_date(include_date);
            manager.snapshot()
        };
        Self::emit_state(app, &snapshot);
        Ok(snapshot)
    }

    /// 删除当前图片；反复调用等价于一次。
    pub fn delete_image(&self, app: &AppHandle<Wry>) -> Result<StateSnapshot, IntakeError> {
        let snapshot = {
            let mut manager = self.lock()?;
            manager.delete_image();
            manager.snapshot()
        };
        Self::emit_state(app, &snapshot);
        Ok(snapshot)
    }

    /// 当前状态快照。
    pub fn snapshot(&self) -> Result<StateSnapshot, IntakeError> {
        Ok(self.lock()?.snapshot())
    }

    /// 以本地日期组装另存为请求；无图片时返回 `Ok(None)`。
    pub fn download_request(&self) -> Result<Option<DownloadRequest>, IntakeError> {
        let date = chrono::Local::now().date_naive();
        Ok(self.lock()?.download_request(date))
    }

    /// 把当前图片复制到系统剪贴板；无图片时为无操作。
    ///
    /// RGBA 转换在锁内完成，剪贴板写入在锁外执行，避免持锁等待系统剪贴板。
    pub fn copy_current(&self) -> Result<(), IntakeError> {
        let prepared = self.lock()?.prepare_clipboard_image()?;
        let Some(prepared) = prepared else {
            log::debug!("📋 无当前图片，复制为无操作");
            return Ok(());
        };

        export::write_to_clipboard(prepared)?;
        log::info!("📋 当前图片已复制到剪贴板");
        Ok(())
    }

    /// 后台探测预览文件尺寸，完成后按 generation 回写并广播新快照。
    fn spawn_dimension_probe(&self, app: &AppHandle<Wry>, ticket: IntakeTicket) {
        let manager = Arc::clone(&self.manager);
        let app = app.clone();

        tauri::async_runtime::spawn(async move {
            let path = ticket.preview_path.clone();
            let probed =
                tauri::async_runtime::spawn_blocking(move || probe_dimensions(&path)).await;

            let (width, height) = match probed {
                Ok(Ok(dimensions)) => dimensions,
                Ok(Err(e)) => {
                    // 解码失败不产生错误态，尺寸保持缺省
                    log::warn!("⚠️ 尺寸解码失败（第 {} 代）：{}", ticket.generation, e);
                    return;
                }
                Err(e) => {
                    log::warn!("⚠️ 尺寸解码任务中断（第 {} 代）：{}", ticket.generation, e);
                    return;
                }
            };

            let snapshot = match manager.lock() {
                Ok(mut manager) => {
                    if manager.apply_dimensions(ticket.generation, width, height) {
                        Some(manager.snapshot())
                    } else {
                        None
                    }
                }
                Err(_) => {
                    log::warn!("⚠️ 尺寸回写失败：状态机锁已中毒");
                    None
                }
            };

            if let Some(snapshot) = snapshot {
                Self::emit_state(&app, &snapshot);
            }
        });
    }

    fn emit_state(app: &AppHandle<Wry>, snapshot: &StateSnapshot) {
        if let Err(e) = app.emit(STATE_EVENT, snapshot) {
            log::warn!("⚠️ 广播状态快照失败: {}", e);
        }
    }
}

/// 只读文件头，探测图片尺寸（不做完整解码）。
fn probe_dimensions(path: &std::path::Path) -> Result<(u32, u32), IntakeError> {
    let reader = image::ImageReader::open(path)
        .map_err(|e| IntakeError::FileSystem(format!("打开预览文件失败：{}", e)))?
        .with_guessed_format()
        .map_err(|e| IntakeError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| IntakeError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::test_util::TINY_PNG;

    #[test]
    fn service_starts_with_empty_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let service = IntakeServiceState::new(dir.path().to_path_buf()).expect("service init");

        let snapshot = service.snapshot().expect("snapshot should succeed");
        assert!(snapshot.image.is_none());
        assert!(!snapshot.dragging);
        assert!(snapshot.include_date);
    }

    #[test]
    fn download_request_is_none_without_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let service = IntakeServiceState::new(dir.path().to_path_buf()).expect("service init");
        assert!(
            service
                .download_request()
                .expect("request should succeed")
                .is_none()
        );
    }

    #[test]
    fn probe_dimensions_reads_header_only() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pixel.png");
        std::fs::write(&path, TINY_PNG).expect("write test image");

        let (width, height) = probe_dimensions(&path).expect("probe should succeed");
        assert_eq!((width, height), (1, 1));
    }

    #[test]
    fn probe_dimensions_rejects_non_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").expect("write test file");

        assert!(probe_dimensions(&path).is_err());
    }
}
