//! # 核心状态机模块
//!
//! ## 设计思路
//!
//! `IntakeManager` 只负责「当前图片」的状态转移，不直接与 Tauri 绑定。
//! 任意时刻最多存在一组 `文件 + 预览句柄 + 元数据`：
//!
//! 1. 接收新图先创建新句柄、装入新状态
//! 2. 新状态就位后再撤销被替换的旧句柄（替换即释放，不依赖隐式回收）
//! 3. 删除时整组清空并撤销最后一个句柄
//!
//! ## 实现思路
//!
//! - 每次接收携带单调递增的 generation，异步尺寸解码结果回写时校验，
//!   慢解码不会把旧图的尺寸写进新图的元数据。
//! - 尺寸之外的元数据在接收时同步填充，尺寸在解码完成前保持缺省。
//! - 重命名只改 `name`，日期开关只影响导出命名，都不触碰图片本体。

use std::path::PathBuf;

use serde::Serialize;

use super::format::format_bytes;
use super::handle::{HandleStore, PreviewHandle};
use super::source::CandidateFile;
use super::{IntakeConfig, IntakeError};

/// 当前图片元数据。
///
/// `dimensions` 由异步解码回填，其余字段接收时即可用。
#[derive(Debug, Clone)]
pub struct ImageMetadata {
    pub name: String,
    pub dimensions: Option<String>,
    pub size: String,
    pub kind: String,
}

impl ImageMetadata {
    fn from_candidate(file: &CandidateFile) -> Self {
        Self {
            name: file.name.clone(),
            dimensions: None,
            size: format_bytes(file.bytes.len() as u64),
            kind: kind_label(&file.mime),
        }
    }
}

/// MIME 子类型的大写展示标记：`image/jpeg` → `JPEG`。
fn kind_label(mime: &str) -> String {
    mime.split('/').nth(1).unwrap_or(mime).to_uppercase()
}

/// 当前图片：文件、句柄、元数据与接收代号，整组替换、整组清空。
#[derive(Debug)]
struct CurrentImage {
    file: CandidateFile,
    handle: PreviewHandle,
    metadata: ImageMetadata,
    generation: u64,
}

/// 一次接收的回执：异步解码任务凭 generation 回写尺寸。
#[derive(Debug, Clone)]
pub struct IntakeTicket {
    pub generation: u64,
    pub preview_path: PathBuf,
}

/// 前端可见的状态快照。
#[derive(Debug, Clone, Serialize)]
pub struct ImageView {
    pub name: String,
    pub dimensions: Option<String>,
    pub size: String,
    pub kind: String,
    pub preview_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub image: Option<ImageView>,
    pub dragging: bool,
    pub include_date: bool,
}

/// 单图接收状态机。
pub struct IntakeManager {
    config: IntakeConfig,
    store: HandleStore,
    current: Option<CurrentImage>,
    dragging: bool,
    include_date: bool,
    generation: u64,
}

impl IntakeManager {
    /// 在指定预览目录上创建状态机。
    pub fn new(config: IntakeConfig, preview_dir: PathBuf) -> Result<Self, IntakeError> {
        let include_date = config.default_include_date;
        Ok(Self {
            config,
            store: HandleStore::new(preview_dir)?,
            current: None,
            dragging: false,
            include_date,
            generation: 0,
        })
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// 接收一个已验证的候选文件为当前图片。
    ///
    /// 新句柄与元数据先就位，旧句柄随后撤销且只撤销一次。
    /// 返回的回执交给异步尺寸解码任务。
    pub fn intake(&mut self, file: CandidateFile) -> Result<IntakeTicket, IntakeError> {
        let size = file.bytes.len() as u64;
        if size > self.config.max_file_size {
            return Err(IntakeError::ResourceLimit(format!(
                "候选文件过大：{:.2} MB（限制：{:.2} MB）",
                size as f64 / 1024.0 / 1024.0,
                self.config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        self.generation += 1;
        let generation = self.generation;

        let handle = self.store.create(&file)?;
        let preview_path = handle.path().to_path_buf();
        let metadata = ImageMetadata::from_candidate(&file);

        log::info!(
            "✅ 图片已接收 - 名称: {} 体积: {} 类型: {}（第 {} 代）",
            metadata.name,
            metadata.size,
            metadata.kind,
            generation
        );

        let previous = self.current.replace(CurrentImage {
            file,
            handle,
            metadata,
            generation,
        });

        // 替换即释放：新状态已可见，旧句柄在同一状态转移里撤销
        if let Some(previous) = previous {
            self.store.revoke(previous.handle);
        }

        Ok(IntakeTicket {
            generation,
            preview_path,
        })
    }

    /// 回写异步解码出的尺寸，generation 不匹配的过期结果直接丢弃。
    ///
    /// 返回是否实际写入。
    pub fn apply_dimensions(&mut self, generation: u64, width: u32, height: u32) -> bool {
        match self.current.as_mut() {
            Some(current) if current.generation == generation => {
                current.metadata.dimensions = Some(format!("{} x {}", width, height));
                log::debug!("📐 尺寸已回填：{} x {}（第 {} 代）", width, height, generation);
                true
            }
            Some(current) => {
                log::debug!(
                    "🕑 丢弃过期的尺寸解码结果（第 {} 代，当前第 {} 代）",
                    generation,
                    current.generation
                );
                false
            }
            None => {
                log::debug!("🕑 丢弃尺寸解码结果：当前已无图片（第 {} 代）", generation);
                false
            }
        }
    }

    /// 重命名当前图片，仅替换元数据中的 `name`；无图片时为无操作。
    pub fn update_name(&mut self, new_name: String) {
        if let Some(current) = self.current.as_mut() {
            current.metadata.name = new_name;
        }
    }

    pub fn set_include_date(&mut self, include_date: bool) {
        self.include_date = include_date;
    }

    pub fn include_date(&self) -> bool {
        self.include_date
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 删除当前图片：整组清空并撤销最后一个句柄；反复调用等价于一次。
    pub fn delete_image(&mut self) {
        if let Some(current) = self.current.take() {
            log::info!("🗑️ 删除当前图片：{}", current.metadata.name);
            self.store.revoke(current.handle);
        }
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            image: self.current.as_ref().map(|current| ImageView {
                name: current.metadata.name.clone(),
                dimensions: current.metadata.dimensions.clone(),
                size: current.metadata.size.clone(),
                kind: current.metadata.kind.clone(),
                preview_path: current.handle.path().to_string_lossy().to_string(),
            }),
            dragging: self.dragging,
            include_date: self.include_date,
        }
    }

    pub(super) fn current_file(&self) -> Option<&CandidateFile> {
        self.current.as_ref().map(|current| &current.file)
    }

    pub(super) fn current_metadata(&self) -> Option<&ImageMetadata> {
        self.current.as_ref().map(|current| &current.metadata)
    }

    /// 句柄仓库的只读视图，用于诊断与生命周期断言。
    pub fn handle_store(&self) -> &HandleStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (IntakeManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("temp dir");
        let manager = IntakeManager::new(IntakeConfig::default(), dir.path().to_path_buf())
            .expect("manager init");
        (manager, dir)
    }

    fn candidate(name: &str, mime: &str, size: usize) -> CandidateFile {
        CandidateFile {
            name: name.to_string(),
            mime: mime.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn intake_populates_metadata_synchronously() {
        let (mut manager, _dir) = manager();
        manager
            .intake(candidate("cat.jpg", "image/jpeg", 2048))
            .expect("intake should succeed");

        let snapshot = manager.snapshot();
        let image = snapshot.image.expect("image should be current");
        assert_eq!(image.name, "cat.jpg");
        assert_eq!(image.size, "2 KB");
        assert_eq!(image.kind, "JPEG");
        assert_eq!(image.dimensions, None);
    }

    #[test]
    fn dimensions_arrive_late_via_ticket() {
        let (mut manager, _dir) = manager();
        let ticket = manager
            .intake(candidate("cat.jpg", "image/jpeg", 2048))
            .expect("intake should succeed");

        assert!(manager.apply_dimensions(ticket.generation, 100, 80));

        let snapshot = manager.snapshot();
        let image = snapshot.image.expect("image should be current");
        assert_eq!(image.dimensions.as_deref(), Some("100 x 80"));
    }

    #[test]
    fn stale_decode_result_is_discarded() {
        let (mut manager, _dir) = manager();
        let first = manager
            .intake(candidate("a.png", "image/png", 10))
            .expect("first intake");
        manager
            .intake(candidate("b.png", "image/png", 10))
            .expect("second intake");

        // 第一张图的慢解码此时才完成，不得写入第二张图的元数据
        assert!(!manager.apply_dimensions(first.generation, 640, 480));
        let snapshot = manager.snapshot();
        assert_eq!(snapshot.image.expect("image").dimensions, None);
    }

    #[test]
    fn decode_result_after_delete_is_discarded() {
        let (mut manager, _dir) = manager();
        let ticket = manager
            .intake(candidate("a.png", "image/png", 10))
            .expect("intake");
        manager.delete_image();

        assert!(!manager.apply_dimensions(ticket.generation, 640, 480));
    }

    #[test]
    fn replacing_image_revokes_previous_handle_exactly_once() {
        let (mut manager, _dir) = manager();
        manager
            .intake(candidate("a.png", "image/png", 10))
            .expect("first intake");
        manager
            .intake(candidate("b.png", "image/png", 10))
            .expect("second intake");

        let store = manager.handle_store();
        assert_eq!(store.created_count(), 2);
        assert_eq!(store.revoked_count(), 1);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn delete_revokes_last_handle_and_is_idempotent() {
        let (mut manager, _dir) = manager();
        manager
            .intake(candidate("a.png", "image/png", 10))
            .expect("intake");

        manager.delete_image();
        manager.delete_image();

        let store = manager.handle_store();
        assert_eq!(store.created_count(), 1);
        assert_eq!(store.revoked_count(), 1);
        assert_eq!(store.live_count(), 0);
        assert!(manager.snapshot().image.is_none());
    }

    #[test]
    fn delete_with_nothing_loaded_is_noop() {
        let (mut manager, _dir) = manager();
        manager.delete_image();
        assert_eq!(manager.handle_store().revoked_count(), 0);
    }

    #[test]
    fn rename_replaces_only_name() {
        let (mut manager, _dir) = manager();
        let ticket = manager
            .intake(candidate("cat.jpg", "image/jpeg", 2048))
            .expect("intake");
        manager.apply_dimensions(ticket.generation, 100, 80);

        manager.update_name("renamed.jpg".to_string());

        let image = manager.snapshot().image.expect("image");
        assert_eq!(image.name, "renamed.jpg");
        assert_eq!(image.size, "2 KB");
        assert_eq!(image.kind, "JPEG");
        assert_eq!(image.dimensions.as_deref(), Some("100 x 80"));
    }

    #[test]
    fn rename_with_nothing_loaded_is_noop() {
        let (mut manager, _dir) = manager();
        manager.update_name("ghost.png".to_string());
        assert!(manager.snapshot().image.is_none());
    }

    #[test]
    fn include_date_defaults_on_and_toggles() {
        let (mut manager, _dir) = manager();
        assert!(manager.include_date());
        manager.set_include_date(false);
        assert!(!manager.include_date());
    }

    #[test]
    fn oversized_candidate_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = IntakeConfig {
            max_file_size: 16,
            ..IntakeConfig::default()
        };
        let mut manager =
            IntakeManager::new(config, dir.path().to_path_buf()).expect("manager init");

        let result = manager.intake(candidate("big.png", "image/png", 64));
        assert!(matches!(result, Err(IntakeError::ResourceLimit(_))));
        assert!(manager.snapshot().image.is_none());
    }
}
