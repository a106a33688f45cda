//! # 预览句柄模块
//!
//! ## 设计思路
//!
//! `PreviewHandle` 是当前图片的可展示资源引用：接收时把候选字节落盘到
//! 预览目录，前端通过 asset 协议直接引用该路径；句柄被替换或删除时必须
//! 显式撤销（删除文件），否则预览目录会随使用不断膨胀。
//!
//! ## 实现思路
//!
//! - `HandleStore` 独占句柄的创建与撤销，其他模块只能持有句柄本身。
//! - `revoke` 按值消费句柄，同一句柄在类型层面不可能被撤销两次。
//! - 创建/撤销计数与存活集合对外可读，生命周期不变量可直接断言。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::IntakeError;
use super::source::CandidateFile;

/// 当前图片的预览资源句柄。
///
/// 只能由 `HandleStore` 创建；路径对外只读。
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    path: PathBuf,
}

impl PreviewHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// 预览句柄仓库：句柄生命周期的唯一所有者。
#[derive(Debug)]
pub struct HandleStore {
    dir: PathBuf,
    next_id: u64,
    created: u64,
    revoked: u64,
    live: HashSet<u64>,
}

impl HandleStore {
    /// 在指定目录上创建仓库，目录不存在时自动创建。
    pub fn new(dir: PathBuf) -> Result<Self, IntakeError> {
        fs::create_dir_all(&dir)
            .map_err(|e| IntakeError::FileSystem(format!("创建预览目录失败：{}", e)))?;

        Ok(Self {
            dir,
            next_id: 1,
            created: 0,
            revoked: 0,
            live: HashSet::new(),
        })
    }

    /// 为候选文件创建新句柄：字节落盘，返回可展示路径。
    pub fn create(&mut self, file: &CandidateFile) -> Result<PreviewHandle, IntakeError> {
        let id = self.next_id;
        let path = self.dir.join(format!("preview_{:06}.{}", id, extension_of(file)));

        fs::write(&path, &file.bytes)
            .map_err(|e| IntakeError::FileSystem(format!("写入预览文件失败：{}", e)))?;

        self.next_id += 1;
        self.created += 1;
        self.live.insert(id);

        log::debug!("🖼️ 预览句柄已创建：#{} -> {}", id, path.display());
        Ok(PreviewHandle { id, path })
    }

    /// 撤销句柄：删除预览文件并将句柄移出存活集合。
    ///
    /// 按值消费句柄；文件删除失败只记录警告，句柄本身仍视为已撤销。
    pub fn revoke(&mut self, handle: PreviewHandle) {
        if !self.live.remove(&handle.id) {
            log::warn!("⚠️ 撤销了一个不在存活集合中的句柄：#{}", handle.id);
        }
        self.revoked += 1;

        if let Err(e) = fs::remove_file(&handle.path) {
            log::warn!(
                "⚠️ 删除预览文件失败（句柄 #{}，{}）：{}",
                handle.id,
                handle.path.display(),
                e
            );
        } else {
            log::debug!("🗑️ 预览句柄已撤销：#{}", handle.id);
        }
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

/// 预览文件扩展名：优先取原名扩展名，缺省回退到 MIME 子类型。
fn extension_of(file: &CandidateFile) -> String {
    if let Some(ext) = Path::new(&file.name).extension() {
        let ext = ext.to_string_lossy();
        if !ext.is_empty() {
            return ext.to_string();
        }
    }

    file.mime
        .split('/')
        .nth(1)
        .and_then(|subtype| subtype.split('+').next())
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("bin")
        .to_string()
}
