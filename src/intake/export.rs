//! # 导出动作模块
//!
//! ## 设计思路
//!
//! 导出（另存为 / 复制到剪贴板）只读取当前状态，不做任何状态转移。
//! 无图片时所有导出动作都是无操作，调用侧不需要前置判断。
//!
//! ## 实现思路
//!
//! - 另存为文件名在这里唯一决定：日期开关开启时走 `date_file_name`。
//! - 剪贴板写入沿用「解码为 RGBA → `arboard::ImageData`」的链路，
//!   写入失败由调用侧记录日志，不向前端抛出。

use std::borrow::Cow;

use chrono::NaiveDate;

use super::IntakeError;
use super::format::date_file_name;
use super::manager::IntakeManager;

/// 一次另存为请求：最终文件名与原始字节。
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// 已解码、可直接写入剪贴板的 RGBA 数据。
#[derive(Debug)]
pub struct PreparedClipboardImage {
    pub width: usize,
    pub height: usize,
    pub bytes: Vec<u8>,
}

impl IntakeManager {
    /// 另存为的最终文件名；无图片时返回 `None`。
    pub fn resolved_download_name(&self, date: NaiveDate) -> Option<String> {
        let metadata = self.current_metadata()?;
        if self.include_date() {
            Some(date_file_name(&metadata.name, date))
        } else {
            Some(metadata.name.clone())
        }
    }

    /// 组装另存为请求：最终文件名 + 当前图片原始字节。
    pub fn download_request(&self, date: NaiveDate) -> Option<DownloadRequest> {
        let file_name = self.resolved_download_name(date)?;
        let file = self.current_file()?;
        Some(DownloadRequest {
            file_name,
            bytes: file.bytes.clone(),
        })
    }

    /// 把当前图片解码为剪贴板可用的 RGBA 数据；无图片时返回 `Ok(None)`。
    pub fn prepare_clipboard_image(&self) -> Result<Option<PreparedClipboardImage>, IntakeError> {
        let Some(file) = self.current_file() else {
            return Ok(None);
        };

        let decoded = image::load_from_memory(&file.bytes)
            .map_err(|e| IntakeError::Decode(format!("图片解码失败：{}", e)))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Some(PreparedClipboardImage {
            width: width as usize,
            height: height as usize,
            bytes: rgba.into_raw(),
        }))
    }
}

/// 把准备好的 RGBA 数据写入系统剪贴板。
pub fn write_to_clipboard(prepared: PreparedClipboardImage) -> Result<(), IntakeError> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| IntakeError::Clipboard(format!("打开剪贴板失败：{}", e)))?;

    let image_data = arboard::ImageData {
        width: prepared.width,
        height: prepared.height,
        bytes: Cow::Owned(prepared.bytes),
    };

    clipboard
        .set_image(image_data)
        .map_err(|e| IntakeError::Clipboard(format!("写入剪贴板失败：{}", e)))?;
    Ok(())
}
