//! # 数据源与候选文件模块
//!
//! ## 设计思路
//!
//! 将「外部输入事件」和「接收链路的输入」解耦：
//! - `PastedItem` 表示前端粘贴事件携带的剪贴板条目（Base64 负载）
//! - `CandidateFile` 表示已规整、仍未确认为当前图片的候选文件
//!
//! 粘贴与拖放两个适配器各自负责把异构输入收敛为 `CandidateFile`，
//! 非图片输入一律返回 `None`，保持「静默忽略」语义。
//!
//! ## 实现思路
//!
//! - 粘贴：按顺序扫描条目，取第一个 MIME 含 `image` 的条目，Base64 解码
//!   （兼容 Data URL 与纯 Base64）。
//! - 拖放：只取第一个路径，读取字节后用文件签名（magic bytes）判定图片，
//!   不信任扩展名。

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use super::IntakeError;

/// 前端粘贴事件透传的单个剪贴板条目。
#[derive(Debug, Clone, Deserialize)]
pub struct PastedItem {
    /// 条目声明的 MIME 类型（如 `image/png`）。
    pub mime: String,
    /// Base64 负载（允许带 `data:image/...;base64,` 前缀）。
    pub data: String,
    /// 浏览器侧文件名（粘贴图片通常为 `image.png`，可缺省）。
    pub file_name: Option<String>,
}

/// 已规整的候选文件：字节 + 声明类型 + 原始文件名。
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// 粘贴适配器：从剪贴板条目中选出第一张图片。
///
/// 条目按顺序扫描，MIME 含 `image` 的第一个条目胜出，即使后面还有图片；
/// 没有图片条目时返回 `Ok(None)`，调用侧保持无操作。
pub fn candidate_from_pasted_items(
    items: &[PastedItem],
    max_file_size: u64,
) -> Result<Option<CandidateFile>, IntakeError> {
    let Some(item) = items.iter().find(|item| item.mime.contains("image")) else {
        return Ok(None);
    };

    let bytes = parse_base64_with_limit(&item.data, max_file_size)?;
    let name = item
        .file_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default_paste_name(&item.mime));

    Ok(Some(CandidateFile {
        name,
        mime: item.mime.clone(),
        bytes,
    }))
}

/// 拖放适配器：从拖入的路径列表中取第一个图片文件。
///
/// 文件类型以字节签名判定（`infer`），非图片或空列表返回 `Ok(None)`。
pub fn candidate_from_dropped_paths(
    paths: &[std::path::PathBuf],
    max_file_size: u64,
) -> Result<Option<CandidateFile>, IntakeError> {
    let Some(path) = paths.first() else {
        return Ok(None);
    };

    let size = std::fs::metadata(path)
        .map_err(|e| IntakeError::FileSystem(format!("读取拖入文件信息失败：{}", e)))?
        .len();
    if size > max_file_size {
        return Err(IntakeError::ResourceLimit(format!(
            "拖入文件过大：{:.2} MB（限制：{:.2} MB）",
            size as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| IntakeError::FileSystem(format!("读取拖入文件失败：{}", e)))?;

    let Some(mime) = sniff_image_mime(&bytes) else {
        log::debug!("🚫 拖入文件不是图片，忽略：{}", path.display());
        return Ok(None);
    };

    let name = file_name_of(path);
    Ok(Some(CandidateFile { name, mime, bytes }))
}

/// 通过文件签名判定图片类型，返回 MIME；非图片返回 `None`。
fn sniff_image_mime(bytes: &[u8]) -> Option<String> {
    let kind = infer::get(bytes)?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return None;
    }
    Some(kind.mime_type().to_string())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string())
}

/// 粘贴条目缺省文件名：`image/png` → `image.png`。
fn default_paste_name(mime: &str) -> String {
    let subtype = mime
        .split('/')
        .nth(1)
        .and_then(|subtype| subtype.split('+').next())
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("png");
    format!("image.{}", subtype)
}

fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, IntakeError> {
    let len = base64_data.trim().len() as u64;
    let groups = len
        .checked_add(3)
        .ok_or_else(|| IntakeError::ResourceLimit("Base64 输入长度溢出".to_string()))?
        / 4;

    groups
        .checked_mul(3)
        .ok_or_else(|| IntakeError::ResourceLimit("Base64 解码体积估算溢出".to_string()))
}

/// 解析 Base64 输入（支持 Data URL / 纯 Base64），解码前先按上限估算体积。
fn parse_base64_with_limit(data: &str, max_file_size: u64) -> Result<Vec<u8>, IntakeError> {
    let normalized = data.trim();

    let base64_data = if normalized.starts_with("data:image/") {
        let base64_start = normalized
            .find(";base64,")
            .ok_or_else(|| IntakeError::InvalidFormat("缺少 base64 标记".to_string()))?;
        &normalized[base64_start + 8..]
    } else {
        normalized
    };

    let estimated_len = estimate_base64_decoded_upper_bound_len(base64_data)?;
    if estimated_len > max_file_size {
        return Err(IntakeError::ResourceLimit(format!(
            "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated_len as f64 / 1024.0 / 1024.0,
            max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| IntakeError::Decode(format!("Base64 解码失败：{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::test_util::TINY_PNG;
    use base64::{Engine as _, engine::general_purpose};

    fn png_item(file_name: Option<&str>) -> PastedItem {
        PastedItem {
            mime: "image/png".to_string(),
            data: general_purpose::STANDARD.encode(TINY_PNG),
            file_name: file_name.map(|name| name.to_string()),
        }
    }

    fn text_item() -> PastedItem {
        PastedItem {
            mime: "text/plain".to_string(),
            data: general_purpose::STANDARD.encode("hello"),
            file_name: None,
        }
    }

    #[test]
    fn paste_picks_first_image_item() {
        let items = vec![text_item(), png_item(Some("cat.png")), png_item(Some("dog.png"))];
        let candidate = candidate_from_pasted_items(&items, u64::MAX)
            .expect("paste adapter should succeed")
            .expect("image item should be selected");

        assert_eq!(candidate.name, "cat.png");
        assert_eq!(candidate.mime, "image/png");
        assert_eq!(candidate.bytes, TINY_PNG.to_vec());
    }

    #[test]
    fn paste_without_image_item_is_none() {
        let items = vec![text_item(), text_item()];
        let candidate =
            candidate_from_pasted_items(&items, u64::MAX).expect("paste adapter should succeed");
        assert!(candidate.is_none());
    }

    #[test]
    fn paste_uses_default_name_when_missing() {
        let items = vec![png_item(None)];
        let candidate = candidate_from_pasted_items(&items, u64::MAX)
            .expect("paste adapter should succeed")
            .expect("image item should be selected");
        assert_eq!(candidate.name, "image.png");
    }

    #[test]
    fn paste_accepts_data_url_payload() {
        let data = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(TINY_PNG)
        );
        let items = vec![PastedItem {
            mime: "image/png".to_string(),
            data,
            file_name: None,
        }];

        let candidate = candidate_from_pasted_items(&items, u64::MAX)
            .expect("paste adapter should succeed")
            .expect("image item should be selected");
        assert_eq!(candidate.bytes, TINY_PNG.to_vec());
    }

    #[test]
    fn paste_rejects_oversized_payload() {
        let items = vec![png_item(None)];
        let result = candidate_from_pasted_items(&items, 8);
        assert!(matches!(result, Err(IntakeError::ResourceLimit(_))));
    }

    #[test]
    fn drop_empty_list_is_none() {
        let candidate =
            candidate_from_dropped_paths(&[], u64::MAX).expect("drop adapter should succeed");
        assert!(candidate.is_none());
    }

    #[test]
    fn drop_non_image_file_is_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not an image at all").expect("write test file");

        let candidate = candidate_from_dropped_paths(&[path], u64::MAX)
            .expect("drop adapter should succeed");
        assert!(candidate.is_none());
    }

    #[test]
    fn drop_image_file_is_sniffed_by_signature() {
        let dir = tempfile::tempdir().expect("temp dir");
        // 扩展名故意与内容不符，签名优先
        let path = dir.path().join("picture.dat");
        std::fs::write(&path, TINY_PNG).expect("write test file");

        let candidate = candidate_from_dropped_paths(&[path], u64::MAX)
            .expect("drop adapter should succeed")
            .expect("image file should be selected");
        assert_eq!(candidate.mime, "image/png");
        assert_eq!(candidate.name, "picture.dat");
    }
}
