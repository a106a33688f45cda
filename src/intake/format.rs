//! # 文件名与体积格式化模块
//!
//! ## 设计思路
//!
//! 元数据展示与导出命名共用的两个纯函数集中在这里：
//! - `format_bytes`：字节数 → 人类可读体积（`"1.5 KB"` 风格，不补尾零）
//! - `date_file_name`：原文件名 → `DD-MM-YYYY` 日期名，保留最后一个扩展名
//!
//! 纯函数不触碰任何状态，方便单测与属性测试覆盖边界。

use chrono::NaiveDate;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// 将字节数格式化为人类可读体积。
///
/// 以 1024 为进位基数，数值保留两位小数后去掉无意义的尾零，
/// 例如 `1536` → `"1.5 KB"`、`2048` → `"2 KB"`。
/// 超出单位表（约 1024 TB 以上）统一按 TB 展示。
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // 整数对数，避免浮点 log 在 1024 的整次幂边界上取错单位
    let unit = ((bytes.ilog2() / 10) as usize).min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// 以指定日期生成导出文件名。
///
/// 规则：日期固定为 `DD-MM-YYYY`；原名最后一个 `.` 之后的扩展名保留，
/// 但点号在首位（如 `.gitignore`）视为无扩展名，返回纯日期。
pub fn date_file_name(original: &str, date: NaiveDate) -> String {
    let stamp = date.format("%d-%m-%Y").to_string();

    match original.rfind('.') {
        Some(idx) if idx > 0 => format!("{}{}", stamp, &original[idx..]),
        _ => stamp,
    }
}
