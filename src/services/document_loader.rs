//! 文档加载器 - 业务能力层
//!
//! 从上传的 PDF 中按页提取纯文本，产出有序的内容分段。
//! 无内部状态，除读取文件外没有其他副作用。

use crate::error::{AppError, AppResult, DocumentLoadError};
use crate::models::ContentSegment;
use std::path::Path;
use tracing::{debug, warn};

/// 加载文档并按页提取文本
///
/// # 参数
/// - `path`: PDF 文件路径
///
/// # 返回
/// 返回有序的内容分段列表，每页一段；空白页被丢弃
///
/// # 错误
/// 文件无法打开/解码，或整个文档没有可提取文本时返回 `DocumentLoadError`
pub fn load_document(path: &Path) -> AppResult<Vec<ContentSegment>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AppError::document_open_failed(path.to_string_lossy(), e))?;

    let pages = doc.get_pages();
    debug!("文档共 {} 页: {}", pages.len(), path.display());

    let mut segments = Vec::new();
    for (&page_number, _) in pages.iter() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    debug!("第 {} 页为空白页，跳过", page_number);
                    continue;
                }
                segments.push(ContentSegment {
                    ordinal: segments.len() + 1,
                    text,
                });
            }
            Err(e) => {
                // 单页提取失败不致命，跳过该页
                warn!("第 {} 页文本提取失败: {}", page_number, e);
            }
        }
    }

    if segments.is_empty() {
        return Err(AppError::Document(DocumentLoadError::NoExtractableText {
            path: path.to_string_lossy().to_string(),
        }));
    }

    debug!("成功提取 {} 个内容分段", segments.len());
    Ok(segments)
}

/// 将全部分段拼接为一段完整内容
///
/// 每轮提示词都基于完整文档内容构建，保证题目覆盖全文而非单一章节
pub fn concat_segments(segments: &[ContentSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
