//! 日志工具模块
//!
//! 提供日志初始化与会话级格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 级别由 `RUST_LOG` 控制，默认 `info`；重复初始化被静默忽略（测试场景）
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}

/// 记录会话启动信息
pub fn log_session_start(campaign_id: i64, num_rounds: usize, questions_per_round: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 题目生成会话启动");
    info!("🏰 战役 ID: {}", campaign_id);
    info!(
        "📊 计划轮次: {}，每轮题目数: {}",
        num_rounds, questions_per_round
    );
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_document_loaded(segment_count: usize) {
    info!("📁 文档加载完成，共 {} 个内容分段", segment_count);
}

/// 记录会话完成统计
pub fn log_session_complete(generated: usize, submitted: usize, partial: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📊 会话完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if partial {
        info!("⚠️ 会话提前中止，以下为部分结果");
    }
    info!("✅ 生成题目: {}", generated);
    info!("📤 提交成功: {}", submitted);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "a".repeat(100);
        let truncated = truncate_text(&long, 10);
        assert_eq!(truncated, format!("{}...", "a".repeat(10)));
    }
}
