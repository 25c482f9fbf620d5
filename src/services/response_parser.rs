//! 响应解析器 - 业务能力层
//!
//! 把补全服务返回的半结构化文本解析为离散的题目记录。
//! 提供方输出没有格式保证：畸形块是预期情况，静默丢弃而不报错。

use crate::models::{ParsedQuestion, QuestionHistory};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// 题干行的前导序号 "Q1:" / "Q2."
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[Qq]\d+\s*[:.)]\s*").expect("题干序号正则"));

/// 题干尾部的括号注记
static TRAILING_NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^()]*\)\s*$").expect("尾部注记正则"));

/// 解析一轮的原始补全文本
///
/// # 参数
/// - `raw`: 本轮的原始响应文本
/// - `target_count`: 本轮请求的题目数量（超出部分的块被静默忽略）
/// - `tier_label`: 本轮难度标签（用于剥离题干中的括号注记）
/// - `history`: 已接受题干集合，命中者跳过
///
/// # 返回
/// 返回 0..=target_count 条解析记录；畸形块只会缩短输出列表
pub fn parse_round(
    raw: &str,
    target_count: usize,
    tier_label: &str,
    history: &QuestionHistory,
) -> Vec<ParsedQuestion> {
    let mut parsed = Vec::new();

    // 以空行为界切块，多余的块（提供方超量生成）直接忽略
    for block in raw.trim().split("\n\n").take(target_count) {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        // 题干 + 4 选项 + 答案行，不足 6 行视为畸形
        if lines.len() < 6 {
            debug!("丢弃畸形块（仅 {} 行）", lines.len());
            continue;
        }

        let question = strip_question_line(lines[0], tier_label);
        if question.is_empty() {
            debug!("丢弃题干为空的块");
            continue;
        }

        // 去重：与历史题干精确匹配者跳过
        if history.contains(&question) {
            debug!("丢弃重复题目: {}", question);
            continue;
        }

        let options = [
            lines[1].to_string(),
            lines[2].to_string(),
            lines[3].to_string(),
            lines[4].to_string(),
        ];

        let correct_letter = match extract_answer_letter(lines[5]) {
            Some(c) => c,
            None => {
                debug!("丢弃答案行无法解析的块: {}", lines[5]);
                continue;
            }
        };

        parsed.push(ParsedQuestion {
            question,
            options,
            correct_letter,
        });
    }

    parsed
}

/// 剥离题干行的序号与难度注记
///
/// `"Q1: What is 2+2? (Easy)"` → `"What is 2+2?"`
fn strip_question_line(line: &str, tier_label: &str) -> String {
    let text = ORDINAL_RE.replace(line.trim(), "").to_string();

    // 优先剥离与本轮档位完全一致的注记，再兜底剥离任意尾部括号注记
    let tier_suffix = format!("({})", tier_label);
    if let Some(stripped) = text.trim_end().strip_suffix(&tier_suffix) {
        return stripped.trim_end().to_string();
    }

    TRAILING_NOTE_RE.replace(&text, "").trim().to_string()
}

/// 从答案行提取正确选项字母
///
/// 取 "Answer:" 之后的文本，去空白并大写，首个 A-D 字母即为结果
fn extract_answer_letter(line: &str) -> Option<char> {
    let after_marker = match line.rsplit_once("Answer:") {
        Some((_, rest)) => rest,
        None => line,
    };
    after_marker
        .trim()
        .to_uppercase()
        .chars()
        .find(|c| ('A'..='D').contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "Q1: What is 2+2? (Easy)\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B";

    #[test]
    fn test_parse_well_formed_block() {
        let history = QuestionHistory::new();
        let parsed = parse_round(WELL_FORMED, 1, "Easy", &history);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "What is 2+2?");
        assert_eq!(
            parsed[0].options,
            [
                "A) 3".to_string(),
                "B) 4".to_string(),
                "C) 5".to_string(),
                "D) 6".to_string()
            ]
        );
        assert_eq!(parsed[0].correct_letter, 'B');
    }

    #[test]
    fn test_parse_roundtrip_any_correct_letter() {
        // 无论哪个字母被标为正确，解析结果都与输入一致
        for letter in ['A', 'B', 'C', 'D'] {
            let raw = format!(
                "Q1: Sample? (Hard)\nA) w\nB) x\nC) y\nD) z\nAnswer: {}",
                letter
            );
            let parsed = parse_round(&raw, 1, "Hard", &QuestionHistory::new());
            assert_eq!(parsed.len(), 1);
            assert_eq!(parsed[0].correct_letter, letter);
        }
    }

    #[test]
    fn test_malformed_block_dropped_silently() {
        // 仅 3 行，缺少选项和答案
        let raw = "Q1: Bad? (Easy)\nA) 1\nB) 2\n";
        let parsed = parse_round(raw, 1, "Easy", &QuestionHistory::new());
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_mixed_blocks_shrink_output_by_malformed_count() {
        let raw = format!("{}\n\nQ2: Broken (Easy)\nA) 1\nAnswer: A", WELL_FORMED);
        let parsed = parse_round(&raw, 2, "Easy", &QuestionHistory::new());
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_over_generation_truncated() {
        let raw = format!(
            "{}\n\nQ2: Extra? (Easy)\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: A",
            WELL_FORMED
        );
        // 请求 1 道，提供方给了 2 道，多余的被忽略
        let parsed = parse_round(&raw, 1, "Easy", &QuestionHistory::new());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].question, "What is 2+2?");
    }

    #[test]
    fn test_history_entry_skipped() {
        let mut history = QuestionHistory::new();
        history.push("What is 2+2?");
        let parsed = parse_round(WELL_FORMED, 1, "Easy", &history);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_answer_line_with_noise() {
        let raw = "Q1: Noise? (Easy)\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer:  c) ";
        let parsed = parse_round(raw, 1, "Easy", &QuestionHistory::new());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].correct_letter, 'C');
    }

    #[test]
    fn test_answer_line_without_valid_letter_dropped() {
        let raw = "Q1: NoAns? (Easy)\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: 42";
        let parsed = parse_round(raw, 1, "Easy", &QuestionHistory::new());
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_strip_ordinal_variants() {
        assert_eq!(strip_question_line("Q12: Long? (Expert)", "Expert"), "Long?");
        assert_eq!(strip_question_line("q3. Dotted? (Easy)", "Easy"), "Dotted?");
        // 档位注记与本轮不一致时仍兜底剥离
        assert_eq!(strip_question_line("Q1: Odd? (Medium)", "Easy"), "Odd?");
        // 无注记时保持原样
        assert_eq!(strip_question_line("Q1: Plain?", "Easy"), "Plain?");
    }
}
