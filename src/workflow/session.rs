//! 生成会话 - 流程层
//!
//! 核心控制循环：每个难度轮次依次执行
//! 构建提示词 → 调用补全服务 → 解析 → 绑定正确性 → 乱序 → 积累。
//!
//! 轮次严格串行：每轮提示词依赖之前所有轮次积累的题干历史，
//! 跨轮并行没有意义。补全服务失败中止后续轮次，但已积累的
//! 结果作为部分批次返回，而不是整体作废。

use crate::clients::CompletionBackend;
use crate::models::{
    AnswerOption, ContentSegment, DifficultyTier, GeneratedQuestion, ParsedQuestion,
    QuestionHistory,
};
use crate::services::{build_generation_prompt, concat_segments, parse_round, SYSTEM_MESSAGE};
use crate::utils::logging::truncate_text;
use rand::seq::SliceRandom;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// 选项行格式：标签字母 + 分隔符 + 文本
static OPTION_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Da-d])\s*[).:．、]\s*(.*)$").expect("选项标签正则"));

/// 会话状态机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 尚未开始
    Idle,
    /// 正在执行某一轮
    Running { round: usize },
    /// 全部轮次完成
    Completed,
    /// 补全服务失败，提前中止
    Aborted,
}

/// 会话结果
#[derive(Debug)]
pub struct SessionReport {
    /// 全部已接受的题目
    pub questions: Vec<GeneratedQuestion>,
    /// 实际完成的轮次数
    pub rounds_completed: usize,
    /// 是否因补全服务失败而提前中止（部分结果）
    pub partial: bool,
}

/// 生成会话
///
/// 职责：
/// - 驱动递增且不重复的难度曲线
/// - 维护会话内的题干历史（去重与提示词约束共用）
/// - 独立乱序选项并保持正确性绑定
/// - 只依赖注入的补全后端，不持有网络资源
pub struct GenerationSession<'a> {
    completion: &'a dyn CompletionBackend,
    campaign_id: i64,
    questions_per_round: usize,
    num_rounds: usize,
    state: SessionState,
    history: QuestionHistory,
}

impl<'a> GenerationSession<'a> {
    /// 创建新的生成会话
    pub fn new(
        completion: &'a dyn CompletionBackend,
        campaign_id: i64,
        questions_per_round: usize,
        num_rounds: usize,
    ) -> Self {
        Self {
            completion,
            campaign_id,
            questions_per_round,
            num_rounds,
            state: SessionState::Idle,
            history: QuestionHistory::new(),
        }
    }

    /// 当前状态
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 执行完整会话
    ///
    /// # 参数
    /// - `segments`: 文档内容分段（只读）
    ///
    /// # 返回
    /// 返回会话结果；补全服务失败不是错误，而是 `partial = true` 的部分结果
    pub async fn run(&mut self, segments: &[ContentSegment]) -> SessionReport {
        let content = concat_segments(segments);
        let mut questions: Vec<GeneratedQuestion> = Vec::new();
        let mut rounds_completed = 0;

        for round in 0..self.num_rounds {
            self.state = SessionState::Running { round };
            let tier = DifficultyTier::for_round(round);
            info!(
                "🎲 第 {}/{} 轮开始，难度: {}",
                round + 1,
                self.num_rounds,
                tier.label()
            );

            let prompt = build_generation_prompt(
                &content,
                self.questions_per_round,
                tier.label(),
                self.history.entries(),
            );

            let raw = match self.completion.complete(SYSTEM_MESSAGE, &prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    // 轮次级失败：中止后续轮次，返回已积累的部分结果
                    warn!("⚠️ 第 {} 轮补全失败，会话提前中止: {}", round + 1, e);
                    self.state = SessionState::Aborted;
                    return SessionReport {
                        questions,
                        rounds_completed,
                        partial: true,
                    };
                }
            };

            debug!("第 {} 轮原始响应: {}", round + 1, truncate_text(&raw, 200));
            let parsed = parse_round(&raw, self.questions_per_round, tier.label(), &self.history);
            debug!("第 {} 轮解析出 {} 条记录", round + 1, parsed.len());

            for record in parsed {
                match self.accept(record, tier) {
                    Some(question) => questions.push(question),
                    None => continue,
                }
            }

            rounds_completed += 1;
            info!(
                "✓ 第 {} 轮完成，累计题目: {}",
                round + 1,
                questions.len()
            );
        }

        self.state = SessionState::Completed;
        SessionReport {
            questions,
            rounds_completed,
            partial: false,
        }
    }

    /// 接受一条解析记录
    ///
    /// 先按选项自身的标签绑定 (文本, 正确性) 对，再整体乱序。
    /// 绑定发生在乱序之前：文本与正确性永远一起移动。
    fn accept(
        &mut self,
        record: ParsedQuestion,
        tier: DifficultyTier,
    ) -> Option<GeneratedQuestion> {
        // 解析阶段只对轮次开始时的历史快照去重，
        // 同一响应内的重复块要在这里逐条拦截
        if self.history.contains(&record.question) {
            warn!("⚠️ 丢弃重复题目: {}", record.question);
            return None;
        }

        let mut answers = bind_options(&record)?;

        // 独立乱序：不信任生成器自己的位置随机化
        let mut rng = rand::thread_rng();
        answers.shuffle(&mut rng);

        self.history.push(record.question.clone());

        Some(GeneratedQuestion {
            campaign_id: self.campaign_id,
            difficulty: tier.db_value(),
            question_str: record.question,
            answers,
        })
    }
}

/// 把原始选项行绑定为 (文本, 正确性) 对
///
/// 标签取自选项行自身的前缀字母；答案字母与任何标签都不匹配时
/// 整题丢弃，绝不持久化全错的题目
fn bind_options(record: &ParsedQuestion) -> Option<Vec<AnswerOption>> {
    let mut answers = Vec::with_capacity(4);
    let mut matched = false;

    for (index, line) in record.options.iter().enumerate() {
        let (label, text) = split_option_line(line, index);
        let is_correct = label == record.correct_letter;
        matched |= is_correct;
        answers.push(AnswerOption {
            answer_str: text,
            is_correct,
        });
    }

    if !matched {
        warn!(
            "⚠️ 答案字母 '{}' 与任何选项标签不匹配，丢弃题目: {}",
            record.correct_letter, record.question
        );
        return None;
    }

    Some(answers)
}

/// 拆分选项行为 (标签字母, 纯文本)
///
/// `"B) 4"` → `('B', "4")`；无法识别标签时按位置回退（0→A、1→B…）
fn split_option_line(line: &str, index: usize) -> (char, String) {
    if let Some(caps) = OPTION_LABEL_RE.captures(line) {
        let label = caps
            .get(1)
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase());
        if let (Some(label), Some(text)) = (label, caps.get(2)) {
            return (label, text.as_str().trim().to_string());
        }
    }

    // 回退：提供方省略了标签，按位置推断
    let fallback = (b'A' + (index as u8).min(3)) as char;
    (fallback, line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, CompletionServiceError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// 脚本化补全后端：按顺序吐出预设响应，耗尽后模拟服务失败
    struct ScriptedBackend {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(&self, _system: &str, _user: &str) -> crate::error::AppResult<String> {
            self.responses
                .lock()
                .expect("锁不应中毒")
                .pop_front()
                .ok_or_else(|| {
                    AppError::Completion(CompletionServiceError::EmptyResponse {
                        model: "scripted".to_string(),
                    })
                })
        }
    }

    fn segments() -> Vec<ContentSegment> {
        vec![ContentSegment {
            ordinal: 1,
            text: "Test content".to_string(),
        }]
    }

    fn block(question: &str, tier: &str, answer: char) -> String {
        format!(
            "Q1: {} ({})\nA) w\nB) x\nC) y\nD) z\nAnswer: {}",
            question, tier, answer
        )
    }

    #[tokio::test]
    async fn test_full_session_escalates_difficulty() {
        let backend = ScriptedBackend::new(vec![
            "Q1: Easy Q? (Easy)\nA) A\nB) B\nC) C\nD) D\nAnswer: B",
            "Q1: Med Q? (Medium)\nA) A\nB) B\nC) C\nD) D\nAnswer: C",
            "Q1: Hard Q? (Hard)\nA) A\nB) B\nC) C\nD) D\nAnswer: D",
        ]);
        let mut session = GenerationSession::new(&backend, 123, 1, 3);
        let report = session.run(&segments()).await;

        assert!(!report.partial);
        assert_eq!(report.rounds_completed, 3);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(report.questions.len(), 3);
        assert_eq!(report.questions[0].difficulty, "easy");
        assert_eq!(report.questions[0].question_str, "Easy Q?");
        assert_eq!(report.questions[1].difficulty, "medium");
        assert_eq!(report.questions[2].difficulty, "hard");
        assert_eq!(report.questions[0].campaign_id, 123);
    }

    #[tokio::test]
    async fn test_shuffle_preserves_correctness_binding() {
        let backend = ScriptedBackend::new(vec![
            "Q1: Bind? (Easy)\nA) 3\nB) 4\nC) 5\nD) 6\nAnswer: B",
        ]);
        let mut session = GenerationSession::new(&backend, 1, 1, 1);
        let report = session.run(&segments()).await;

        assert_eq!(report.questions.len(), 1);
        let q = &report.questions[0];
        assert_eq!(q.answers.len(), 4);
        // 无论乱序到哪个位置，正确的永远是文本 "4"
        assert_eq!(q.correct_count(), 1);
        let correct = q.answers.iter().find(|a| a.is_correct).unwrap();
        assert_eq!(correct.answer_str, "4");
    }

    #[tokio::test]
    async fn test_completion_failure_yields_partial_report() {
        // 只脚本化 1 轮，第 2 轮触发模拟失败
        let backend = ScriptedBackend::new(vec![
            "Q1: Only one? (Easy)\nA) a\nB) b\nC) c\nD) d\nAnswer: A",
        ]);
        let mut session = GenerationSession::new(&backend, 9, 1, 3);
        let report = session.run(&segments()).await;

        assert!(report.partial);
        assert_eq!(report.rounds_completed, 1);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(session.state(), SessionState::Aborted);
    }

    #[tokio::test]
    async fn test_malformed_round_yields_empty_but_continues() {
        let backend = ScriptedBackend::new(vec![
            "Q1: Bad? (Easy)\nA) 1\nB) 2\n",
            &block("Good?", "Medium", 'A'),
        ]);
        let mut session = GenerationSession::new(&backend, 9, 1, 2);
        let report = session.run(&segments()).await;

        assert!(!report.partial);
        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].question_str, "Good?");
    }

    #[tokio::test]
    async fn test_dedup_across_rounds() {
        // 第二轮复述第一轮的题干，应被丢弃
        let backend = ScriptedBackend::new(vec![
            &block("Same question?", "Easy", 'A') as &str,
            &block("Same question?", "Medium", 'B'),
        ]);
        let mut session = GenerationSession::new(&backend, 9, 1, 2);
        let report = session.run(&segments()).await;

        assert_eq!(report.questions.len(), 1);
        let texts: Vec<_> = report
            .questions
            .iter()
            .map(|q| q.question_str.as_str())
            .collect();
        let mut deduped = texts.clone();
        deduped.dedup();
        assert_eq!(texts, deduped);
    }

    #[tokio::test]
    async fn test_dedup_within_single_round() {
        // 同一响应里出现两个完全相同的题干，只接受第一条
        let raw = format!(
            "{}\n\n{}",
            block("Same text?", "Easy", 'A'),
            block("Same text?", "Easy", 'B')
        );
        let backend = ScriptedBackend::new(vec![&raw]);
        let mut session = GenerationSession::new(&backend, 9, 2, 1);
        let report = session.run(&segments()).await;

        assert_eq!(report.questions.len(), 1);
        assert_eq!(report.questions[0].question_str, "Same text?");
    }

    #[tokio::test]
    async fn test_unmatched_answer_letter_discarded() {
        // 答案 D 存在标签，但提供方只给了 A-C 标签 + 一行无标签
        let backend = ScriptedBackend::new(vec![
            "Q1: NoMatch? (Easy)\nA) 1\nB) 2\nC) 3\nD) 4\nAnswer: E",
        ]);
        let mut session = GenerationSession::new(&backend, 9, 1, 1);
        let report = session.run(&segments()).await;
        // "Answer: E" 没有可解析字母……解析器已丢弃，结果为空
        assert!(report.questions.is_empty());
    }

    #[tokio::test]
    async fn test_tier_clamps_past_list_end() {
        let blocks: Vec<String> = (0..7)
            .map(|i| block(&format!("Q number {}?", i), "Expert", 'A'))
            .collect();
        let backend = ScriptedBackend::new(blocks.iter().map(String::as_str).collect());
        let mut session = GenerationSession::new(&backend, 9, 1, 7);
        let report = session.run(&segments()).await;

        assert_eq!(report.questions.len(), 7);
        // 第 5 轮起档位固定为最后一档
        assert_eq!(report.questions[4].difficulty, "expert");
        assert_eq!(report.questions[5].difficulty, "expert");
        assert_eq!(report.questions[6].difficulty, "expert");
    }

    #[test]
    fn test_bind_options_matches_by_label() {
        let record = ParsedQuestion {
            question: "Q".to_string(),
            options: [
                "A) 1".to_string(),
                "B) 2".to_string(),
                "C) 3".to_string(),
                "D) 4".to_string(),
            ],
            correct_letter: 'A',
        };
        let bound = bind_options(&record).unwrap();
        assert!(bound[0].is_correct);
        assert_eq!(bound[0].answer_str, "1");
    }

    #[test]
    fn test_bind_options_fallback_label_by_position() {
        let record = ParsedQuestion {
            question: "Q".to_string(),
            options: [
                "A) 1".to_string(),
                "B) 2".to_string(),
                "C) 3".to_string(),
                "no label here".to_string(),
            ],
            correct_letter: 'D',
        };
        // 第 4 行无标签时按位置回退为 D，仍能匹配
        let bound = bind_options(&record).unwrap();
        assert!(bound[3].is_correct);
        assert_eq!(bound[3].answer_str, "no label here");
    }

    #[test]
    fn test_bind_options_unmatched_letter_discards() {
        // 提供方把两行都标成 A，答案却是 D：整题丢弃
        let record = ParsedQuestion {
            question: "Q".to_string(),
            options: [
                "A) 1".to_string(),
                "B) 2".to_string(),
                "C) 3".to_string(),
                "A) dup".to_string(),
            ],
            correct_letter: 'D',
        };
        assert!(bind_options(&record).is_none());
    }

    #[test]
    fn test_split_option_line_variants() {
        assert_eq!(split_option_line("B) 4", 1), ('B', "4".to_string()));
        assert_eq!(split_option_line("c. five", 2), ('C', "five".to_string()));
        assert_eq!(split_option_line("D: six", 3), ('D', "six".to_string()));
        // 无标签回退到位置字母
        assert_eq!(split_option_line("seven", 0), ('A', "seven".to_string()));
    }
}
