//! 题目数据模型
//!
//! 覆盖流水线各阶段的数据形状：
//! 文档页 → 解析记录 → 生成题目（持久化端的 JSON 形状）

use serde::{Deserialize, Serialize};

/// 文档内容分段
///
/// 加载器产出后不可变，编排器只读消费
#[derive(Debug, Clone)]
pub struct ContentSegment {
    /// 页序号（从 1 开始）
    pub ordinal: usize,
    /// 提取出的纯文本
    pub text: String,
}

/// 解析后的题目记录（响应解析器的输出）
///
/// `options` 保留原始带标签的选项行，标签到正确性的绑定在编排器中完成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    /// 题干（已剥离 "Qn:" 序号与难度括号注记）
    pub question: String,
    /// 4 条原始选项行，每条以 A-D 标签开头
    pub options: [String; 4],
    /// 正确选项字母（大写）
    pub correct_letter: char,
}

/// 答案选项（持久化形状）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// 选项文本（已剥离标签）
    #[serde(rename = "answerStr")]
    pub answer_str: String,
    /// 是否为正确答案
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

/// 生成的题目（最终持久化单元）
///
/// 不变量：`answers` 长度为 4，且恰好一项 `is_correct = true`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    /// 所属战役 ID
    #[serde(rename = "campaignID")]
    pub campaign_id: i64,
    /// 难度（档位标签的小写形式）
    pub difficulty: String,
    /// 题干
    #[serde(rename = "questionStr")]
    pub question_str: String,
    /// 已乱序的答案选项列表
    pub answers: Vec<AnswerOption>,
}

impl GeneratedQuestion {
    /// 正确选项数量
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

/// 会话内已接受题干的集合，用于去重
///
/// 只追加；随会话结束丢弃
#[derive(Debug, Default)]
pub struct QuestionHistory {
    entries: Vec<String>,
}

impl QuestionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条已接受的题干
    pub fn push(&mut self, question: impl Into<String>) {
        self.entries.push(question.into());
    }

    /// 题干是否已出现过（精确匹配）
    pub fn contains(&self, question: &str) -> bool {
        self.entries.iter().any(|q| q == question)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 以只读切片暴露全部条目（供提示词构建使用）
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
