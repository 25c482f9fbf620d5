//! 提示词构建器 - 业务能力层
//!
//! 纯函数：只依赖输入，不产生副作用

/// 系统消息
pub const SYSTEM_MESSAGE: &str = "You are a helpful research and analysis assistant";

/// 构建题目生成提示词
///
/// 对生成器提出的硬性要求：
/// - 恰好 N 道题，不多不少
/// - 每题恰好 4 个选项，标签 A-D
/// - 声明的难度必须与给定档位一致
/// - 不得复述或轻微改写历史列表中的任何题目
/// - 题目须覆盖全文的不同主题，而非集中在某一小节
/// - 正确答案位置由生成器自行随机（流水线不信任这一点，下游仍会独立乱序）
///
/// # 参数
/// - `content`: 拼接后的完整文档内容
/// - `num_questions`: 期望题目数量（正整数）
/// - `difficulty`: 难度档位标签
/// - `history`: 已生成题干列表（可能为空）
pub fn build_generation_prompt(
    content: &str,
    num_questions: usize,
    difficulty: &str,
    history: &[String],
) -> String {
    let history_clause = if history.is_empty() {
        String::new()
    } else {
        format!(
            "Do NOT repeat, restate, or lightly reword any of the following previously asked questions:\n{}\n\n",
            history
                .iter()
                .map(|q| format!("- {}", q))
                .collect::<Vec<_>>()
                .join("\n")
        )
    };

    format!(
        r#"Create exactly {num} multiple-choice questions (MCQs) based solely on the following notes—no more and no fewer:

{content}

Each question must have exactly 4 answer choices labeled A, B, C, and D.
The difficulty level for all questions is: {difficulty}.
Do not generate additional questions beyond the specified number ({num}).
{history_clause}Cover varied topics from across the entire notes, not just one narrow section.
Format the output strictly as follows, with precisely {num} questions:

Q1: <question text> ({difficulty})
A) <option 1>
B) <option 2>
C) <option 3>
D) <option 4>
Answer: <correct option>

Q2: <question text> ({difficulty})
A) <option 1>
B) <option 2>
C) <option 3>
D) <option 4>
Answer: <correct option>

Ensure that the correct answer appears randomly in different options 1, 2, 3, or 4 rather than just at position B. Let's begin:"#,
        num = num_questions,
        content = content,
        difficulty = difficulty,
        history_clause = history_clause,
    )
}
