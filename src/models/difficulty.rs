/// 难度档位枚举
///
/// 按预期难度升序排列；轮次索引超出档位列表后固定停留在最后一档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DifficultyTier {
    /// 简单
    Easy,
    /// 中等
    Medium,
    /// 困难
    Hard,
    /// 非常困难
    VeryHard,
    /// 专家
    Expert,
}

/// 完整档位列表（升序）
pub const ALL_TIERS: [DifficultyTier; 5] = [
    DifficultyTier::Easy,
    DifficultyTier::Medium,
    DifficultyTier::Hard,
    DifficultyTier::VeryHard,
    DifficultyTier::Expert,
];

impl DifficultyTier {
    /// 获取提示词中使用的标签
    pub fn label(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
            DifficultyTier::VeryHard => "Very Hard",
            DifficultyTier::Expert => "Expert",
        }
    }

    /// 获取持久化端使用的小写值
    pub fn db_value(self) -> String {
        self.label().to_lowercase()
    }

    /// 根据轮次索引选择档位
    ///
    /// 档位列表耗尽后，最后一档无限重复
    pub fn for_round(round_index: usize) -> Self {
        ALL_TIERS[round_index.min(ALL_TIERS.len() - 1)]
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_for_round_in_range() {
        assert_eq!(DifficultyTier::for_round(0), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::for_round(1), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::for_round(2), DifficultyTier::Hard);
    }

    #[test]
    fn test_tier_clamps_to_last() {
        // 档位耗尽后固定在最后一档
        assert_eq!(DifficultyTier::for_round(4), DifficultyTier::Expert);
        assert_eq!(DifficultyTier::for_round(5), DifficultyTier::Expert);
        assert_eq!(DifficultyTier::for_round(100), DifficultyTier::Expert);
    }

    #[test]
    fn test_db_value_lowercased() {
        assert_eq!(DifficultyTier::Easy.db_value(), "easy");
        assert_eq!(DifficultyTier::VeryHard.db_value(), "very hard");
    }
}
