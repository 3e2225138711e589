// ==========================================
// 直销排名规划系统 - 排名规则表
// ==========================================
// 职责: 各排名的资格门槛 (个人量/压缩团队量/合格分支)
// 红线: 加载一次, 只读; 测试可替换规则表而无需全局可变状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::types::Rank;

// ==========================================
// 规则表错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum RulesetError {
    #[error("排名规则缺失: {0}")]
    MissingRank(Rank),

    #[error("排名规则无效 (rank={rank}): {message}")]
    InvalidRequirement { rank: Rank, message: String },

    #[error("规则表解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

// ==========================================
// RankRequirement - 单排名资格要求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequirement {
    /// 最低个人合格交易量 (PQV)
    pub min_pqv: f64,

    /// 最低压缩团队交易量 (GQV-3CL)
    pub min_group_volume: f64,

    /// 最少合格分支数
    pub min_qualified_legs: u32,

    /// 合格分支的最低排名 (min_qualified_legs > 0 时必填)
    #[serde(default)]
    pub leg_rank: Option<Rank>,

    /// 排名说明
    pub description: String,
}

// ==========================================
// RankRuleset - 完整规则表
// ==========================================
// 注意: 不直接派生 Deserialize, 外部加载必须经由 from_json_str 校验
#[derive(Debug, Clone)]
pub struct RankRuleset {
    requirements: BTreeMap<Rank, RankRequirement>,
}

impl RankRuleset {
    /// 从排名→要求映射构建规则表并校验
    ///
    /// # 校验规则
    /// 1. 层级表中的每个排名都必须有对应要求
    /// 2. 各最低阈值非负
    /// 3. min_qualified_legs > 0 时 leg_rank 必填
    pub fn new(requirements: BTreeMap<Rank, RankRequirement>) -> Result<Self, RulesetError> {
        for rank in Rank::hierarchy() {
            let req = requirements
                .get(rank)
                .ok_or(RulesetError::MissingRank(*rank))?;

            if req.min_pqv < 0.0 || req.min_group_volume < 0.0 {
                return Err(RulesetError::InvalidRequirement {
                    rank: *rank,
                    message: "最低阈值不可为负".to_string(),
                });
            }

            if req.min_qualified_legs > 0 && req.leg_rank.is_none() {
                return Err(RulesetError::InvalidRequirement {
                    rank: *rank,
                    message: "要求合格分支时必须指定分支最低排名".to_string(),
                });
            }
        }

        Ok(Self { requirements })
    }

    /// 从 JSON 文本加载规则表 (供外部配置层与测试替换规则)
    pub fn from_json_str(json: &str) -> Result<Self, RulesetError> {
        let requirements: BTreeMap<Rank, RankRequirement> = serde_json::from_str(json)?;
        Self::new(requirements)
    }

    /// 查询某排名的资格要求
    pub fn requirement(&self, rank: Rank) -> &RankRequirement {
        // new() 校验保证层级表全覆盖
        &self.requirements[&rank]
    }

    /// 压缩阈值: 最低的非零个人量要求 (参考规则表中为 50)
    ///
    /// 压缩团队量聚合 (GQV-3CL) 以此判定子成员是否"占用"一个层级
    pub fn compression_threshold(&self) -> f64 {
        let min = self
            .requirements
            .values()
            .map(|req| req.min_pqv)
            .filter(|&pqv| pqv > 0.0)
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() {
            min
        } else {
            0.0
        }
    }
}

impl Default for RankRuleset {
    /// 参考规则表 (YGY 酬金计划)
    fn default() -> Self {
        let mut requirements = BTreeMap::new();

        let mut add = |rank: Rank,
                       min_pqv: f64,
                       min_group_volume: f64,
                       min_qualified_legs: u32,
                       leg_rank: Option<Rank>,
                       description: &str| {
            requirements.insert(
                rank,
                RankRequirement {
                    min_pqv,
                    min_group_volume,
                    min_qualified_legs,
                    leg_rank,
                    description: description.to_string(),
                },
            );
        };

        add(Rank::Pcust, 0.0, 0.0, 0, None, "Preferred Customer");
        add(Rank::Asc, 50.0, 0.0, 0, None, "Associate");
        add(Rank::Bra, 100.0, 0.0, 0, None, "Brand Associate");
        add(Rank::Sa, 150.0, 0.0, 3, Some(Rank::Asc), "Sales Associate");
        add(Rank::Sra, 200.0, 1000.0, 3, Some(Rank::Bra), "Senior Associate");
        add(Rank::Se1, 250.0, 5400.0, 3, Some(Rank::Sa), "1 Star Executive");
        add(Rank::Se2, 300.0, 7500.0, 3, Some(Rank::Se1), "2 Star Executive");
        add(Rank::Se3, 300.0, 10500.0, 5, Some(Rank::Se1), "3 Star Executive");
        add(Rank::Se4, 300.0, 27000.0, 6, Some(Rank::Se1), "4 Star Executive");
        add(Rank::Se5, 300.0, 43200.0, 9, Some(Rank::Se1), "5 Star Executive");
        add(Rank::Ea, 300.0, 75000.0, 12, Some(Rank::Se1), "Emerald Ambassador");
        add(Rank::Ra, 300.0, 150000.0, 15, Some(Rank::Se1), "Ruby Ambassador");
        add(Rank::Da, 300.0, 300000.0, 18, Some(Rank::Se1), "Diamond Ambassador");
        add(Rank::Bda, 300.0, 600000.0, 21, Some(Rank::Se1), "Black Diamond Ambassador");

        Self { requirements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ruleset_covers_hierarchy() {
        let ruleset = RankRuleset::default();
        for rank in Rank::hierarchy() {
            let req = ruleset.requirement(*rank);
            assert!(req.min_pqv >= 0.0);
        }
    }

    #[test]
    fn test_default_compression_threshold() {
        let ruleset = RankRuleset::default();
        assert_eq!(ruleset.compression_threshold(), 50.0);
    }

    #[test]
    fn test_sa_requirements() {
        let ruleset = RankRuleset::default();
        let req = ruleset.requirement(Rank::Sa);
        assert_eq!(req.min_pqv, 150.0);
        assert_eq!(req.min_group_volume, 0.0);
        assert_eq!(req.min_qualified_legs, 3);
        assert_eq!(req.leg_rank, Some(Rank::Asc));
    }

    #[test]
    fn test_new_rejects_missing_rank() {
        let mut requirements = RankRuleset::default().requirements;
        requirements.remove(&Rank::Sra);
        let result = RankRuleset::new(requirements);
        assert!(matches!(result, Err(RulesetError::MissingRank(Rank::Sra))));
    }

    #[test]
    fn test_new_rejects_legs_without_leg_rank() {
        let mut requirements = RankRuleset::default().requirements;
        if let Some(req) = requirements.get_mut(&Rank::Sa) {
            req.leg_rank = None;
        }
        let result = RankRuleset::new(requirements);
        assert!(matches!(
            result,
            Err(RulesetError::InvalidRequirement { rank: Rank::Sa, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let ruleset = RankRuleset::default();
        let json = serde_json::to_string(&ruleset.requirements).expect("serialize");
        let parsed = RankRuleset::from_json_str(&json).expect("deserialize");
        assert_eq!(parsed.requirement(Rank::Se1).min_group_volume, 5400.0);
    }

    #[test]
    fn test_from_json_rejects_incomplete_table() {
        let json = r#"{"PCUST": {"min_pqv": 0.0, "min_group_volume": 0.0, "min_qualified_legs": 0, "description": "Preferred Customer"}}"#;
        assert!(RankRuleset::from_json_str(json).is_err());
    }
}
