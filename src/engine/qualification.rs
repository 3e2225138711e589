// ==========================================
// 直销排名规划系统 - 资格差距分析引擎
// ==========================================
// 职责: 按成员输出资格报告: 当前排名 + 下一排名的三项差距
// 红线: 输出结构化数据, 文本渲染属于外部展示层
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

use crate::config::rank_rules::RankRuleset;
use crate::domain::member::MemberDirectory;
use crate::domain::types::Rank;
use crate::engine::compression::CompressionEngine;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rank_resolver::{RankCache, RankResolver};
use crate::engine::structure::DownlineTree;

// ==========================================
// RankGaps - 三项资格差距
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankGaps {
    /// 个人量差距
    pub pqv_gap: f64,

    /// 压缩团队量差距
    pub gqv_gap: f64,

    /// 合格分支数差距
    pub leg_gap: u32,
}

impl RankGaps {
    /// 三项差距是否全部清零
    pub fn is_met(&self) -> bool {
        self.pqv_gap <= 0.0 && self.gqv_gap <= 0.0 && self.leg_gap == 0
    }
}

// ==========================================
// QualificationReport - 成员资格报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualificationReport {
    pub member_id: String,
    pub name: String,

    /// 当前资格排名
    pub current_rank: Rank,

    /// 个人合格交易量
    pub pqv: f64,

    /// 压缩团队交易量 (GQV-3CL)
    pub compressed_volume: f64,

    /// 直接下级数量
    pub direct_children: usize,

    /// 各排名档位的合格分支数 (排名 → 不低于该排名的直接下级数)
    pub qualified_legs_by_rank: BTreeMap<Rank, u32>,

    /// 被差距阻塞的下一排名 (已达最高或上方全部满足时为 None)
    pub next_rank: Option<Rank>,

    /// 下一排名的三项差距 (与 next_rank 同步存在)
    pub gaps_to_next: Option<RankGaps>,
}

// ==========================================
// QualificationAnalyzer - 资格差距分析引擎
// ==========================================
pub struct QualificationAnalyzer<'a> {
    directory: &'a MemberDirectory,
    tree: &'a DownlineTree,
    ruleset: &'a RankRuleset,
}

impl<'a> QualificationAnalyzer<'a> {
    pub fn new(directory: &'a MemberDirectory, tree: &'a DownlineTree, ruleset: &'a RankRuleset) -> Self {
        Self {
            directory,
            tree,
            ruleset,
        }
    }

    /// 生成成员资格报告
    ///
    /// # 规则
    /// 1. 下一排名 = 当前排名之上第一个存在正差距的排名
    /// 2. 差距按 max(0, 要求 - 现状) 计算
    #[instrument(skip(self, cache), fields(member_id = %member_id))]
    pub fn analyze(&self, cache: &mut RankCache, member_id: &str) -> EngineResult<QualificationReport> {
        let member = self
            .directory
            .get(member_id)
            .ok_or_else(|| EngineError::MemberNotFound(member_id.to_string()))?;

        let resolver = RankResolver::new(self.directory, self.tree, self.ruleset);
        let current_rank = resolver.resolve(cache, member_id);

        let compression = CompressionEngine::new(self.directory, self.tree, self.ruleset);
        let pqv = member.qualifying_volume();
        let compressed_volume = compression.compressed_volume(member_id);

        // 各档位合格分支统计 (跳过最低排名)
        let mut qualified_legs_by_rank = BTreeMap::new();
        for rank in Rank::hierarchy().iter().skip(1) {
            qualified_legs_by_rank.insert(*rank, resolver.qualified_leg_count(cache, member_id, *rank));
        }

        // 下一排名: 当前之上第一个存在正差距的排名
        let mut next_rank = None;
        let mut gaps_to_next = None;
        for rank in Rank::hierarchy().iter() {
            if rank.level() <= current_rank.level() {
                continue;
            }
            let gaps = self.gaps_toward_inner(pqv, compressed_volume, &qualified_legs_by_rank, *rank);
            if !gaps.is_met() {
                next_rank = Some(*rank);
                gaps_to_next = Some(gaps);
                break;
            }
        }

        Ok(QualificationReport {
            member_id: member_id.to_string(),
            name: member.name.clone(),
            current_rank,
            pqv,
            compressed_volume,
            direct_children: self.tree.children(member_id).len(),
            qualified_legs_by_rank,
            next_rank,
            gaps_to_next,
        })
    }

    /// 计算成员向任意目标排名的三项差距
    pub fn gaps_toward(&self, cache: &mut RankCache, member_id: &str, desired: Rank) -> EngineResult<RankGaps> {
        let member = self
            .directory
            .get(member_id)
            .ok_or_else(|| EngineError::MemberNotFound(member_id.to_string()))?;

        let resolver = RankResolver::new(self.directory, self.tree, self.ruleset);
        // 分支排名先定案
        resolver.resolve(cache, member_id);

        let compression = CompressionEngine::new(self.directory, self.tree, self.ruleset);
        let pqv = member.qualifying_volume();
        let compressed_volume = compression.compressed_volume(member_id);

        let req = self.ruleset.requirement(desired);
        let qualified = match req.leg_rank {
            Some(leg_rank) => resolver.qualified_leg_count(cache, member_id, leg_rank),
            None => 0,
        };

        Ok(RankGaps {
            pqv_gap: (req.min_pqv - pqv).max(0.0),
            gqv_gap: (req.min_group_volume - compressed_volume).max(0.0),
            leg_gap: req.min_qualified_legs.saturating_sub(qualified),
        })
    }

    /// 内部差距计算 (合格分支数来自已统计档位)
    fn gaps_toward_inner(
        &self,
        pqv: f64,
        compressed_volume: f64,
        qualified_legs_by_rank: &BTreeMap<Rank, u32>,
        desired: Rank,
    ) -> RankGaps {
        let req = self.ruleset.requirement(desired);
        let qualified = req
            .leg_rank
            .and_then(|leg_rank| qualified_legs_by_rank.get(&leg_rank).copied())
            .unwrap_or(0);

        RankGaps {
            pqv_gap: (req.min_pqv - pqv).max(0.0),
            gqv_gap: (req.min_group_volume - compressed_volume).max(0.0),
            leg_gap: req.min_qualified_legs.saturating_sub(qualified),
        }
    }

    /// 成员当前排名之上的可冲击排名列表 (从低到高)
    pub fn achievable_ranks(current: Rank) -> Vec<Rank> {
        Rank::hierarchy()
            .iter()
            .filter(|rank| rank.level() > current.level())
            .copied()
            .collect()
    }
}
