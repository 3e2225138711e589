// ==========================================
// 直销排名规划系统 - 战略规划编排引擎
// ==========================================
// 职责: 组合资格分析 / 资产分类 / 调配规划, 产出晋升方案
// 红线: 缺口填补顺序固定 — 本人个人量优先, 分支缺口从小到大;
//       超出可行动上限的分支缺口不进入规划
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::rank_rules::RankRuleset;
use crate::domain::member::MemberDirectory;
use crate::domain::order::{MovableOrder, OrderRecord};
use crate::domain::types::Rank;
use crate::engine::allocation::{GapKind, ReallocationPlan, ReallocationPlanner, VolumeGap};
use crate::engine::eligibility::{AssetClassifier, StrategicAssets};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::qualification::{QualificationAnalyzer, QualificationReport, RankGaps};
use crate::engine::rank_resolver::{RankCache, RankResolver};
use crate::engine::structure::DownlineTree;

/// 分支个人量缺口可行动上限, 超出视为本轮不可填补
pub const MAX_ACTIONABLE_LEG_GAP: f64 = 300.0;

// ==========================================
// QualifyingLeg - 已合格分支
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifyingLeg {
    pub member_id: String,
    pub name: String,
    pub rank: Rank,
    pub pqv: f64,
}

// ==========================================
// LegOpportunity - 差一步合格的分支机会
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegOpportunity {
    pub member_id: String,
    pub name: String,
    pub current_rank: Rank,
    pub current_pqv: f64,

    /// 分支需要达到的排名档位
    pub target_rank: Rank,

    /// 向该档位个人量门槛的缺口
    pub pqv_gap: f64,
}

// ==========================================
// AdvancementPlan - 目标排名晋升方案
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancementPlan {
    pub member_id: String,
    pub member_name: String,
    pub current_rank: Rank,
    pub desired_rank: Rank,
    pub current_pqv: f64,
    pub current_group_volume: f64,

    /// 向目标排名的三项差距
    pub gaps: RankGaps,

    /// 当前已合格分支
    pub current_qualifying_legs: Vec<QualifyingLeg>,

    /// 进入规划的分支机会 (缺口升序, 数量不超过分支差距)
    pub potential_qualifying_legs: Vec<LegOpportunity>,

    /// 调配规划结果
    pub plan: ReallocationPlan,

    /// 方案是否可达 (差距已清零, 或存在可调配来源且无 Shortfall)
    pub is_achievable: bool,
}

// ==========================================
// LeaderStrategyReport - 领导人综合战略报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderStrategyReport {
    pub qualification: QualificationReport,
    pub assets: StrategicAssets,
    pub plan: ReallocationPlan,
    pub as_of: NaiveDate,
}

// ==========================================
// StrategyOrchestrator - 战略规划编排引擎
// ==========================================
pub struct StrategyOrchestrator<'a> {
    directory: &'a MemberDirectory,
    ruleset: &'a RankRuleset,
}

impl<'a> StrategyOrchestrator<'a> {
    pub fn new(directory: &'a MemberDirectory, ruleset: &'a RankRuleset) -> Self {
        Self { directory, ruleset }
    }

    /// 生成向指定目标排名的晋升方案
    ///
    /// # 规则
    /// 1. 分支按目标排名的分支档位分为已合格 / 机会两类
    /// 2. 缺口顺序: 本人个人量优先, 分支机会按缺口升序
    /// 3. 分支机会数量以分支差距封顶, 缺口超过可行动上限者剔除
    /// 4. 订单池 = 调用方给定的可调配订单
    #[instrument(skip(self, donors), fields(target_id = %target_id, desired = ?desired_rank, donor_count = donors.len()))]
    pub fn advancement_plan(
        &self,
        target_id: &str,
        desired_rank: Rank,
        donors: Vec<MovableOrder>,
    ) -> EngineResult<AdvancementPlan> {
        let member = self
            .directory
            .get(target_id)
            .ok_or_else(|| EngineError::MemberNotFound(target_id.to_string()))?;

        let tree = DownlineTree::build(self.directory);
        let resolver = RankResolver::new(self.directory, &tree, self.ruleset);
        let mut cache = RankCache::new();
        let current_rank = resolver.resolve(&mut cache, target_id);

        let analyzer = QualificationAnalyzer::new(self.directory, &tree, self.ruleset);
        let report = analyzer.analyze(&mut cache, target_id)?;
        let gaps = analyzer.gaps_toward(&mut cache, target_id, desired_rank)?;

        // 分支分类: 目标排名无分支要求时两类皆空
        let req = self.ruleset.requirement(desired_rank);
        let mut current_qualifying_legs = Vec::new();
        let mut opportunities = Vec::new();
        if let Some(leg_rank) = req.leg_rank {
            let leg_req = self.ruleset.requirement(leg_rank);
            for child_id in tree.children(target_id) {
                let Some(child) = self.directory.get(child_id) else {
                    continue;
                };
                let child_rank = cache.get(child_id).unwrap_or_else(Rank::lowest);
                let child_pqv = child.qualifying_volume();
                if child_rank >= leg_rank {
                    current_qualifying_legs.push(QualifyingLeg {
                        member_id: child_id.clone(),
                        name: child.name.clone(),
                        rank: child_rank,
                        pqv: child_pqv,
                    });
                } else if !child.is_customer() {
                    // 顾客类别封顶最低排名, 补量无法使其成为合格分支
                    let pqv_gap = (leg_req.min_pqv - child_pqv).max(0.0);
                    if pqv_gap > 0.0 && pqv_gap <= MAX_ACTIONABLE_LEG_GAP {
                        opportunities.push(LegOpportunity {
                            member_id: child_id.clone(),
                            name: child.name.clone(),
                            current_rank: child_rank,
                            current_pqv: child_pqv,
                            target_rank: leg_rank,
                            pqv_gap,
                        });
                    }
                }
            }
        }

        // 缺口升序, 数量以分支差距封顶
        opportunities.sort_by(|a, b| {
            a.pqv_gap
                .partial_cmp(&b.pqv_gap)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        opportunities.truncate(gaps.leg_gap as usize);

        // 缺口清单: 本人个人量优先, 之后分支机会
        let mut volume_gaps = Vec::new();
        if gaps.pqv_gap > 0.0 {
            volume_gaps.push(VolumeGap {
                target_id: target_id.to_string(),
                target_name: member.name.clone(),
                kind: GapKind::Personal,
                amount: gaps.pqv_gap,
            });
        }
        for opportunity in &opportunities {
            volume_gaps.push(VolumeGap {
                target_id: opportunity.member_id.clone(),
                target_name: opportunity.name.clone(),
                kind: GapKind::Leg {
                    target_rank: opportunity.target_rank,
                },
                amount: opportunity.pqv_gap,
            });
        }

        let has_donors = !donors.is_empty();
        let plan = ReallocationPlanner::plan(&volume_gaps, donors);

        let is_achievable = gaps.is_met() || (has_donors && plan.fully_satisfied());

        debug!(
            current_rank = ?current_rank,
            desired = ?desired_rank,
            gap_count = volume_gaps.len(),
            achievable = is_achievable,
            "晋升方案生成完成"
        );

        Ok(AdvancementPlan {
            member_id: target_id.to_string(),
            member_name: member.name.clone(),
            current_rank,
            desired_rank,
            current_pqv: report.pqv,
            current_group_volume: report.compressed_volume,
            gaps,
            current_qualifying_legs,
            potential_qualifying_legs: opportunities,
            plan,
            is_achievable,
        })
    }

    /// 领导人综合战略分析: 资格报告 + 资产分类 + 下一排名调配规划
    ///
    /// # 规则
    /// 1. 订单池取资产分类的交易量来源清单
    /// 2. 缺口面向下一排名 (已达最高且无差距时缺口清单为空)
    /// 3. 分支机会 = 前线中向下一排名分支档位缺口在可行动上限内者
    #[instrument(skip(self, orders), fields(leader_id = %leader_id, order_count = orders.len()))]
    pub fn leader_strategy(
        &self,
        leader_id: &str,
        orders: &[OrderRecord],
        as_of: NaiveDate,
    ) -> EngineResult<LeaderStrategyReport> {
        let classifier = AssetClassifier::new(self.directory, self.ruleset);
        let assets = classifier.classify(leader_id, orders, as_of)?;

        let tree = DownlineTree::build(self.directory);
        let analyzer = QualificationAnalyzer::new(self.directory, &tree, self.ruleset);
        let mut cache = RankCache::new();
        let qualification = analyzer.analyze(&mut cache, leader_id)?;

        let mut volume_gaps = Vec::new();
        if let (Some(next_rank), Some(gaps)) = (qualification.next_rank, &qualification.gaps_to_next) {
            if gaps.pqv_gap > 0.0 {
                volume_gaps.push(VolumeGap {
                    target_id: leader_id.to_string(),
                    target_name: qualification.name.clone(),
                    kind: GapKind::Personal,
                    amount: gaps.pqv_gap,
                });
            }

            // 分支机会: 缺口在可行动上限内的非合格分支, 升序进入清单
            if let Some(leg_rank) = self.ruleset.requirement(next_rank).leg_rank {
                let leg_req = self.ruleset.requirement(leg_rank);
                let mut leg_gaps = Vec::new();
                for child_id in tree.children(leader_id) {
                    let Some(child) = self.directory.get(child_id) else {
                        continue;
                    };
                    if child.is_customer() {
                        continue;
                    }
                    let child_rank = cache.get(child_id).unwrap_or_else(Rank::lowest);
                    if child_rank >= leg_rank {
                        continue;
                    }
                    let pqv_gap = (leg_req.min_pqv - child.qualifying_volume()).max(0.0);
                    if pqv_gap > 0.0 && pqv_gap <= MAX_ACTIONABLE_LEG_GAP {
                        leg_gaps.push(VolumeGap {
                            target_id: child_id.clone(),
                            target_name: child.name.clone(),
                            kind: GapKind::Leg {
                                target_rank: leg_rank,
                            },
                            amount: pqv_gap,
                        });
                    }
                }
                leg_gaps.sort_by(|a, b| {
                    a.amount
                        .partial_cmp(&b.amount)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                leg_gaps.truncate(gaps.leg_gap as usize);
                volume_gaps.extend(leg_gaps);
            }
        }

        let plan = ReallocationPlanner::plan(&volume_gaps, assets.volume_donors.clone());

        debug!(
            leader_id = %leader_id,
            gap_count = volume_gaps.len(),
            moves = plan.total_moves(),
            "领导人战略分析完成"
        );

        Ok(LeaderStrategyReport {
            qualification,
            assets,
            plan,
            as_of,
        })
    }
}
