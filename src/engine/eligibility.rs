// ==========================================
// 直销排名规划系统 - 战略资产分类引擎
// ==========================================
// 职责: 按 60 天移动窗口把领导人的顾客前线分为
//       交易量来源 (已锁定, 订单可调配) 与可安置资产 (仍可移动)
// 红线: 任何成员/订单被排除都必须附带原因, 不得静默丢弃
// ==========================================
// 契约说明: classify 内部重建下线树并重算全员排名,
//           调用方按只读查询对待, 不得假设增量开销
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::rank_rules::RankRuleset;
use crate::domain::member::{Member, MemberDirectory};
use crate::domain::order::{MovableOrder, OrderRecord};
use crate::domain::types::{MovabilityReason, Rank};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::rank_resolver::{RankCache, RankResolver};
use crate::engine::structure::DownlineTree;

/// 顾客移动窗口 (天)
pub const MOVE_WINDOW_DAYS: i64 = 60;

// ==========================================
// EligibilityWindow - 窗口判定结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityWindow {
    pub member_id: String,

    /// 是否仍可移动
    pub can_move: bool,

    /// 入会至今天数 (日期缺失时为 None)
    pub elapsed_days: Option<i64>,

    /// 窗口剩余天数 (下限 0, 无论是否可移动都上报)
    pub days_remaining: i64,

    /// 判定原因码
    pub reason: MovabilityReason,
}

// ==========================================
// PlaceableAsset - 可安置资产 (窗口内 + 领导人亲自推荐)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceableAsset {
    pub member_id: String,
    pub name: String,
    pub enrollment_date: NaiveDate,
    pub days_since_enrollment: i64,
    pub days_remaining: i64,
}

// ==========================================
// ClassifierDiagnostic - 分类诊断记录
// ==========================================
// 前线顾客未进入任一清单时的原因载体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierDiagnostic {
    pub member_id: String,
    pub name: String,

    /// 诊断原因 (机器可读前缀 + 细节)
    pub reason: String,

    /// 对应的窗口判定
    pub window: EligibilityWindow,
}

// ==========================================
// StrategicAssets - 战略资产报告
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicAssets {
    pub leader_id: String,
    pub leader_name: String,

    /// 领导人直接下级中当前为最低排名的人数
    pub frontline_customer_count: usize,

    /// 交易量来源订单 (窗口外成员的非自动续购订单)
    pub volume_donors: Vec<MovableOrder>,

    /// 可安置资产 (窗口内 + 亲自推荐)
    pub placeable_assets: Vec<PlaceableAsset>,

    /// 诊断记录 (未入清单的前线顾客及原因)
    pub diagnostics: Vec<ClassifierDiagnostic>,

    /// 分析基准日期
    pub as_of: NaiveDate,
}

// ==========================================
// AssetClassifier - 战略资产分类引擎
// ==========================================
pub struct AssetClassifier<'a> {
    directory: &'a MemberDirectory,
    ruleset: &'a RankRuleset,
}

impl<'a> AssetClassifier<'a> {
    pub fn new(directory: &'a MemberDirectory, ruleset: &'a RankRuleset) -> Self {
        Self { directory, ruleset }
    }

    /// 60 天移动窗口判定 (纯函数)
    ///
    /// # 规则
    /// 1. 仅适用于顾客类别; 其他类别上报 NOT_APPLICABLE
    /// 2. 入会日期缺失 → 不可移动 + MISSING_ENROLLMENT_DATE 诊断
    /// 3. elapsed <= 60 → 可移动; elapsed > 60 → 锁定
    /// 4. days_remaining = max(0, 60 - elapsed), 始终上报
    pub fn window(member: &Member, as_of: NaiveDate) -> EligibilityWindow {
        if !member.is_customer() {
            let elapsed = member
                .enrollment_date
                .map(|date| as_of.signed_duration_since(date).num_days());
            return EligibilityWindow {
                member_id: member.member_id.clone(),
                can_move: false,
                elapsed_days: elapsed,
                days_remaining: elapsed.map(|e| (MOVE_WINDOW_DAYS - e).max(0)).unwrap_or(0),
                reason: MovabilityReason::NotApplicable,
            };
        }

        let Some(enrollment_date) = member.enrollment_date else {
            return EligibilityWindow {
                member_id: member.member_id.clone(),
                can_move: false,
                elapsed_days: None,
                days_remaining: 0,
                reason: MovabilityReason::MissingEnrollmentDate,
            };
        };

        let elapsed = as_of.signed_duration_since(enrollment_date).num_days();
        let can_move = elapsed <= MOVE_WINDOW_DAYS;
        EligibilityWindow {
            member_id: member.member_id.clone(),
            can_move,
            elapsed_days: Some(elapsed),
            days_remaining: (MOVE_WINDOW_DAYS - elapsed).max(0),
            reason: if can_move {
                MovabilityReason::WithinWindow
            } else {
                MovabilityReason::WindowExceeded
            },
        }
    }

    /// 领导人战略资产分类
    ///
    /// # 规则
    /// 1. 前线顾客 = 领导人直接下级中解析排名为最低档者
    /// 2. 窗口外 (锁定) → 其非自动续购订单进入交易量来源清单
    /// 3. 窗口内 且 推荐人为该领导人 → 可安置资产
    ///    (仅上级关系不满足亲自推荐条件)
    /// 4. 其余情况 (日期缺失/窗口内非亲推/窗口外无可用订单)
    ///    → 诊断记录
    #[instrument(skip(self, orders), fields(leader_id = %leader_id, order_count = orders.len()))]
    pub fn classify(
        &self,
        leader_id: &str,
        orders: &[OrderRecord],
        as_of: NaiveDate,
    ) -> EngineResult<StrategicAssets> {
        let leader = self
            .directory
            .get(leader_id)
            .ok_or_else(|| EngineError::MemberNotFound(leader_id.to_string()))?;

        // 只读查询契约: 内部重建结构并重算排名
        let tree = DownlineTree::build(self.directory);
        let resolver = RankResolver::new(self.directory, &tree, self.ruleset);
        let mut cache = RankCache::new();
        resolver.resolve_all(&mut cache);

        let mut frontline: Vec<&Member> = Vec::new();
        for child_id in tree.children(leader_id) {
            if cache.get(child_id) == Some(Rank::lowest()) {
                if let Some(child) = self.directory.get(child_id) {
                    frontline.push(child);
                }
            }
        }

        let mut volume_donors = Vec::new();
        let mut placeable_assets = Vec::new();
        let mut diagnostics = Vec::new();

        for member in &frontline {
            let window = Self::window(member, as_of);

            match window.reason {
                MovabilityReason::WindowExceeded => {
                    // 交易量来源: 非自动续购订单可调配
                    let mut donated = 0usize;
                    for order in orders {
                        if order.member_id == member.member_id && !order.autoship {
                            volume_donors.push(MovableOrder {
                                source_id: member.member_id.clone(),
                                source_name: member.name.clone(),
                                order_id: order.order_id.clone(),
                                volume: order.volume,
                                order_date: order.order_date,
                            });
                            donated += 1;
                        }
                    }
                    if donated == 0 {
                        diagnostics.push(ClassifierDiagnostic {
                            member_id: member.member_id.clone(),
                            name: member.name.clone(),
                            reason: "NO_MOVABLE_ORDERS: 窗口外成员无可调配订单".to_string(),
                            window,
                        });
                    }
                }
                MovabilityReason::WithinWindow => {
                    if member.enroller_ref() == Some(leader_id) {
                        // enrollment_date 在 WithinWindow 分支必然存在
                        if let (Some(date), Some(elapsed)) = (member.enrollment_date, window.elapsed_days) {
                            placeable_assets.push(PlaceableAsset {
                                member_id: member.member_id.clone(),
                                name: member.name.clone(),
                                enrollment_date: date,
                                days_since_enrollment: elapsed,
                                days_remaining: window.days_remaining,
                            });
                        }
                    } else {
                        diagnostics.push(ClassifierDiagnostic {
                            member_id: member.member_id.clone(),
                            name: member.name.clone(),
                            reason: format!(
                                "NOT_PERSONALLY_ENROLLED: enroller={} != leader={}",
                                member.enroller_ref().unwrap_or("-"),
                                leader_id
                            ),
                            window,
                        });
                    }
                }
                MovabilityReason::MissingEnrollmentDate => {
                    diagnostics.push(ClassifierDiagnostic {
                        member_id: member.member_id.clone(),
                        name: member.name.clone(),
                        reason: "MISSING_ENROLLMENT_DATE: 入会日期缺失或无法解析".to_string(),
                        window,
                    });
                }
                MovabilityReason::NotApplicable => {
                    // 前线筛选已按最低排名过滤, 理论不可达; 仍记录诊断
                    diagnostics.push(ClassifierDiagnostic {
                        member_id: member.member_id.clone(),
                        name: member.name.clone(),
                        reason: "NOT_APPLICABLE: 非顾客类别".to_string(),
                        window,
                    });
                }
            }
        }

        debug!(
            frontline = frontline.len(),
            donors = volume_donors.len(),
            placeable = placeable_assets.len(),
            diagnostics = diagnostics.len(),
            "战略资产分类完成"
        );

        Ok(StrategicAssets {
            leader_id: leader_id.to_string(),
            leader_name: leader.name.clone(),
            frontline_customer_count: frontline.len(),
            volume_donors,
            placeable_assets,
            diagnostics,
            as_of,
        })
    }
}
