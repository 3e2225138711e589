// ==========================================
// 直销排名规划系统 - 交易量调配规划引擎
// ==========================================
// 职责: 贪心式多缺口交易量分配 (大单优先)
// 红线: 一个订单在一次规划过程中最多被分配一次;
//       来源不足输出结构化 Shortfall, 不作为错误上抛
// ==========================================
// 说明: 缺口顺序由调用方决定, 本引擎按传入顺序逐个填补;
//       Shortfall 缺口同样消耗其已选订单 (不回流订单池)
// ==========================================

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::order::MovableOrder;
use crate::domain::types::Rank;

// ==========================================
// GapKind - 缺口类别
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GapKind {
    /// 领导人本人的个人量缺口
    Personal,

    /// 下级分支向目标排名的个人量缺口
    Leg { target_rank: Rank },
}

// ==========================================
// VolumeGap - 待填补的交易量缺口
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeGap {
    /// 缺口归属成员编号
    pub target_id: String,

    /// 缺口归属成员名称
    pub target_name: String,

    /// 缺口类别
    pub kind: GapKind,

    /// 缺口量 (<= 0 视为已满足)
    pub amount: f64,
}

// ==========================================
// AllocationStatus - 单缺口分配结果状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationStatus {
    /// 缺口为零或负, 无需分配
    AlreadyMet,

    /// 已选订单覆盖缺口
    Satisfied,

    /// 订单池耗尽仍未覆盖 (结构化上报, 非错误)
    Shortfall,
}

// ==========================================
// GapAllocation - 单缺口分配明细
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GapAllocation {
    pub gap: VolumeGap,
    pub status: AllocationStatus,

    /// 选中的调配订单 (Shortfall 时为已尽力的部分选择)
    pub selected_orders: Vec<MovableOrder>,

    /// 已分配交易量合计
    pub allocated_volume: f64,

    /// 剩余未覆盖量 (Satisfied / AlreadyMet 时为 0)
    pub shortfall: f64,
}

// ==========================================
// ReallocationPlan - 调配规划结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReallocationPlan {
    /// 按输入缺口顺序的分配明细
    pub allocations: Vec<GapAllocation>,

    /// 规划结束后仍未使用的订单
    pub remaining_pool: Vec<MovableOrder>,
}

impl ReallocationPlan {
    /// 实际发生的订单移动总数
    pub fn total_moves(&self) -> usize {
        self.allocations.iter().map(|a| a.selected_orders.len()).sum()
    }

    /// 全部缺口是否均已覆盖 (AlreadyMet 计入覆盖)
    pub fn fully_satisfied(&self) -> bool {
        self.allocations
            .iter()
            .all(|a| a.status != AllocationStatus::Shortfall)
    }
}

// ==========================================
// ReallocationPlanner - 交易量调配规划引擎
// ==========================================
pub struct ReallocationPlanner;

impl ReallocationPlanner {
    /// 贪心式多缺口分配
    ///
    /// # 规则
    /// 1. 缺口按传入顺序处理, 订单池全程共享
    /// 2. 缺口量 <= 0 → AlreadyMet, 不消耗任何订单
    /// 3. 候选订单按交易量降序尝试, 累计量首次达到缺口即停
    /// 4. 池耗尽仍未覆盖 → Shortfall, 已选订单照常消耗
    /// 5. 任何订单至多进入一个缺口的选择集
    #[instrument(skip(gaps, pool), fields(gap_count = gaps.len(), pool_size = pool.len()))]
    pub fn plan(gaps: &[VolumeGap], pool: Vec<MovableOrder>) -> ReallocationPlan {
        let mut pool = pool;
        // 大单优先: 降序一次排好, 后续从头部消耗
        pool.sort_by(|a, b| b.volume.partial_cmp(&a.volume).unwrap_or(std::cmp::Ordering::Equal));

        let mut allocations = Vec::with_capacity(gaps.len());
        for gap in gaps {
            if gap.amount <= 0.0 {
                allocations.push(GapAllocation {
                    gap: gap.clone(),
                    status: AllocationStatus::AlreadyMet,
                    selected_orders: Vec::new(),
                    allocated_volume: 0.0,
                    shortfall: 0.0,
                });
                continue;
            }

            let mut selected = Vec::new();
            let mut allocated = 0.0;
            while allocated < gap.amount && !pool.is_empty() {
                let order = pool.remove(0);
                allocated += order.volume;
                selected.push(order);
            }

            let covered = allocated >= gap.amount;
            allocations.push(GapAllocation {
                gap: gap.clone(),
                status: if covered {
                    AllocationStatus::Satisfied
                } else {
                    AllocationStatus::Shortfall
                },
                selected_orders: selected,
                allocated_volume: allocated,
                shortfall: if covered { 0.0 } else { gap.amount - allocated },
            });
        }

        debug!(
            allocations = allocations.len(),
            remaining = pool.len(),
            "交易量调配规划完成"
        );

        ReallocationPlan {
            allocations,
            remaining_pool: pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, volume: f64) -> MovableOrder {
        MovableOrder {
            source_id: format!("S{id}"),
            source_name: format!("Source {id}"),
            order_id: id.to_string(),
            volume,
            order_date: None,
        }
    }

    fn personal_gap(amount: f64) -> VolumeGap {
        VolumeGap {
            target_id: "100".to_string(),
            target_name: "Leader".to_string(),
            kind: GapKind::Personal,
            amount,
        }
    }

    // ==========================================
    // 测试 1: 贪心选单
    // ==========================================

    #[test]
    fn test_largest_order_first() {
        // 缺口 100, 池 [70, 40]: 先 70 再 40, 共 110 覆盖
        let plan = ReallocationPlanner::plan(
            &[personal_gap(100.0)],
            vec![order("A", 40.0), order("B", 70.0)],
        );

        let alloc = &plan.allocations[0];
        assert_eq!(alloc.status, AllocationStatus::Satisfied);
        assert_eq!(alloc.selected_orders.len(), 2);
        assert_eq!(alloc.selected_orders[0].order_id, "B");
        assert_eq!(alloc.allocated_volume, 110.0);
        assert_eq!(alloc.shortfall, 0.0);
        assert!(plan.remaining_pool.is_empty());
    }

    #[test]
    fn test_stops_at_first_coverage() {
        // 缺口 100, 池 [60, 60, 39]: 两单即覆盖, 第三单留池
        let plan = ReallocationPlanner::plan(
            &[personal_gap(100.0)],
            vec![order("A", 60.0), order("B", 60.0), order("C", 39.0)],
        );

        let alloc = &plan.allocations[0];
        assert_eq!(alloc.status, AllocationStatus::Satisfied);
        assert_eq!(alloc.selected_orders.len(), 2);
        assert_eq!(alloc.allocated_volume, 120.0);
        assert_eq!(plan.remaining_pool.len(), 1);
        assert_eq!(plan.remaining_pool[0].order_id, "C");
    }

    // ==========================================
    // 测试 2: 订单不可重复分配
    // ==========================================

    #[test]
    fn test_no_order_allocated_twice() {
        let mut leg_gap = personal_gap(50.0);
        leg_gap.target_id = "200".to_string();
        leg_gap.kind = GapKind::Leg {
            target_rank: Rank::Sa,
        };

        let plan = ReallocationPlanner::plan(
            &[personal_gap(80.0), leg_gap],
            vec![order("A", 90.0), order("B", 55.0)],
        );

        assert_eq!(plan.allocations[0].selected_orders.len(), 1);
        assert_eq!(plan.allocations[0].selected_orders[0].order_id, "A");
        assert_eq!(plan.allocations[1].selected_orders.len(), 1);
        assert_eq!(plan.allocations[1].selected_orders[0].order_id, "B");
        assert_eq!(plan.total_moves(), 2);
        assert!(plan.remaining_pool.is_empty());
    }

    // ==========================================
    // 测试 3: 边界状态
    // ==========================================

    #[test]
    fn test_already_met_consumes_nothing() {
        let plan = ReallocationPlanner::plan(&[personal_gap(0.0)], vec![order("A", 90.0)]);

        let alloc = &plan.allocations[0];
        assert_eq!(alloc.status, AllocationStatus::AlreadyMet);
        assert!(alloc.selected_orders.is_empty());
        assert_eq!(plan.remaining_pool.len(), 1);
        assert!(plan.fully_satisfied());
    }

    #[test]
    fn test_shortfall_reports_partial_selection() {
        let plan = ReallocationPlanner::plan(
            &[personal_gap(200.0)],
            vec![order("A", 60.0), order("B", 30.0)],
        );

        let alloc = &plan.allocations[0];
        assert_eq!(alloc.status, AllocationStatus::Shortfall);
        assert_eq!(alloc.selected_orders.len(), 2);
        assert_eq!(alloc.allocated_volume, 90.0);
        assert_eq!(alloc.shortfall, 110.0);
        assert!(plan.remaining_pool.is_empty());
        assert!(!plan.fully_satisfied());
    }

    #[test]
    fn test_shortfall_selection_not_reoffered_to_later_gaps() {
        // 首缺口 Shortfall 消耗全部订单, 次缺口空手
        let plan = ReallocationPlanner::plan(
            &[personal_gap(500.0), personal_gap(10.0)],
            vec![order("A", 60.0)],
        );

        assert_eq!(plan.allocations[0].status, AllocationStatus::Shortfall);
        assert_eq!(plan.allocations[1].status, AllocationStatus::Shortfall);
        assert!(plan.allocations[1].selected_orders.is_empty());
        assert_eq!(plan.allocations[1].shortfall, 10.0);
    }
}
