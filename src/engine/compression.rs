// ==========================================
// 直销排名规划系统 - 压缩团队量聚合引擎
// ==========================================
// 职责: 计算 3 压缩层团队合格交易量 (GQV-3CL)
// 红线: 单次聚合中任何节点不重复计数; 层级硬上限 3
// ==========================================
// 压缩规则: 个人量低于阈值的子成员不计量也不占层级,
//           其下线在同一层级继续参与计数
// ==========================================

use std::collections::HashSet;

use crate::config::rank_rules::RankRuleset;
use crate::domain::member::MemberDirectory;
use crate::engine::structure::DownlineTree;

/// 压缩层级硬上限
pub const MAX_COMPRESSED_TIERS: u32 = 3;

// ==========================================
// CompressionEngine - 压缩团队量聚合引擎
// ==========================================
pub struct CompressionEngine<'a> {
    directory: &'a MemberDirectory,
    tree: &'a DownlineTree,
    threshold: f64,
}

impl<'a> CompressionEngine<'a> {
    /// 构造引擎, 压缩阈值取自规则表 (最低非零个人量要求)
    pub fn new(directory: &'a MemberDirectory, tree: &'a DownlineTree, ruleset: &RankRuleset) -> Self {
        Self {
            directory,
            tree,
            threshold: ruleset.compression_threshold(),
        }
    }

    /// 计算成员的压缩团队交易量
    ///
    /// # 规则
    /// 1. 从第 1 层 (直接下线) 开始遍历
    /// 2. 子成员个人量 >= 阈值 → 计入其个人量, 其下线按下一层继续
    /// 3. 子成员个人量 < 阈值 → 不计量, 其下线按同层继续 (压缩)
    /// 4. 层级超过 3 终止; 不同起点之间不共享缓存
    ///    (压缩集合依赖层级相对位置, 跨起点复用会算错)
    pub fn compressed_volume(&self, member_id: &str) -> f64 {
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(member_id.to_string());
        self.traverse(member_id, 1, &mut visited)
    }

    /// 递归遍历压缩层级
    fn traverse(&self, current_id: &str, tier: u32, visited: &mut HashSet<String>) -> f64 {
        if tier > MAX_COMPRESSED_TIERS {
            return 0.0;
        }

        let mut total = 0.0;
        for child_id in self.tree.children(current_id) {
            // 已访问集合: 防环 + 保证单次聚合不重复计数
            if !visited.insert(child_id.clone()) {
                continue;
            }
            let Some(child) = self.directory.get(child_id) else {
                continue;
            };

            let child_pqv = child.qualifying_volume();
            if child_pqv >= self.threshold {
                total += child_pqv;
                total += self.traverse(child_id, tier + 1, visited);
            } else {
                // 压缩: 跳过本人, 下线留在当前层级
                total += self.traverse(child_id, tier, visited);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::member::Member;
    use crate::domain::types::EnrollmentClass;

    fn member(id: &str, pqv: f64, upline: Option<&str>) -> Member {
        Member {
            member_id: id.to_string(),
            name: format!("Member {id}"),
            enrollment_class: EnrollmentClass::Distributor,
            personal_volume: pqv,
            upline_id: upline.map(str::to_string),
            enroller_id: None,
            enrollment_date: None,
            hierarchy_level: None,
        }
    }

    fn build(members: Vec<Member>) -> (MemberDirectory, DownlineTree) {
        let directory = MemberDirectory::from_members(members);
        let tree = DownlineTree::build(&directory);
        (directory, tree)
    }

    // ==========================================
    // 测试 1: 基本层级累计
    // ==========================================

    #[test]
    fn test_three_tier_sum() {
        // 100 → 200 (60) → 300 (70) → 400 (80), 全部达阈值
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", 60.0, Some("100")),
            member("300", 70.0, Some("200")),
            member("400", 80.0, Some("300")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        assert_eq!(engine.compressed_volume("100"), 210.0);
    }

    #[test]
    fn test_tier_cap_excludes_fourth_level() {
        // 第 4 层成员不计入
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", 60.0, Some("100")),
            member("300", 70.0, Some("200")),
            member("400", 80.0, Some("300")),
            member("500", 90.0, Some("400")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        // 500 位于第 4 层, 超出上限
        assert_eq!(engine.compressed_volume("100"), 210.0);
    }

    // ==========================================
    // 测试 2: 压缩规则
    // ==========================================

    #[test]
    fn test_low_volume_member_compressed_out() {
        // 200 低于阈值: 不计量, 300 停留在第 1 层
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", 10.0, Some("100")),
            member("300", 70.0, Some("200")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        assert_eq!(engine.compressed_volume("100"), 70.0);
    }

    #[test]
    fn test_compression_extends_reach_beyond_three_generations() {
        // 两个低量中间人被压缩, 第 5 代成员仍落在第 3 压缩层内
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", 10.0, Some("100")), // 压缩
            member("300", 60.0, Some("200")), // 第 1 层
            member("400", 20.0, Some("300")), // 压缩
            member("500", 70.0, Some("400")), // 第 2 层
            member("600", 80.0, Some("500")), // 第 3 层
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        assert_eq!(engine.compressed_volume("100"), 210.0);
    }

    #[test]
    fn test_threshold_boundary_exactly_50_counts() {
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", 50.0, Some("100")),
            member("300", 49.99, Some("100")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        // 恰好达到阈值计入, 低于阈值压缩
        assert_eq!(engine.compressed_volume("100"), 50.0);
    }

    // ==========================================
    // 测试 3: 边界与健壮性
    // ==========================================

    #[test]
    fn test_no_downline_is_zero() {
        let (directory, tree) = build(vec![member("100", 300.0, None)]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        assert_eq!(engine.compressed_volume("100"), 0.0);
    }

    #[test]
    fn test_negative_volume_treated_as_zero() {
        let (directory, tree) = build(vec![
            member("100", 0.0, None),
            member("200", -30.0, Some("100")),
            member("300", 60.0, Some("200")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        // 负量按 0 处理 → 被压缩, 300 计入第 1 层
        assert_eq!(engine.compressed_volume("100"), 60.0);
    }

    #[test]
    fn test_cycle_does_not_double_count() {
        // 恶意数据: 100 → 200 → 100 环
        let (directory, tree) = build(vec![
            member("100", 60.0, Some("200")),
            member("200", 70.0, Some("100")),
        ]);
        let ruleset = RankRuleset::default();
        let engine = CompressionEngine::new(&directory, &tree, &ruleset);

        // 起点本身已在已访问集合, 环终止且不重复计数
        assert_eq!(engine.compressed_volume("100"), 70.0);
    }
}
