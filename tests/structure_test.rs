// ==========================================
// 组织结构引擎集成测试
// ==========================================
// 测试目标: 下线树构建 + 层级分配
// 覆盖范围: 根识别、多根消歧、孤儿上报、环数据
// ==========================================

mod test_helpers;

use mlm_rank_planner::{DownlineTree, EngineError, LevelAssigner};
use test_helpers::{directory, distributor};

// ==========================================
// 测试 1: 下线树构建
// ==========================================

#[test]
fn test_children_sorted_by_member_id() {
    let dir = directory(vec![
        distributor("100", 0.0, None),
        distributor("300", 0.0, Some("100")),
        distributor("200", 0.0, Some("100")),
    ]);
    let tree = DownlineTree::build(&dir);

    assert_eq!(tree.children("100"), ["200", "300"]);
    assert!(tree.children("200").is_empty());
    assert_eq!(tree.parent_count(), 1);
    assert_eq!(tree.max_downline_size(), 2);
}

#[test]
fn test_out_of_directory_upline_treated_as_root() {
    let dir = directory(vec![
        distributor("100", 0.0, Some("999")),
        distributor("200", 0.0, Some("100")),
    ]);
    let tree = DownlineTree::build(&dir);

    // 999 不在目录内: 100 不挂任何上级
    assert_eq!(tree.children("100"), ["200"]);
    assert!(tree.children("999").is_empty());
}

// ==========================================
// 测试 2: 层级分配
// ==========================================

#[test]
fn test_bfs_levels_from_root() {
    let dir = directory(vec![
        distributor("100", 0.0, None),
        distributor("200", 0.0, Some("100")),
        distributor("300", 0.0, Some("200")),
        distributor("400", 0.0, Some("200")),
    ]);
    let tree = DownlineTree::build(&dir);
    let assignment = LevelAssigner::assign(&dir, &tree).expect("assignment");

    assert_eq!(assignment.root_id, "100");
    assert_eq!(assignment.levels["100"], 0);
    assert_eq!(assignment.levels["200"], 1);
    assert_eq!(assignment.levels["300"], 2);
    assert_eq!(assignment.levels["400"], 2);
    assert!(assignment.orphans.is_empty());
}

#[test]
fn test_multiple_roots_first_in_directory_order() {
    let dir = directory(vec![
        distributor("500", 0.0, None),
        distributor("100", 0.0, None),
        distributor("200", 0.0, Some("100")),
    ]);
    let tree = DownlineTree::build(&dir);
    let assignment = LevelAssigner::assign(&dir, &tree).expect("assignment");

    // 目录按编号升序: 100 先于 500
    assert_eq!(assignment.root_id, "100");
    assert_eq!(assignment.root_candidates, ["100", "500"]);
    // 另一候选根从选定根不可达, 列入孤儿
    assert_eq!(assignment.orphans, ["500"]);
}

#[test]
fn test_cycle_members_reported_as_orphans() {
    // 100 为根; 200/300 互为上级构成环, 从根不可达
    let dir = directory(vec![
        distributor("100", 0.0, None),
        distributor("200", 0.0, Some("300")),
        distributor("300", 0.0, Some("200")),
    ]);
    let tree = DownlineTree::build(&dir);
    let assignment = LevelAssigner::assign(&dir, &tree).expect("assignment");

    assert_eq!(assignment.root_id, "100");
    assert_eq!(assignment.orphans, ["200", "300"]);
}

#[test]
fn test_no_root_is_structural_error() {
    // 全员互指: 无候选根
    let dir = directory(vec![
        distributor("100", 0.0, Some("200")),
        distributor("200", 0.0, Some("100")),
    ]);
    let tree = DownlineTree::build(&dir);
    let result = LevelAssigner::assign(&dir, &tree);

    assert!(matches!(result, Err(EngineError::NoOrganizationalRoot)));
}
