// ==========================================
// 直销排名规划系统 - 演示主入口
// ==========================================
// 系统定位: 决策支持系统 (人工最终控制权)
// 职责: 构建示例组织, 演示排名解析与战略规划全流程
// ==========================================

use chrono::NaiveDate;
use mlm_rank_planner::{
    logging, AssetClassifier, DownlineTree, EnrollmentClass, LevelAssigner, Member,
    MemberDirectory, OrderRecord, QualificationAnalyzer, Rank, RankCache, RankResolver,
    RankRuleset, StrategyOrchestrator,
};

fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 决策支持系统", mlm_rank_planner::APP_NAME);
    tracing::info!("系统版本: {}", mlm_rank_planner::VERSION);
    tracing::info!("==================================================");

    let as_of = NaiveDate::from_ymd_opt(2025, 6, 30).expect("固定基准日期");
    let mut directory = sample_directory();
    let ruleset = RankRuleset::default();

    let summary = directory.summary();
    tracing::info!(
        total = summary.total_members,
        distributors = summary.distributors,
        customers = summary.customers,
        with_volume = summary.members_with_volume,
        "成员目录摘要"
    );

    // ==========================================
    // 阶段 1: 组织结构
    // ==========================================
    let tree = DownlineTree::build(&directory);
    let assignment = LevelAssigner::assign(&directory, &tree)?;
    directory.apply_levels(&assignment.levels);
    tracing::info!(
        root = %assignment.root_id,
        members = directory.len(),
        orphans = assignment.orphans.len(),
        max_level = assignment.levels.values().max().copied().unwrap_or(0),
        "组织结构构建完成"
    );

    // ==========================================
    // 阶段 2: 全员排名解析
    // ==========================================
    let resolver = RankResolver::new(&directory, &tree, &ruleset);
    let mut cache = RankCache::new();
    let ranks = resolver.resolve_all(&mut cache);
    for rank in Rank::hierarchy() {
        let count = ranks.values().filter(|r| **r == *rank).count();
        if count > 0 {
            tracing::info!(rank = rank.code(), count, "排名分布");
        }
    }

    // ==========================================
    // 阶段 3: 领导人资格与战略分析
    // ==========================================
    let leader_id = "1001";
    let orders = sample_orders();

    let analyzer = QualificationAnalyzer::new(&directory, &tree, &ruleset);
    let report = analyzer.analyze(&mut cache, leader_id)?;
    tracing::info!(
        leader = %report.name,
        current_rank = report.current_rank.code(),
        pqv = report.pqv,
        gqv = report.compressed_volume,
        next_rank = ?report.next_rank.map(|r| r.code()),
        "资格报告"
    );

    let classifier = AssetClassifier::new(&directory, &ruleset);
    let assets = classifier.classify(leader_id, &orders, as_of)?;
    tracing::info!(
        frontline = assets.frontline_customer_count,
        donors = assets.volume_donors.len(),
        placeable = assets.placeable_assets.len(),
        diagnostics = assets.diagnostics.len(),
        "战略资产分类"
    );

    let orchestrator = StrategyOrchestrator::new(&directory, &ruleset);
    let strategy = orchestrator.leader_strategy(leader_id, &orders, as_of)?;
    tracing::info!(
        moves = strategy.plan.total_moves(),
        fully_satisfied = strategy.plan.fully_satisfied(),
        remaining_pool = strategy.plan.remaining_pool.len(),
        "战略调配规划"
    );
    for allocation in &strategy.plan.allocations {
        tracing::info!(
            target = %allocation.gap.target_name,
            kind = ?allocation.gap.kind,
            amount = allocation.gap.amount,
            status = ?allocation.status,
            allocated = allocation.allocated_volume,
            "缺口分配明细"
        );
    }

    Ok(())
}

/// 示例组织: 领导人 + 分销商分支 + 新老顾客前线
fn sample_directory() -> MemberDirectory {
    let member = |id: &str,
                  name: &str,
                  class: EnrollmentClass,
                  pqv: f64,
                  upline: Option<&str>,
                  enroller: Option<&str>,
                  enrolled: Option<(i32, u32, u32)>| Member {
        member_id: id.to_string(),
        name: name.to_string(),
        enrollment_class: class,
        personal_volume: pqv,
        upline_id: upline.map(str::to_string),
        enroller_id: enroller.map(str::to_string),
        enrollment_date: enrolled.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        hierarchy_level: None,
    };

    MemberDirectory::from_members(vec![
        member("1001", "李明", EnrollmentClass::Distributor, 180.0, None, None, Some((2022, 3, 1))),
        member("2001", "王芳", EnrollmentClass::Distributor, 160.0, Some("1001"), Some("1001"), Some((2023, 5, 10))),
        member("2002", "张伟", EnrollmentClass::Distributor, 155.0, Some("1001"), Some("1001"), Some((2023, 8, 2))),
        member("2003", "刘洋", EnrollmentClass::Distributor, 120.0, Some("1001"), Some("1001"), Some((2024, 1, 15))),
        // 窗口外顾客 (订单可调配)
        member("3001", "陈静", EnrollmentClass::Customer, 90.0, Some("1001"), Some("1001"), Some((2025, 2, 1))),
        member("3002", "赵磊", EnrollmentClass::Customer, 60.0, Some("1001"), Some("1001"), Some((2025, 3, 10))),
        // 窗口内顾客 (可安置资产)
        member("3003", "孙丽", EnrollmentClass::Customer, 45.0, Some("1001"), Some("1001"), Some((2025, 6, 5))),
        // 分支下线
        member("4001", "周军", EnrollmentClass::Distributor, 80.0, Some("2001"), Some("2001"), Some((2024, 6, 1))),
        member("4002", "吴敏", EnrollmentClass::Distributor, 70.0, Some("2002"), Some("2002"), Some((2024, 9, 20))),
    ])
}

/// 示例订单: 窗口外顾客的可调配交易量
fn sample_orders() -> Vec<OrderRecord> {
    let order = |member_id: &str, order_id: &str, volume: f64, autoship: bool| OrderRecord {
        member_id: member_id.to_string(),
        order_id: order_id.to_string(),
        volume,
        order_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        autoship,
    };

    vec![
        order("3001", "ORD-9001", 55.0, false),
        order("3001", "ORD-9002", 35.0, true),
        order("3002", "ORD-9003", 60.0, false),
    ]
}
