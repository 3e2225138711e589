// ==========================================
// 直销排名规划系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (人工最终控制权)
// 职责: 排名资格计算 + 战略性交易量调配建议
// 红线: 核心层不做 I/O, 不做文本渲染, 输出结构化数据
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 排名规则表
pub mod config;

// 引擎层 - 业务规则
pub mod engine;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{EnrollmentClass, MovabilityReason, Rank};

// 领域实体
pub use domain::{DirectorySummary, Member, MemberDirectory, MovableOrder, OrderRecord};

// 配置
pub use config::{RankRequirement, RankRuleset};

// 引擎
pub use engine::{
    AssetClassifier, CompressionEngine, DownlineTree, LevelAssigner, QualificationAnalyzer,
    RankCache, RankResolver, ReallocationPlanner, StrategyOrchestrator,
};

// 引擎结果对象
pub use engine::{
    AdvancementPlan, AllocationStatus, EligibilityWindow, EngineError, EngineResult,
    GapAllocation, GapKind, LeaderStrategyReport, LevelAssignment, PlaceableAsset,
    QualificationReport, RankGaps, ReallocationPlan, StrategicAssets, VolumeGap,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "直销排名规划系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
