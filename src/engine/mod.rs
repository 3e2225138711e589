// ==========================================
// 直销排名规划系统 - 引擎层
// ==========================================
// 职责: 实现业务规则引擎, 不做 I/O
// 红线: 所有规则必须输出 reason, 异常成员记录诊断而非静默丢弃
// ==========================================

pub mod allocation;
pub mod compression;
pub mod eligibility;
pub mod error;
pub mod orchestrator;
pub mod qualification;
pub mod rank_resolver;
pub mod structure;

// 重导出核心引擎
pub use allocation::{
    AllocationStatus, GapAllocation, GapKind, ReallocationPlan, ReallocationPlanner, VolumeGap,
};
pub use compression::CompressionEngine;
pub use eligibility::{
    AssetClassifier, ClassifierDiagnostic, EligibilityWindow, PlaceableAsset, StrategicAssets,
};
pub use error::{EngineError, EngineResult};
pub use orchestrator::{
    AdvancementPlan, LeaderStrategyReport, LegOpportunity, QualifyingLeg, StrategyOrchestrator,
};
pub use qualification::{QualificationAnalyzer, QualificationReport, RankGaps};
pub use rank_resolver::{RankCache, RankResolver};
pub use structure::{DownlineTree, LevelAssigner, LevelAssignment};
