// ==========================================
// 直销排名规划系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 传播策略: 结构性异常 (无根节点等) 上抛;
//           成员级数据异常降级为诊断记录, 不中断全局计算
// ==========================================

use thiserror::Error;

use crate::config::rank_rules::RulesetError;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 结构性错误 =====
    #[error("未找到组织根节点: 目录中所有成员均有目录内上级")]
    NoOrganizationalRoot,

    // ===== 查询错误 =====
    #[error("成员未找到: {0}")]
    MemberNotFound(String),

    // ===== 配置错误 =====
    #[error("排名规则表错误: {0}")]
    Ruleset(#[from] RulesetError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
