// ==========================================
// 直销排名规划系统 - 配置层
// ==========================================
// 职责: 排名规则表的加载与校验
// 红线: 规则表为不可变配置对象, 显式传入引擎, 无全局状态
// ==========================================

pub mod rank_rules;

pub use rank_rules::{RankRequirement, RankRuleset, RulesetError};
