// ==========================================
// 直销排名规划系统 - 组织结构引擎
// ==========================================
// 职责: 下线树构建 + 组织层级分配
// 红线: 子列表确定有序 (稳定可复现); 不可达成员必须上报为孤儿
// ==========================================
// 说明: 本层不做环检测, 环安全由排名解析器与层级分配器的
//       已访问集合保障
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::{debug, instrument, warn};

use crate::domain::member::MemberDirectory;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// DownlineTree - 下线树 (上级 → 直接下级列表)
// ==========================================
// 派生结构, 可随时从成员目录重建, 不做增量维护
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownlineTree {
    children: BTreeMap<String, Vec<String>>,
}

impl DownlineTree {
    /// 从成员目录构建下线树
    ///
    /// # 规则
    /// 1. 上级引用可解析且在目录内 → 挂入该上级的子列表
    /// 2. 无引用/空引用/目录外引用 → 视为目录根 (容忍, 不报错)
    /// 3. 子列表按成员编号升序去重, 保证下游遍历可复现
    #[instrument(skip(directory), fields(member_count = directory.len()))]
    pub fn build(directory: &MemberDirectory) -> Self {
        let mut children: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (member_id, member) in directory.iter() {
            let Some(upline_id) = member.upline_ref() else {
                continue;
            };
            // 目录外上级: 该成员按根处理, 引用本身不是错误
            if !directory.contains(upline_id) {
                continue;
            }
            children
                .entry(upline_id.to_string())
                .or_default()
                .push(member_id.clone());
        }

        // 确定有序: 升序 + 去重
        for list in children.values_mut() {
            list.sort();
            list.dedup();
        }

        debug!(parent_count = children.len(), "下线树构建完成");
        Self { children }
    }

    /// 查询直接下级列表 (无下级返回空切片)
    pub fn children(&self, member_id: &str) -> &[String] {
        self.children.get(member_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 有下级的上级数量
    pub fn parent_count(&self) -> usize {
        self.children.len()
    }

    /// 最大直接下级数量
    pub fn max_downline_size(&self) -> usize {
        self.children.values().map(Vec::len).max().unwrap_or(0)
    }
}

// ==========================================
// LevelAssignment - 层级分配结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelAssignment {
    /// 实际使用的组织根节点
    pub root_id: String,

    /// 全部候选根节点 (多根时由调用方消歧, 见设计说明)
    pub root_candidates: Vec<String>,

    /// 成员编号 → 距根代数 (根为 0)
    pub levels: BTreeMap<String, u32>,

    /// 从根不可达的成员 (必须上报, 不可静默丢弃)
    pub orphans: Vec<String>,
}

// ==========================================
// LevelAssigner - 组织层级分配器
// ==========================================
pub struct LevelAssigner;

impl LevelAssigner {
    /// 候选根节点: 无上级引用或上级不在目录内的成员, 按目录顺序
    pub fn root_candidates(directory: &MemberDirectory) -> Vec<String> {
        directory
            .iter()
            .filter(|(_, member)| {
                member
                    .upline_ref()
                    .map(|upline| !directory.contains(upline))
                    .unwrap_or(true)
            })
            .map(|(member_id, _)| member_id.clone())
            .collect()
    }

    /// 从组织根节点做广度优先层级分配
    ///
    /// # 规则
    /// 1. 无候选根 → NoOrganizationalRoot (结构性错误, 上抛)
    /// 2. 多候选根 → 确定性取目录顺序第一个, 全部候选随结果上报
    /// 3. 根为 0 级, 每个 L 级成员的直接下级为 L+1 级
    /// 4. 已访问集合防环, 每成员至多访问一次
    /// 5. 不可达成员列入 orphans
    #[instrument(skip(directory, tree), fields(member_count = directory.len()))]
    pub fn assign(directory: &MemberDirectory, tree: &DownlineTree) -> EngineResult<LevelAssignment> {
        let root_candidates = Self::root_candidates(directory);
        let Some(root_id) = root_candidates.first().cloned() else {
            return Err(EngineError::NoOrganizationalRoot);
        };

        if root_candidates.len() > 1 {
            warn!(
                candidate_count = root_candidates.len(),
                chosen = %root_id,
                "存在多个候选根节点, 按目录顺序取第一个"
            );
        }

        let mut levels: BTreeMap<String, u32> = BTreeMap::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, u32)> = VecDeque::new();

        visited.insert(root_id.clone());
        queue.push_back((root_id.clone(), 0));

        while let Some((current_id, level)) = queue.pop_front() {
            levels.insert(current_id.clone(), level);
            for child_id in tree.children(&current_id) {
                if visited.insert(child_id.clone()) {
                    queue.push_back((child_id.clone(), level + 1));
                }
            }
        }

        // 孤儿: 目录内但从根不可达
        let orphans: Vec<String> = directory
            .member_ids()
            .filter(|member_id| !levels.contains_key(*member_id))
            .cloned()
            .collect();

        if !orphans.is_empty() {
            warn!(orphan_count = orphans.len(), "存在从根不可达的孤儿成员");
        }

        debug!(
            root_id = %root_id,
            assigned = levels.len(),
            orphans = orphans.len(),
            "层级分配完成"
        );

        Ok(LevelAssignment {
            root_id,
            root_candidates,
            levels,
            orphans,
        })
    }
}
