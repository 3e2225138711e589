// ==========================================
// 直销排名规划系统 - 排名解析引擎
// ==========================================
// 职责: 递归自底向上解析全员资格排名 (Paid-As Rank)
// 红线: 顾客类别无条件封顶最低排名; 缓存一次写入不覆盖
// ==========================================
// 环安全: 缓存兼做递归哨兵 — 入口先登记"解析中",
//         再次进入同一成员直接返回, 不继续递归
// ==========================================

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument, trace};

use crate::config::rank_rules::RankRuleset;
use crate::domain::member::MemberDirectory;
use crate::domain::types::Rank;
use crate::engine::compression::CompressionEngine;
use crate::engine::structure::DownlineTree;

// ==========================================
// RankCache - 单次解析过程的记忆化缓存
// ==========================================
// 显式对象, 由调用方持有并传入, 一次解析过程一个实例;
// 不同解析过程之间不得共享
#[derive(Debug, Default)]
pub struct RankCache {
    resolved: HashMap<String, Rank>,
    in_progress: HashSet<String>,
}

impl RankCache {
    /// 新建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询已定案的排名
    pub fn get(&self, member_id: &str) -> Option<Rank> {
        self.resolved.get(member_id).copied()
    }

    /// 已定案条目数
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// 入口哨兵登记; 已在解析中返回 false
    fn begin(&mut self, member_id: &str) -> bool {
        self.in_progress.insert(member_id.to_string())
    }

    /// 定案写入 (一次写入, 不覆盖已有条目)
    fn finalize(&mut self, member_id: &str, rank: Rank) -> Rank {
        self.in_progress.remove(member_id);
        *self.resolved.entry(member_id.to_string()).or_insert(rank)
    }
}

// ==========================================
// RankResolver - 排名解析引擎
// ==========================================
pub struct RankResolver<'a> {
    directory: &'a MemberDirectory,
    tree: &'a DownlineTree,
    ruleset: &'a RankRuleset,
}

impl<'a> RankResolver<'a> {
    /// 构造引擎, 规则表为只读配置显式传入
    pub fn new(directory: &'a MemberDirectory, tree: &'a DownlineTree, ruleset: &'a RankRuleset) -> Self {
        Self {
            directory,
            tree,
            ruleset,
        }
    }

    /// 解析单个成员的资格排名
    ///
    /// # 规则
    /// 1. 先递归解析全部直接下级 (自底向上, 分支排名先于父级可用)
    /// 2. 目录外编号 → 最低排名, 不报错 (按外部/未知方处理)
    /// 3. 顾客类别 → 无条件最低排名
    /// 4. 其余从最高到最低扫描, 取第一个三项检查全部通过的排名:
    ///    个人量 / 压缩团队量 / 合格分支数
    /// 5. 均不满足 → 最低排名
    pub fn resolve(&self, cache: &mut RankCache, member_id: &str) -> Rank {
        // 记忆化: 已定案直接返回
        if let Some(rank) = cache.get(member_id) {
            return rank;
        }
        // 递归哨兵: 解析中再次进入 (环数据), 按最低排名返回, 不再递归
        if !cache.begin(member_id) {
            trace!(member_id = %member_id, "检测到环引用, 哨兵截断");
            return Rank::lowest();
        }

        let Some(member) = self.directory.get(member_id) else {
            return cache.finalize(member_id, Rank::lowest());
        };

        // 自底向上: 先解析全部直接下级
        for child_id in self.tree.children(member_id) {
            self.resolve(cache, child_id);
        }

        // 顾客类别封顶, 任何交易量不可突破
        if member.is_customer() {
            return cache.finalize(member_id, Rank::lowest());
        }

        // 压缩团队量对本成员只算一次, 供各排名门槛比较
        let compression = CompressionEngine::new(self.directory, self.tree, self.ruleset);
        let pqv = member.qualifying_volume();
        let group_volume = compression.compressed_volume(member_id);

        let mut resolved = Rank::lowest();
        for rank in Rank::hierarchy().iter().rev() {
            if self.meets_requirements(cache, member_id, *rank, pqv, group_volume) {
                resolved = *rank;
                break;
            }
        }

        cache.finalize(member_id, resolved)
    }

    /// 解析全员排名, 返回成员编号 → 排名映射
    #[instrument(skip(self, cache), fields(member_count = self.directory.len()))]
    pub fn resolve_all(&self, cache: &mut RankCache) -> BTreeMap<String, Rank> {
        let mut ranks = BTreeMap::new();
        for member_id in self.directory.member_ids() {
            let rank = self.resolve(cache, member_id);
            ranks.insert(member_id.clone(), rank);
        }
        debug!(resolved = ranks.len(), "全员排名解析完成");
        ranks
    }

    /// 单排名三项资格检查
    fn meets_requirements(
        &self,
        cache: &RankCache,
        member_id: &str,
        rank: Rank,
        pqv: f64,
        group_volume: f64,
    ) -> bool {
        let req = self.ruleset.requirement(rank);

        // 检查 1: 个人合格交易量
        if pqv < req.min_pqv {
            return false;
        }

        // 检查 2: 压缩团队交易量
        if group_volume < req.min_group_volume {
            return false;
        }

        // 检查 3: 合格分支数 (分支排名此时已定案)
        if req.min_qualified_legs > 0 {
            let Some(leg_rank) = req.leg_rank else {
                return false;
            };
            let qualified = self
                .tree
                .children(member_id)
                .iter()
                .filter(|child_id| {
                    cache.get(child_id).unwrap_or_else(Rank::lowest) >= leg_rank
                })
                .count();
            if (qualified as u32) < req.min_qualified_legs {
                return false;
            }
        }

        true
    }

    /// 统计直接下级中排名不低于 leg_rank 的分支数
    pub fn qualified_leg_count(&self, cache: &RankCache, member_id: &str, leg_rank: Rank) -> u32 {
        self.tree
            .children(member_id)
            .iter()
            .filter(|child_id| cache.get(child_id).unwrap_or_else(Rank::lowest) >= leg_rank)
            .count() as u32
    }
}
