// ==========================================
// 直销排名规划系统 - 成员目录
// ==========================================
// 职责: 规范化成员记录的内存数据集, 仅数据不含规则
// 红线: 加载后不可变, 仅层级属性由层级分配器写入一次
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::types::EnrollmentClass;

// ==========================================
// Member - 成员记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// 成员编号 (唯一)
    pub member_id: String,

    /// 显示名称
    pub name: String,

    /// 入会类别 (顾客/经销商)
    pub enrollment_class: EnrollmentClass,

    /// 个人合格交易量 (PQV)
    pub personal_volume: f64,

    /// 直接上级编号 (组织根节点为 None 或外部编号)
    pub upline_id: Option<String>,

    /// 推荐人编号 (亲自引入该成员者, 可能不同于上级)
    pub enroller_id: Option<String>,

    /// 入会日期 (上游解析失败时为 None)
    pub enrollment_date: Option<NaiveDate>,

    /// 组织层级 (由层级分配器写入一次, 距根节点的代数)
    #[serde(default)]
    pub hierarchy_level: Option<u32>,
}

impl Member {
    /// 个人合格交易量 (负值按 0 处理)
    pub fn qualifying_volume(&self) -> f64 {
        if self.personal_volume > 0.0 {
            self.personal_volume
        } else {
            0.0
        }
    }

    /// 是否为顾客类别
    pub fn is_customer(&self) -> bool {
        self.enrollment_class == EnrollmentClass::Customer
    }

    /// 规范化后的上级引用 (空白字符串视为无引用)
    pub fn upline_ref(&self) -> Option<&str> {
        self.upline_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// 规范化后的推荐人引用
    pub fn enroller_ref(&self) -> Option<&str> {
        self.enroller_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// ==========================================
// DirectorySummary - 目录统计摘要
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub total_members: usize,
    pub distributors: usize,
    pub customers: usize,
    pub members_with_volume: usize,
}

// ==========================================
// MemberDirectory - 成员目录
// ==========================================
// BTreeMap 保证目录顺序确定 (按成员编号升序)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberDirectory {
    members: BTreeMap<String, Member>,
}

impl MemberDirectory {
    /// 空目录
    pub fn new() -> Self {
        Self {
            members: BTreeMap::new(),
        }
    }

    /// 从成员列表构建目录 (每输入行一条记录, 编号重复时后者覆盖前者)
    pub fn from_members(members: Vec<Member>) -> Self {
        let mut directory = Self::new();
        for member in members {
            directory.insert(member);
        }
        directory
    }

    /// 插入一条成员记录
    pub fn insert(&mut self, member: Member) {
        self.members.insert(member.member_id.clone(), member);
    }

    /// 按编号查询成员
    pub fn get(&self, member_id: &str) -> Option<&Member> {
        self.members.get(member_id)
    }

    /// 编号是否在目录中
    pub fn contains(&self, member_id: &str) -> bool {
        self.members.contains_key(member_id)
    }

    /// 成员总数
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// 目录是否为空
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 按目录顺序遍历成员
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Member)> {
        self.members.iter()
    }

    /// 按目录顺序遍历成员编号
    pub fn member_ids(&self) -> impl Iterator<Item = &String> {
        self.members.keys()
    }

    /// 写入层级分配结果 (每成员仅写入一次)
    pub fn apply_levels(&mut self, levels: &BTreeMap<String, u32>) {
        for (member_id, level) in levels {
            if let Some(member) = self.members.get_mut(member_id) {
                if member.hierarchy_level.is_none() {
                    member.hierarchy_level = Some(*level);
                }
            }
        }
    }

    /// 目录统计摘要
    pub fn summary(&self) -> DirectorySummary {
        let mut summary = DirectorySummary {
            total_members: self.members.len(),
            ..Default::default()
        };
        for member in self.members.values() {
            match member.enrollment_class {
                EnrollmentClass::Customer => summary.customers += 1,
                EnrollmentClass::Distributor => summary.distributors += 1,
            }
            if member.qualifying_volume() > 0.0 {
                summary.members_with_volume += 1;
            }
        }
        summary
    }
}
