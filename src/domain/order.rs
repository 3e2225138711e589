// ==========================================
// 直销排名规划系统 - 订单记录
// ==========================================
// 职责: 交易量调配的输入/候选单元, 与成员记录解耦
// 红线: 一个订单在一次规划过程中最多被分配一次
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderRecord - 规范化交易记录 (外部摄取层提供)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// 下单成员编号
    pub member_id: String,

    /// 订单编号
    pub order_id: String,

    /// 订单交易量
    pub volume: f64,

    /// 下单日期
    pub order_date: Option<NaiveDate>,

    /// 自动续购标记 (为 true 时不可作为调配来源)
    pub autoship: bool,
}

// ==========================================
// MovableOrder - 可调配订单 (资产分类器产出)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovableOrder {
    /// 来源成员编号
    pub source_id: String,

    /// 来源成员名称
    pub source_name: String,

    /// 订单编号
    pub order_id: String,

    /// 可调配交易量 (正值)
    pub volume: f64,

    /// 原始下单日期
    pub order_date: Option<NaiveDate>,
}
