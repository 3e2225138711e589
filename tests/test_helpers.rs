// ==========================================
// 集成测试公共辅助
// ==========================================
// 职责: 成员/目录/订单构造器与固定基准日期
// ==========================================

#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use mlm_rank_planner::{EnrollmentClass, Member, MemberDirectory, OrderRecord};

/// 固定分析基准日期
pub fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
}

/// 基准日期之前 n 天
pub fn days_ago(days: i64) -> NaiveDate {
    as_of() - Duration::days(days)
}

/// 创建测试用分销商
pub fn distributor(id: &str, pqv: f64, upline: Option<&str>) -> Member {
    Member {
        member_id: id.to_string(),
        name: format!("Distributor {id}"),
        enrollment_class: EnrollmentClass::Distributor,
        personal_volume: pqv,
        upline_id: upline.map(str::to_string),
        enroller_id: upline.map(str::to_string),
        enrollment_date: Some(days_ago(365)),
        hierarchy_level: None,
    }
}

/// 创建测试用顾客 (推荐人与入会日期可控)
pub fn customer(
    id: &str,
    pqv: f64,
    upline: Option<&str>,
    enroller: Option<&str>,
    enrolled: Option<NaiveDate>,
) -> Member {
    Member {
        member_id: id.to_string(),
        name: format!("Customer {id}"),
        enrollment_class: EnrollmentClass::Customer,
        personal_volume: pqv,
        upline_id: upline.map(str::to_string),
        enroller_id: enroller.map(str::to_string),
        enrollment_date: enrolled,
        hierarchy_level: None,
    }
}

/// 构建成员目录
pub fn directory(members: Vec<Member>) -> MemberDirectory {
    MemberDirectory::from_members(members)
}

/// 创建测试用订单
pub fn order(member_id: &str, order_id: &str, volume: f64, autoship: bool) -> OrderRecord {
    OrderRecord {
        member_id: member_id.to_string(),
        order_id: order_id.to_string(),
        volume,
        order_date: Some(days_ago(30)),
        autoship,
    }
}
