// ==========================================
// 直销排名规划系统 - 领域类型定义
// ==========================================
// 红线: 排名层级固定有序, 需求阈值走配置层
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 排名 (Rank)
// ==========================================
// 固定层级, 从低到高严格有序
// 序列化格式: 业务代码 (PCUST/ASC/.../BDA, 与上游报表一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "PCUST")]
    Pcust, // 优惠顾客
    #[serde(rename = "ASC")]
    Asc, // 经销员
    #[serde(rename = "BRA")]
    Bra, // 品牌经销员
    #[serde(rename = "SA")]
    Sa, // 销售经销员
    #[serde(rename = "SRA")]
    Sra, // 高级经销员
    #[serde(rename = "1SE")]
    Se1, // 一星总监
    #[serde(rename = "2SE")]
    Se2, // 二星总监
    #[serde(rename = "3SE")]
    Se3, // 三星总监
    #[serde(rename = "4SE")]
    Se4, // 四星总监
    #[serde(rename = "5SE")]
    Se5, // 五星总监
    #[serde(rename = "EA")]
    Ea, // 翡翠大使
    #[serde(rename = "RA")]
    Ra, // 红宝石大使
    #[serde(rename = "DA")]
    Da, // 钻石大使
    #[serde(rename = "BDA")]
    Bda, // 黑钻大使
}

/// 固定排名层级表, 从低到高
pub const RANK_HIERARCHY: [Rank; 14] = [
    Rank::Pcust,
    Rank::Asc,
    Rank::Bra,
    Rank::Sa,
    Rank::Sra,
    Rank::Se1,
    Rank::Se2,
    Rank::Se3,
    Rank::Se4,
    Rank::Se5,
    Rank::Ea,
    Rank::Ra,
    Rank::Da,
    Rank::Bda,
];

impl Rank {
    /// 最低排名 (顾客封顶位)
    pub fn lowest() -> Rank {
        Rank::Pcust
    }

    /// 固定层级表 (从低到高)
    pub fn hierarchy() -> &'static [Rank] {
        &RANK_HIERARCHY
    }

    /// 层级序号 (越高排名越好)
    pub fn level(self) -> usize {
        self as usize
    }

    /// 业务代码
    pub fn code(self) -> &'static str {
        match self {
            Rank::Pcust => "PCUST",
            Rank::Asc => "ASC",
            Rank::Bra => "BRA",
            Rank::Sa => "SA",
            Rank::Sra => "SRA",
            Rank::Se1 => "1SE",
            Rank::Se2 => "2SE",
            Rank::Se3 => "3SE",
            Rank::Se4 => "4SE",
            Rank::Se5 => "5SE",
            Rank::Ea => "EA",
            Rank::Ra => "RA",
            Rank::Da => "DA",
            Rank::Bda => "BDA",
        }
    }

    /// 从业务代码解析排名
    ///
    /// 未知代码返回 None, 由调用方决定是否按最低排名处理
    pub fn from_code(s: &str) -> Option<Rank> {
        match s.trim().to_uppercase().as_str() {
            "PCUST" => Some(Rank::Pcust),
            "ASC" => Some(Rank::Asc),
            "BRA" => Some(Rank::Bra),
            "SA" => Some(Rank::Sa),
            "SRA" => Some(Rank::Sra),
            "1SE" => Some(Rank::Se1),
            "2SE" => Some(Rank::Se2),
            "3SE" => Some(Rank::Se3),
            "4SE" => Some(Rank::Se4),
            "5SE" => Some(Rank::Se5),
            "EA" => Some(Rank::Ea),
            "RA" => Some(Rank::Ra),
            "DA" => Some(Rank::Da),
            "BDA" => Some(Rank::Bda),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 入会类别 (Enrollment Class)
// ==========================================
// 红线: Customer 永久封顶于最低排名, 交易量不可突破
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentClass {
    Customer,    // 优惠顾客 (PCUST)
    Distributor, // 经销商
}

impl EnrollmentClass {
    /// 从上游报表的 Title 字段解析类别
    pub fn from_title(title: &str) -> Self {
        if title.trim().eq_ignore_ascii_case("PCUST") {
            EnrollmentClass::Customer
        } else {
            EnrollmentClass::Distributor
        }
    }
}

impl fmt::Display for EnrollmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentClass::Customer => write!(f, "PCUST"),
            EnrollmentClass::Distributor => write!(f, "DISTRIBUTOR"),
        }
    }
}

// ==========================================
// 可移动性原因码 (Movability Reason)
// ==========================================
// 60天窗口判定的输出原因, 供诊断与展示层使用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovabilityReason {
    WithinWindow,          // 60天窗口内, 可移动
    WindowExceeded,        // 超过60天窗口, 已锁定
    MissingEnrollmentDate, // 入会日期缺失或无法解析
    NotApplicable,         // 非顾客类别, 规则不适用
}

impl fmt::Display for MovabilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovabilityReason::WithinWindow => write!(f, "WITHIN_WINDOW"),
            MovabilityReason::WindowExceeded => write!(f, "WINDOW_EXCEEDED"),
            MovabilityReason::MissingEnrollmentDate => write!(f, "MISSING_ENROLLMENT_DATE"),
            MovabilityReason::NotApplicable => write!(f, "NOT_APPLICABLE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Pcust < Rank::Asc);
        assert!(Rank::Sa < Rank::Sra);
        assert!(Rank::Da < Rank::Bda);
        assert_eq!(Rank::Pcust.level(), 0);
        assert_eq!(Rank::Bda.level(), 13);
    }

    #[test]
    fn test_rank_code_roundtrip() {
        for rank in Rank::hierarchy() {
            assert_eq!(Rank::from_code(rank.code()), Some(*rank));
        }
    }

    #[test]
    fn test_rank_from_code_unknown() {
        assert_eq!(Rank::from_code("XYZ"), None);
        assert_eq!(Rank::from_code(""), None);
    }

    #[test]
    fn test_enrollment_class_from_title() {
        assert_eq!(EnrollmentClass::from_title("PCUST"), EnrollmentClass::Customer);
        assert_eq!(EnrollmentClass::from_title(" pcust "), EnrollmentClass::Customer);
        assert_eq!(
            EnrollmentClass::from_title("DISTRIBUTOR"),
            EnrollmentClass::Distributor
        );
        assert_eq!(EnrollmentClass::from_title(""), EnrollmentClass::Distributor);
    }
}
