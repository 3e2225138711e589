// ==========================================
// 直销排名规划系统 - 领域层
// ==========================================
// 职责: 定义领域实体与类型, 不含业务规则
// ==========================================

pub mod member;
pub mod order;
pub mod types;

pub use member::{DirectorySummary, Member, MemberDirectory};
pub use order::{MovableOrder, OrderRecord};
pub use types::{EnrollmentClass, MovabilityReason, Rank};
