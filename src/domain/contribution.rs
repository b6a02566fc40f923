// ==========================================
// 五险一金计算系统 - 计算结果领域模型
// ==========================================
// 用途: 计算引擎生成, 只追加不修改
// 对齐: results 表
// ==========================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// ContributionResult - 员工缴费计算结果
// ==========================================
// 金额字段均已四舍五入到 2 位小数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub run_id: String,               // 计算批次 ID
    pub employee_name: String,        // 员工姓名
    pub city_name: String,            // 实际采用的城市
    pub avg_salary: Decimal,          // 月平均工资
    pub contribution_base: Decimal,   // 缴费基数（已按上下限截断）
    pub company_fee: Decimal,         // 公司应缴金额
    pub rate: f64,                    // 缴纳比例（原样取自城市标准）
    pub calculated_at: DateTime<Utc>, // 计算时间
}
