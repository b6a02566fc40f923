// ==========================================
// 五险一金计算系统 - 员工工资领域模型
// ==========================================
// 用途: 导入层写入, 计算引擎按员工分组聚合
// 对齐: salaries 表
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SalaryRecord - 员工月度工资
// ==========================================
// 每位员工每月（每个源行）一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub employee_id: String,   // 员工工号
    pub employee_name: String, // 员工姓名（分组键）
    pub city_name: String,     // 城市名称, 空串表示使用默认城市
    pub month: String,         // 月份 YYYYMM
    pub salary_amount: i64,    // 工资金额（非负整数）
}

impl SalaryRecord {
    /// 是否未指定城市（计算时回退到默认城市）
    pub fn uses_default_city(&self) -> bool {
        self.city_name.is_empty()
    }
}
