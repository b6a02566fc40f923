// ==========================================
// 五险一金计算系统 - 城市社保标准领域模型
// ==========================================
// 用途: 导入层写入, 计算引擎只读
// 对齐: cities 表
// ==========================================

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// CityStandard - 城市社保标准
// ==========================================
// 不变量: 0 < base_min <= base_max, 0 < rate < 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityStandard {
    pub city_name: String, // 城市名称（查找键）
    pub year: String,      // 年份
    pub base_min: i64,     // 社保基数下限
    pub base_max: i64,     // 社保基数上限
    pub rate: f64,         // 缴纳比例（小数, 如 0.16）
}

impl CityStandard {
    /// 将月平均工资截断到 [base_min, base_max] 区间, 得到缴费基数
    pub fn clamp_base(&self, avg_salary: Decimal) -> Decimal {
        let min = Decimal::from(self.base_min);
        let max = Decimal::from(self.base_max);
        if avg_salary < min {
            min
        } else if avg_salary > max {
            max
        } else {
            avg_salary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> CityStandard {
        CityStandard {
            city_name: "北京".to_string(),
            year: "2024".to_string(),
            base_min: 5000,
            base_max: 30000,
            rate: 0.16,
        }
    }

    #[test]
    fn test_clamp_base_within_range() {
        assert_eq!(beijing().clamp_base(Decimal::from(9000)), Decimal::from(9000));
    }

    #[test]
    fn test_clamp_base_bounds() {
        let city = beijing();
        assert_eq!(city.clamp_base(Decimal::from(3000)), Decimal::from(5000));
        assert_eq!(city.clamp_base(Decimal::from(40000)), Decimal::from(30000));
        // 边界值本身不截断
        assert_eq!(city.clamp_base(Decimal::from(5000)), Decimal::from(5000));
        assert_eq!(city.clamp_base(Decimal::from(30000)), Decimal::from(30000));
    }
}
