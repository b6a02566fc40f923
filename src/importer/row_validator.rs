// ==========================================
// 五险一金计算系统 - 行校验器实现
// ==========================================
// 职责: 单行字段解析 + 约束校验, 产出类型化记录或带行号的错误
// 规则: 首个失败规则即终止该行, 每行至多一条错误
// ==========================================

use crate::domain::{CityStandard, SalaryRecord};
use crate::importer::header_resolver::{CanonicalField, FieldMapping, HeaderResolver};
use crate::importer::importer_trait::{RawRow, RowValidator};
use thiserror::Error;

/// 行级校验违规原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowViolation {
    #[error("city name must not be empty")]
    EmptyCityName,

    #[error("year must not be empty")]
    EmptyYear,

    #[error("base_min must be a positive integer")]
    InvalidBaseMin,

    #[error("base_max must be a positive integer")]
    InvalidBaseMax,

    #[error("base_min must not exceed base_max")]
    BaseRangeInverted,

    #[error("rate must be a decimal between 0 and 1 (e.g. 0.15 for 15%)")]
    InvalidRate,

    #[error("employee_id must not be empty")]
    EmptyEmployeeId,

    #[error("employee_name must not be empty")]
    EmptyEmployeeName,

    #[error("month must not be empty")]
    EmptyMonth,

    #[error("month must be in YYYYMM format (e.g. 202401)")]
    InvalidMonthFormat,

    #[error("salary_amount must be a non-negative integer")]
    InvalidSalaryAmount,
}

impl RowViolation {
    /// 拼接行号: `row <n>: <reason>`
    pub fn at_row(&self, row_number: usize) -> String {
        format!("row {}: {}", row_number, self)
    }
}

// ==========================================
// 数值解析（取首部数字前缀, 与表格软件的宽松解析一致）
// ==========================================

/// 解析整数前缀: `"8000.50"` → 8000, `"abc"` → None
pub fn parse_leading_integer(value: &str) -> Option<i64> {
    let s = value.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<i64>().ok()
}

/// 解析小数前缀: `"0.16"` → 0.16, `".5"` → 0.5, `"1e-1"` → 0.1, `"x"` → None
pub fn parse_leading_float(value: &str) -> Option<f64> {
    let s = value.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let dot = end;
        end += 1;
        let mut fraction = 0;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            fraction += 1;
        }
        if fraction == 0 {
            end = dot;
        }
        digits += fraction;
    }
    if digits == 0 {
        return None;
    }
    // 指数部分: [eE][+-]?digits, 缺少数字时不计入
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok()
}

/// 月份格式: 恰好 6 位数字（YYYYMM）
pub fn is_valid_month(value: &str) -> bool {
    value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit())
}

// ==========================================
// CityRowValidator - 城市标准行校验
// ==========================================
pub struct CityRowValidator;

impl CityRowValidator {
    fn check(&self, row: &RawRow, mapping: &FieldMapping) -> Result<CityStandard, RowViolation> {
        let city_name = mapping.value(row, CanonicalField::CityName);
        if city_name.is_empty() {
            return Err(RowViolation::EmptyCityName);
        }

        let year = mapping.value(row, CanonicalField::Year);
        if year.is_empty() {
            return Err(RowViolation::EmptyYear);
        }

        let base_min = parse_leading_integer(mapping.value(row, CanonicalField::BaseMin))
            .filter(|v| *v > 0)
            .ok_or(RowViolation::InvalidBaseMin)?;

        let base_max = parse_leading_integer(mapping.value(row, CanonicalField::BaseMax))
            .filter(|v| *v > 0)
            .ok_or(RowViolation::InvalidBaseMax)?;

        if base_min > base_max {
            return Err(RowViolation::BaseRangeInverted);
        }

        let rate = parse_leading_float(mapping.value(row, CanonicalField::Rate))
            .filter(|r| *r > 0.0 && *r < 1.0)
            .ok_or(RowViolation::InvalidRate)?;

        Ok(CityStandard {
            city_name: city_name.to_string(),
            year: year.to_string(),
            base_min,
            base_max,
            rate,
        })
    }
}

impl RowValidator for CityRowValidator {
    type Record = CityStandard;

    fn header_resolver(&self) -> HeaderResolver {
        HeaderResolver::for_cities()
    }

    fn validate(
        &self,
        row: &RawRow,
        mapping: &FieldMapping,
        row_number: usize,
    ) -> Result<CityStandard, String> {
        self.check(row, mapping).map_err(|v| v.at_row(row_number))
    }
}

// ==========================================
// SalaryRowValidator - 员工工资行校验
// ==========================================
pub struct SalaryRowValidator;

impl SalaryRowValidator {
    fn check(&self, row: &RawRow, mapping: &FieldMapping) -> Result<SalaryRecord, RowViolation> {
        let employee_id = mapping.value(row, CanonicalField::EmployeeId);
        if employee_id.is_empty() {
            return Err(RowViolation::EmptyEmployeeId);
        }

        let employee_name = mapping.value(row, CanonicalField::EmployeeName);
        if employee_name.is_empty() {
            return Err(RowViolation::EmptyEmployeeName);
        }

        // 城市可为空, 计算时回退到默认城市
        let city_name = mapping.value(row, CanonicalField::CityName);

        let month = mapping.value(row, CanonicalField::Month);
        if month.is_empty() {
            return Err(RowViolation::EmptyMonth);
        }
        if !is_valid_month(month) {
            return Err(RowViolation::InvalidMonthFormat);
        }

        let salary_amount = parse_leading_integer(mapping.value(row, CanonicalField::SalaryAmount))
            .filter(|v| *v >= 0)
            .ok_or(RowViolation::InvalidSalaryAmount)?;

        Ok(SalaryRecord {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            city_name: city_name.to_string(),
            month: month.to_string(),
            salary_amount,
        })
    }
}

impl RowValidator for SalaryRowValidator {
    type Record = SalaryRecord;

    fn header_resolver(&self) -> HeaderResolver {
        HeaderResolver::for_salaries()
    }

    fn validate(
        &self,
        row: &RawRow,
        mapping: &FieldMapping,
        row_number: usize,
    ) -> Result<SalaryRecord, String> {
        self.check(row, mapping).map_err(|v| v.at_row(row_number))
    }
}
