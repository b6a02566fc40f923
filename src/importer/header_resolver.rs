// ==========================================
// 五险一金计算系统 - 表头解析器
// ==========================================
// 职责: 源表头 → 标准字段映射（中英文 + 常见拼写错误）
// 规则: 表头去首尾空白后区分大小写匹配, 按列顺序首个命中者胜出
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::RawRow;
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CanonicalField - 标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    CityName,
    Year,
    BaseMin,
    BaseMax,
    Rate,
    EmployeeId,
    EmployeeName,
    Month,
    SalaryAmount,
}

impl CanonicalField {
    /// 标准字段名（与存储列名一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::CityName => "city_name",
            CanonicalField::Year => "year",
            CanonicalField::BaseMin => "base_min",
            CanonicalField::BaseMax => "base_max",
            CanonicalField::Rate => "rate",
            CanonicalField::EmployeeId => "employee_id",
            CanonicalField::EmployeeName => "employee_name",
            CanonicalField::Month => "month",
            CanonicalField::SalaryAmount => "salary_amount",
        }
    }

    /// 面向用户的字段说明（用于缺列提示）
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::CityName => "city_name (城市名称)",
            CanonicalField::Year => "year (年份)",
            CanonicalField::BaseMin => "base_min (基数下限)",
            CanonicalField::BaseMax => "base_max (基数上限)",
            CanonicalField::Rate => "rate (比例)",
            CanonicalField::EmployeeId => "employee_id (员工工号)",
            CanonicalField::EmployeeName => "employee_name (员工姓名)",
            CanonicalField::Month => "month (月份)",
            CanonicalField::SalaryAmount => "salary_amount (工资金额)",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 表头同义词表: 源表头 → 标准字段
const HEADER_SYNONYMS: &[(&str, CanonicalField)] = &[
    // 英文 - 正确拼写
    ("city_name", CanonicalField::CityName),
    ("year", CanonicalField::Year),
    ("base_min", CanonicalField::BaseMin),
    ("base_max", CanonicalField::BaseMax),
    ("rate", CanonicalField::Rate),
    ("employee_id", CanonicalField::EmployeeId),
    ("employee_name", CanonicalField::EmployeeName),
    ("month", CanonicalField::Month),
    ("salary_amount", CanonicalField::SalaryAmount),
    // 英文 - 常见拼写错误
    ("city_namte", CanonicalField::CityName),
    ("city_nm", CanonicalField::CityName),
    ("city_na", CanonicalField::CityName),
    // 中文
    ("城市", CanonicalField::CityName),
    ("城市名称", CanonicalField::CityName),
    ("年份", CanonicalField::Year),
    ("基数下限", CanonicalField::BaseMin),
    ("社保基数下限", CanonicalField::BaseMin),
    ("基数上限", CanonicalField::BaseMax),
    ("社保基数上限", CanonicalField::BaseMax),
    ("比例", CanonicalField::Rate),
    ("缴纳比例", CanonicalField::Rate),
    ("员工工号", CanonicalField::EmployeeId),
    ("工号", CanonicalField::EmployeeId),
    ("员工姓名", CanonicalField::EmployeeName),
    ("姓名", CanonicalField::EmployeeName),
    ("月份", CanonicalField::Month),
    ("工资金额", CanonicalField::SalaryAmount),
    ("工资", CanonicalField::SalaryAmount),
];

/// 查找源表头对应的标准字段（去首尾空白, 区分大小写）
pub fn canonical_for_header(raw_header: &str) -> Option<CanonicalField> {
    let trimmed = raw_header.trim();
    HEADER_SYNONYMS
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, field)| *field)
}

// ==========================================
// FieldRequirement - 字段必填声明
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRequirement {
    pub field: CanonicalField,
    pub required: bool,
}

const fn required(field: CanonicalField) -> FieldRequirement {
    FieldRequirement {
        field,
        required: true,
    }
}

const fn optional(field: CanonicalField) -> FieldRequirement {
    FieldRequirement {
        field,
        required: false,
    }
}

/// 城市标准文件字段
pub const CITY_FIELDS: &[FieldRequirement] = &[
    required(CanonicalField::CityName),
    required(CanonicalField::Year),
    required(CanonicalField::BaseMin),
    required(CanonicalField::BaseMax),
    required(CanonicalField::Rate),
];

/// 员工工资文件字段（城市可选, 缺省使用默认城市）
pub const SALARY_FIELDS: &[FieldRequirement] = &[
    required(CanonicalField::EmployeeId),
    required(CanonicalField::EmployeeName),
    optional(CanonicalField::CityName),
    required(CanonicalField::Month),
    required(CanonicalField::SalaryAmount),
];

// ==========================================
// FieldMapping - 标准字段 → 实际表头
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    columns: HashMap<CanonicalField, String>,
}

impl FieldMapping {
    /// 标准字段对应的实际表头（原样, 未去空白）
    pub fn column(&self, field: CanonicalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// 读取行内某字段的去空白值; 未映射或该行缺列时返回空串
    pub fn value<'a>(&self, row: &'a RawRow, field: CanonicalField) -> &'a str {
        self.column(field)
            .and_then(|header| row.get(header))
            .map(|v| v.trim())
            .unwrap_or("")
    }
}

// ==========================================
// HeaderResolver - 表头解析器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct HeaderResolver {
    fields: &'static [FieldRequirement],
}

impl HeaderResolver {
    pub fn new(fields: &'static [FieldRequirement]) -> Self {
        Self { fields }
    }

    pub fn for_cities() -> Self {
        Self::new(CITY_FIELDS)
    }

    pub fn for_salaries() -> Self {
        Self::new(SALARY_FIELDS)
    }

    pub fn fields(&self) -> &'static [FieldRequirement] {
        self.fields
    }

    /// 解析表头
    ///
    /// # 返回
    /// - Ok(FieldMapping): 所有必填字段均已命中
    /// - Err(ImportError::MissingColumns): 列出全部缺失的必填字段
    pub fn resolve(&self, headers: &[String]) -> ImportResult<FieldMapping> {
        let mut mapping = FieldMapping::default();
        let mut missing = Vec::new();

        for requirement in self.fields {
            let hit = headers
                .iter()
                .find(|h| canonical_for_header(h) == Some(requirement.field));

            match hit {
                Some(header) => {
                    mapping.columns.insert(requirement.field, header.clone());
                }
                None if requirement.required => missing.push(requirement.field.label().to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_chinese_city_headers() {
        let mapping = HeaderResolver::for_cities()
            .resolve(&headers(&["城市", "年份", "基数下限", "基数上限", "比例"]))
            .unwrap();

        assert_eq!(mapping.column(CanonicalField::CityName), Some("城市"));
        assert_eq!(mapping.column(CanonicalField::Rate), Some("比例"));
    }

    #[test]
    fn test_resolve_misspelled_and_padded_header() {
        let mapping = HeaderResolver::for_cities()
            .resolve(&headers(&[" city_namte ", "year", "base_min", "base_max", "rate"]))
            .unwrap();

        // 映射保留原始表头, 便于按行取值
        assert_eq!(mapping.column(CanonicalField::CityName), Some(" city_namte "));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let result = HeaderResolver::for_cities()
            .resolve(&headers(&["City_Name", "year", "base_min", "base_max", "rate"]));

        match result {
            Err(ImportError::MissingColumns(fields)) => {
                assert_eq!(fields, vec!["city_name (城市名称)".to_string()]);
            }
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_first_match_wins() {
        let mapping = HeaderResolver::for_cities()
            .resolve(&headers(&["城市名称", "城市", "year", "base_min", "base_max", "rate"]))
            .unwrap();

        assert_eq!(mapping.column(CanonicalField::CityName), Some("城市名称"));
    }

    #[test]
    fn test_resolve_reports_all_missing_fields() {
        let result = HeaderResolver::for_cities().resolve(&headers(&["城市", "备注"]));

        match result {
            Err(ImportError::MissingColumns(fields)) => assert_eq!(fields.len(), 4),
            other => panic!("expected missing columns, got {:?}", other),
        }
    }

    #[test]
    fn test_salary_city_is_optional() {
        let mapping = HeaderResolver::for_salaries()
            .resolve(&headers(&["工号", "姓名", "月份", "工资"]))
            .unwrap();

        assert!(!mapping.contains(CanonicalField::CityName));
        assert_eq!(mapping.column(CanonicalField::SalaryAmount), Some("工资"));
    }

    #[test]
    fn test_mapping_value_missing_cell_is_empty() {
        let mapping = HeaderResolver::for_salaries()
            .resolve(&headers(&["employee_id", "employee_name", "month", "salary_amount"]))
            .unwrap();

        let mut row = RawRow::new();
        row.insert("employee_id".to_string(), "  E001 ".to_string());

        assert_eq!(mapping.value(&row, CanonicalField::EmployeeId), "E001");
        assert_eq!(mapping.value(&row, CanonicalField::Month), "");
        assert_eq!(mapping.value(&row, CanonicalField::CityName), "");
    }
}
