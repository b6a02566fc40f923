// ==========================================
// 五险一金计算系统 - 导入层
// ==========================================
// 职责: 上传表格 → 类型化记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod header_resolver;
pub mod importer_trait;
pub mod row_validator;
pub mod sheet_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser};
pub use header_resolver::{
    canonical_for_header, CanonicalField, FieldMapping, FieldRequirement, HeaderResolver,
    CITY_FIELDS, SALARY_FIELDS,
};
pub use row_validator::{CityRowValidator, RowViolation, SalaryRowValidator};
pub use sheet_importer::{parse_cities, parse_salaries, SheetImporter};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, RawRow, RawSheet, RowValidator};
