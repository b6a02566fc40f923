// ==========================================
// 五险一金计算系统 - 表格导入器实现
// ==========================================
// 职责: 整合解析流程（城市标准 / 员工工资两个实例）
// 流程: 解码首个工作表 → 表头解析（每文件一次）→ 逐行校验 → 汇总
// 模型: 部分成功, 错误行跳过并记录, 有效行继续
// ==========================================

use crate::domain::{CityStandard, ParseOutcome, SalaryRecord, SourceFormat};
use crate::importer::error::ImportError;
use crate::importer::file_parser::{CsvParser, ExcelParser};
use crate::importer::importer_trait::{FileParser, RawSheet, RowValidator};
use crate::importer::row_validator::{CityRowValidator, SalaryRowValidator};
use tracing::{debug, info, instrument, warn};

/// 行号偏移: 数据行下标从 0 开始, 表头占第 1 行
const HEADER_ROW_OFFSET: usize = 2;

// ==========================================
// SheetImporter - 表格导入器
// ==========================================
pub struct SheetImporter<V>
where
    V: RowValidator,
{
    file_parser: Box<dyn FileParser>,
    validator: V,
}

impl<V> SheetImporter<V>
where
    V: RowValidator,
{
    pub fn new(file_parser: Box<dyn FileParser>, validator: V) -> Self {
        Self {
            file_parser,
            validator,
        }
    }

    /// 按源文件格式选择解析器
    pub fn for_format(format: SourceFormat, validator: V) -> Self {
        let file_parser: Box<dyn FileParser> = match format {
            SourceFormat::Excel => Box::new(ExcelParser),
            SourceFormat::Csv => Box::new(CsvParser),
        };
        Self::new(file_parser, validator)
    }

    /// 解析上传文件字节
    ///
    /// # 返回
    /// - success=false + 单条错误: 文件无法解码 / 无数据 / 缺少必需列
    /// - 否则: 有效记录 + 全部行级错误, success 取决于是否至少一行有效
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn import_bytes(&self, bytes: &[u8]) -> ParseOutcome<V::Record> {
        // === 步骤 1: 解码文件 ===
        let sheet = match self.file_parser.parse_bytes(bytes) {
            Ok(sheet) => sheet,
            Err(e) => {
                warn!(error = %e, "文件解析失败");
                return ParseOutcome::failed(e.to_string());
            }
        };

        self.import_sheet(&sheet)
    }

    /// 对已解码的工作表执行表头解析与逐行校验
    pub fn import_sheet(&self, sheet: &RawSheet) -> ParseOutcome<V::Record> {
        if sheet.is_empty() {
            warn!("文件无数据行");
            return ParseOutcome::failed(ImportError::EmptyFile.to_string());
        }

        // === 步骤 2: 表头解析（整文件一次）===
        let mapping = match self.validator.header_resolver().resolve(&sheet.headers) {
            Ok(mapping) => mapping,
            Err(e) => {
                warn!(error = %e, headers = ?sheet.headers, "表头解析失败");
                return ParseOutcome::failed(e.to_string());
            }
        };
        debug!(mapping = ?mapping, "表头解析完成");

        // === 步骤 3: 逐行校验 ===
        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (idx, row) in sheet.rows.iter().enumerate() {
            match self.validator.validate(row, &mapping, idx + HEADER_ROW_OFFSET) {
                Ok(record) => records.push(record),
                Err(message) => {
                    debug!(error = %message, "行校验失败");
                    errors.push(message);
                }
            }
        }

        info!(
            total = sheet.rows.len(),
            valid = records.len(),
            rejected = errors.len(),
            "表格解析完成"
        );

        ParseOutcome::from_rows(records, errors)
    }
}

/// 解析城市社保标准文件
pub fn parse_cities(format: SourceFormat, bytes: &[u8]) -> ParseOutcome<CityStandard> {
    SheetImporter::for_format(format, CityRowValidator).import_bytes(bytes)
}

/// 解析员工工资文件
pub fn parse_salaries(format: SourceFormat, bytes: &[u8]) -> ParseOutcome<SalaryRecord> {
    SheetImporter::for_format(format, SalaryRowValidator).import_bytes(bytes)
}
