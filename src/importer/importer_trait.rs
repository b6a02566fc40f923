// ==========================================
// 五险一金计算系统 - 导入 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解码 → 表头解析 → 逐行校验
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::header_resolver::{FieldMapping, HeaderResolver};
use std::collections::HashMap;

/// 原始行记录（表头 → 单元格文本）
pub type RawRow = HashMap<String, String>;

// ==========================================
// RawSheet - 解码后的第一个工作表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    /// 表头（首行, 按列顺序; 重名表头带 `_N` 后缀）
    pub headers: Vec<String>,
    /// 数据行（已跳过完全空白的行）
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解码接口
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 将上传文件的字节解码为表头 + 行记录
    ///
    /// # 返回
    /// - Ok(RawSheet): 第一个工作表的内容（可能无数据行）
    /// - Err: 文件无法解码
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet>;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 单行字段解析与约束校验
// 实现者: CityRowValidator, SalaryRowValidator
pub trait RowValidator: Send + Sync {
    /// 校验通过后产出的类型化记录
    type Record;

    /// 本文件使用的表头解析器
    fn header_resolver(&self) -> HeaderResolver;

    /// 校验单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - mapping: 已解析的字段映射
    /// - row_number: 面向用户的行号（表头为第 1 行）
    ///
    /// # 返回
    /// - Ok(Record): 校验通过
    /// - Err(String): `row <n>: <reason>`, 首个失败规则即终止
    fn validate(
        &self,
        row: &RawRow,
        mapping: &FieldMapping,
        row_number: usize,
    ) -> Result<Self::Record, String>;
}
