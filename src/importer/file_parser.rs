// ==========================================
// 五险一金计算系统 - 文件解析器实现
// ==========================================
// 职责: 上传文件字节 → 第一个工作表的表头 + 行记录
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRow, RawSheet};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 重名表头依次改名为 `名称_1`, `名称_2`, 首列保留原名; 空表头不参与
fn dedupe_headers(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.map(|header| {
        if header.trim().is_empty() {
            return header;
        }
        let mut candidate = header.clone();
        let mut suffix = 0;
        while !seen.insert(candidate.clone()) {
            suffix += 1;
            candidate = format!("{}_{}", header, suffix);
        }
        candidate
    })
    .collect()
}

/// 由表头与单元格文本组装一行; 空表头列不可寻址, 直接忽略
fn build_row(headers: &[String], cells: impl Iterator<Item = String>) -> RawRow {
    let mut row_map = RawRow::new();
    for (col_idx, value) in cells.enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.trim().is_empty() {
                continue;
            }
            row_map.insert(header.clone(), value);
        }
    }
    row_map
}

/// 完全空白的行
fn is_blank(row: &RawRow) -> bool {
    row.values().all(|v| v.trim().is_empty())
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(bytes);

        // 读取表头
        let headers = dedupe_headers(reader.headers()?.iter().map(str::to_string));

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row_map = build_row(&headers, record.iter().map(str::to_string));

            // 跳过完全空白的行
            if is_blank(&row_map) {
                continue;
            }
            rows.push(row_map);
        }

        Ok(RawSheet { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    /// 单元格显示文本; 整数值浮点显示为不带小数的整数
    fn cell_text(cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<RawSheet> {
        // 自动识别 xlsx / xls
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        // 读取第一个 sheet
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no worksheet".to_string()))??;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let headers: Vec<String> = match sheet_rows.next() {
            Some(header_row) => dedupe_headers(header_row.iter().map(Self::cell_text)),
            None => return Ok(RawSheet::default()),
        };

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in sheet_rows {
            let row_map = build_row(&headers, data_row.iter().map(Self::cell_text));

            // 跳过完全空白的行
            if is_blank(&row_map) {
                continue;
            }
            rows.push(row_map);
        }

        Ok(RawSheet { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn xlsx_bytes(header: &[&str], rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            for (col, h) in header.iter().enumerate() {
                sheet.write_string(0, col as u16, *h).unwrap();
            }
            for (r, row) in rows.iter().enumerate() {
                for (col, value) in row.iter().enumerate() {
                    let r = (r + 1) as u32;
                    match value.parse::<f64>() {
                        Ok(n) => sheet.write_number(r, col as u16, n).unwrap(),
                        Err(_) if value.is_empty() => continue,
                        Err(_) => sheet.write_string(r, col as u16, *value).unwrap(),
                    };
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_csv_parser_valid_bytes() {
        let data = "城市,年份,基数下限\n北京,2024,5000\n上海,2024,7000\n";

        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["城市", "年份", "基数下限"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].get("城市"), Some(&"北京".to_string()));
        assert_eq!(sheet.rows[1].get("基数下限"), Some(&"7000".to_string()));
    }

    #[test]
    fn test_csv_parser_strips_bom_and_skips_blank_rows() {
        let data = "\u{feff}employee_id,month\nE001,202401\n,\nE002,202402\n";

        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();

        assert_eq!(sheet.headers[0], "employee_id");
        assert_eq!(sheet.rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_header_only_is_empty() {
        let sheet = CsvParser.parse_bytes(b"city_name,year\n").unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_excel_parser_first_sheet() {
        let bytes = xlsx_bytes(
            &["城市", "年份", "基数下限", "基数上限", "比例"],
            &[&["北京", "2024", "5000", "30000", "0.16"]],
        );

        let sheet = ExcelParser.parse_bytes(&bytes).unwrap();

        assert_eq!(sheet.headers.len(), 5);
        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.get("城市"), Some(&"北京".to_string()));
        // 数值单元格渲染为显示文本
        assert_eq!(row.get("基数下限"), Some(&"5000".to_string()));
        assert_eq!(row.get("比例"), Some(&"0.16".to_string()));
    }

    #[test]
    fn test_excel_parser_header_only_is_empty() {
        let bytes = xlsx_bytes(&["city_name", "year"], &[]);
        let sheet = ExcelParser.parse_bytes(&bytes).unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_excel_parser_rejects_garbage() {
        let result = ExcelParser.parse_bytes(b"definitely not a workbook");
        assert!(result.is_err());
    }

    #[test]
    fn test_csv_parser_duplicate_headers_keep_first_column() {
        let data = "城市,比例,城市,城市\n北京,0.16,上海,广州\n";

        let sheet = CsvParser.parse_bytes(data.as_bytes()).unwrap();

        assert_eq!(sheet.headers, vec!["城市", "比例", "城市_1", "城市_2"]);
        let row = &sheet.rows[0];
        assert_eq!(row.get("城市"), Some(&"北京".to_string()));
        assert_eq!(row.get("城市_1"), Some(&"上海".to_string()));
        assert_eq!(row.get("城市_2"), Some(&"广州".to_string()));
    }

    #[test]
    fn test_dedupe_headers_skips_existing_suffix() {
        let headers = dedupe_headers(
            ["month", "month_1", "month", "", ""].iter().map(|s| s.to_string()),
        );
        assert_eq!(headers, vec!["month", "month_1", "month_2", "", ""]);
    }

    #[test]
    fn test_excel_parser_duplicate_headers_keep_first_column() {
        let bytes = xlsx_bytes(&["salary_amount", "salary_amount"], &[&["8000", "-5"]]);

        let sheet = ExcelParser.parse_bytes(&bytes).unwrap();

        assert_eq!(sheet.headers, vec!["salary_amount", "salary_amount_1"]);
        assert_eq!(sheet.rows[0].get("salary_amount"), Some(&"8000".to_string()));
        assert_eq!(sheet.rows[0].get("salary_amount_1"), Some(&"-5".to_string()));
    }
}
