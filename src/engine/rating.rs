// ==========================================
// 五险一金计算系统 - 聚合与费率引擎
// ==========================================
// 职责: 按员工聚合工资 → 匹配城市 → 截断基数 → 计算公司缴费
// 输入: 全部工资记录 + 全部城市标准（均为插入顺序）
// 输出: 每位员工一条 ContributionResult
// 红线: 纯计算, 不读写数据库
// ==========================================

use crate::domain::{CityStandard, ContributionResult, SalaryRecord};
use crate::engine::error::{RatingError, RatingResult};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::debug;

/// 金额保留小数位
const CURRENCY_SCALE: u32 = 2;

/// 金额舍入: 2 位小数, 中点远离零
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CURRENCY_SCALE);
    rounded
}

/// 比例按最短十进制表示转换（0.105 → 0.105, 不引入二进制尾差）
fn rate_to_decimal(rate: f64) -> Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(&rate.to_string())
}

// ==========================================
// EmployeeGroup - 单个员工的工资分组
// ==========================================
struct EmployeeGroup<'a> {
    employee_name: &'a str,
    records: Vec<&'a SalaryRecord>,
}

impl<'a> EmployeeGroup<'a> {
    /// 首条记录的城市名（决定城市匹配与去重键）
    fn first_city(&self) -> &'a str {
        self.records
            .first()
            .copied()
            .map(|r| r.city_name.as_str())
            .unwrap_or_default()
    }

    fn average_salary(&self) -> RatingResult<Decimal> {
        let total = self
            .records
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| {
                acc.checked_add(Decimal::from(r.salary_amount))
            })
            .ok_or_else(|| self.arithmetic("salary sum overflow"))?;

        total
            .checked_div(Decimal::from(self.records.len()))
            .ok_or_else(|| self.arithmetic("average salary division failed"))
    }

    fn arithmetic(&self, message: &str) -> RatingError {
        RatingError::Arithmetic {
            employee_name: self.employee_name.to_string(),
            message: message.to_string(),
        }
    }
}

/// 按员工姓名分组, 分组顺序为首次出现顺序
fn group_by_employee(salaries: &[SalaryRecord]) -> Vec<EmployeeGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<EmployeeGroup<'_>> = Vec::new();

    for record in salaries {
        let name = record.employee_name.as_str();
        match index.get(name) {
            Some(&pos) => groups[pos].records.push(record),
            None => {
                index.insert(name, groups.len());
                groups.push(EmployeeGroup {
                    employee_name: name,
                    records: vec![record],
                });
            }
        }
    }

    groups
}

// ==========================================
// RatingEngine - 聚合与费率引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RatingEngine;

impl RatingEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算全部员工的公司缴费
    ///
    /// # 参数
    /// - salaries: 全部工资记录（插入顺序）
    /// - cities: 全部城市标准（插入顺序, 首条为默认城市）
    /// - run_id: 本次计算批次 ID
    /// - calculated_at: 本次计算时间
    ///
    /// # 返回
    /// - Ok: 每位员工一条结果, 按员工首次出现顺序
    /// - Err(NoSalaryData / NoCityStandards): 上游数据缺失
    pub fn rate(
        &self,
        salaries: &[SalaryRecord],
        cities: &[CityStandard],
        run_id: &str,
        calculated_at: DateTime<Utc>,
    ) -> RatingResult<Vec<ContributionResult>> {
        if salaries.is_empty() {
            return Err(RatingError::NoSalaryData);
        }
        let default_city = cities.first().ok_or(RatingError::NoCityStandards)?;

        // 城市名重复时后插入的覆盖先插入的
        let lookup: HashMap<&str, &CityStandard> = cities
            .iter()
            .map(|c| (c.city_name.as_str(), c))
            .collect();

        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut results = Vec::new();

        for group in group_by_employee(salaries) {
            let first_city = group.first_city();
            if !seen.insert((group.employee_name, first_city)) {
                continue;
            }

            let city = match lookup.get(first_city) {
                Some(city) if !first_city.is_empty() => *city,
                _ => {
                    debug!(
                        employee_name = group.employee_name,
                        city_name = first_city,
                        default_city = %default_city.city_name,
                        "未匹配到城市标准, 使用默认城市"
                    );
                    default_city
                }
            };

            let avg_salary = group.average_salary()?;
            let contribution_base = city.clamp_base(avg_salary);
            let rate = rate_to_decimal(city.rate)
                .map_err(|e| group.arithmetic(&format!("invalid rate {}: {}", city.rate, e)))?;
            let company_fee = contribution_base
                .checked_mul(rate)
                .ok_or_else(|| group.arithmetic("company fee overflow"))?;

            results.push(ContributionResult {
                run_id: run_id.to_string(),
                employee_name: group.employee_name.to_string(),
                city_name: city.city_name.clone(),
                avg_salary: round_currency(avg_salary),
                contribution_base: round_currency(contribution_base),
                company_fee: round_currency(company_fee),
                rate: city.rate,
                calculated_at,
            });
        }

        Ok(results)
    }
}
