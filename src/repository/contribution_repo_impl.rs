// ==========================================
// 五险一金计算系统 - 记录存储 Repository 实现
// ==========================================
// 职责: 实现 cities / salaries / results 数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则, 只做数据读写
// 约定: 全量读取按自增 id 排序, 即插入顺序
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::{CityStandard, ContributionResult, SalaryRecord};
use crate::repository::contribution_repo::ContributionRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 读取以 TEXT 存储的金额列
fn decimal_column(row: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn map_result_row(row: &Row) -> rusqlite::Result<ContributionResult> {
    Ok(ContributionResult {
        run_id: row.get(0)?,
        employee_name: row.get(1)?,
        city_name: row.get(2)?,
        avg_salary: decimal_column(row, 3)?,
        contribution_base: decimal_column(row, 4)?,
        company_fee: decimal_column(row, 5)?,
        rate: row.get(6)?,
        calculated_at: row.get(7)?,
    })
}

// ==========================================
// ContributionRepositoryImpl
// ==========================================
pub struct ContributionRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ContributionRepositoryImpl {
    /// 创建新的 Repository 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（与配置管理器共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }
}

#[async_trait]
impl ContributionRepository for ContributionRepositoryImpl {
    async fn select_all_cities(&self) -> RepositoryResult<Vec<CityStandard>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT city_name, year, base_min, base_max, rate FROM cities ORDER BY id",
        )?;

        let cities = stmt
            .query_map([], |row| {
                Ok(CityStandard {
                    city_name: row.get(0)?,
                    year: row.get(1)?,
                    base_min: row.get(2)?,
                    base_max: row.get(3)?,
                    rate: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = cities.len(), "读取城市标准");
        Ok(cities)
    }

    async fn select_all_salaries(&self) -> RepositoryResult<Vec<SalaryRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT employee_id, employee_name, city_name, month, salary_amount \
             FROM salaries ORDER BY id",
        )?;

        let salaries = stmt
            .query_map([], |row| {
                Ok(SalaryRecord {
                    employee_id: row.get(0)?,
                    employee_name: row.get(1)?,
                    city_name: row.get(2)?,
                    month: row.get(3)?,
                    salary_amount: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = salaries.len(), "读取工资记录");
        Ok(salaries)
    }

    async fn bulk_insert_cities(&self, cities: Vec<CityStandard>) -> RepositoryResult<usize> {
        if cities.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cities (city_name, year, base_min, base_max, rate) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for city in &cities {
                stmt.execute(params![
                    city.city_name,
                    city.year,
                    city.base_min,
                    city.base_max,
                    city.rate,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(cities.len())
    }

    async fn bulk_insert_salaries(&self, salaries: Vec<SalaryRecord>) -> RepositoryResult<usize> {
        if salaries.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO salaries (employee_id, employee_name, city_name, month, salary_amount) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for salary in &salaries {
                stmt.execute(params![
                    salary.employee_id,
                    salary.employee_name,
                    salary.city_name,
                    salary.month,
                    salary.salary_amount,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(salaries.len())
    }

    async fn bulk_insert_results(
        &self,
        results: Vec<ContributionResult>,
    ) -> RepositoryResult<usize> {
        if results.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO results (
                    run_id, employee_name, city_name, avg_salary,
                    contribution_base, company_fee, rate, calculated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for result in &results {
                stmt.execute(params![
                    result.run_id,
                    result.employee_name,
                    result.city_name,
                    result.avg_salary.to_string(),
                    result.contribution_base.to_string(),
                    result.company_fee.to_string(),
                    result.rate,
                    result.calculated_at,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(results.len())
    }

    async fn list_results(&self, limit: usize) -> RepositoryResult<Vec<ContributionResult>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT run_id, employee_name, city_name, avg_salary,
                   contribution_base, company_fee, rate, calculated_at
            FROM results
            ORDER BY calculated_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let results = stmt
            .query_map([limit], map_result_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn setup_repo() -> (NamedTempFile, ContributionRepositoryImpl) {
        let temp_file = NamedTempFile::new().unwrap();
        let repo = ContributionRepositoryImpl::new(temp_file.path().to_str().unwrap()).unwrap();
        (temp_file, repo)
    }

    fn city(name: &str, base_min: i64) -> CityStandard {
        CityStandard {
            city_name: name.to_string(),
            year: "2024".to_string(),
            base_min,
            base_max: 30000,
            rate: 0.16,
        }
    }

    #[tokio::test]
    async fn test_cities_round_trip_in_insertion_order() {
        let (_temp, repo) = setup_repo();

        let inserted = repo
            .bulk_insert_cities(vec![city("上海", 7000), city("北京", 5000)])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let cities = repo.select_all_cities().await.unwrap();
        assert_eq!(cities, vec![city("上海", 7000), city("北京", 5000)]);
    }

    #[tokio::test]
    async fn test_bulk_insert_is_atomic() {
        let (_temp, repo) = setup_repo();

        // 第二条违反 CHECK 约束, 整批回滚
        let mut bad = city("广州", 5000);
        bad.base_max = 1000;
        let result = repo.bulk_insert_cities(vec![city("北京", 5000), bad]).await;

        assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
        assert!(repo.select_all_cities().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_results_preserve_decimal_values() {
        let (_temp, repo) = setup_repo();

        let result = ContributionResult {
            run_id: "run-1".to_string(),
            employee_name: "张三".to_string(),
            city_name: "北京".to_string(),
            avg_salary: Decimal::new(900000, 2),
            contribution_base: Decimal::new(900000, 2),
            company_fee: Decimal::new(144000, 2),
            rate: 0.16,
            calculated_at: Utc::now(),
        };
        repo.bulk_insert_results(vec![result.clone()]).await.unwrap();

        let stored = repo.list_results(10).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].company_fee, Decimal::new(144000, 2));
        assert_eq!(stored[0].company_fee.to_string(), "1440.00");
        assert_eq!(stored[0].employee_name, "张三");
    }

    #[tokio::test]
    async fn test_empty_bulk_insert_is_noop() {
        let (_temp, repo) = setup_repo();
        assert_eq!(repo.bulk_insert_salaries(Vec::new()).await.unwrap(), 0);
        assert!(repo.select_all_salaries().await.unwrap().is_empty());
    }
}
