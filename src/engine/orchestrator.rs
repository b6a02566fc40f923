// ==========================================
// 五险一金计算系统 - 计算编排器
// ==========================================
// 用途: 协调 读取工资 → 读取城市 → 计算 → 追加结果 的执行顺序
// 约定: 存储操作逐个等待, 任一步失败则整次计算失败
// 说明: 结果只追加, 历史批次保留; 失败不回滚已落库数据
// ==========================================

use crate::domain::CalculationOutcome;
use crate::engine::error::{RatingError, RatingResult};
use crate::engine::rating::RatingEngine;
use crate::repository::ContributionRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

// ==========================================
// CalculationOrchestrator - 计算编排器
// ==========================================
pub struct CalculationOrchestrator {
    repo: Arc<dyn ContributionRepository>,
    engine: RatingEngine,
}

impl CalculationOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - repo: 记录存储
    pub fn new(repo: Arc<dyn ContributionRepository>) -> Self {
        Self {
            repo,
            engine: RatingEngine::new(),
        }
    }

    /// 执行一次完整计算并落库
    ///
    /// # 返回
    /// - Ok(usize): 写入的结果条数（= 处理的员工数）
    /// - Err: 上游数据缺失或存储错误
    #[instrument(skip(self), fields(run_id))]
    pub async fn run(&self) -> RatingResult<usize> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());

        // ==========================================
        // 步骤1: 读取工资记录（为空时不读取城市）
        // ==========================================
        let salaries = self
            .repo
            .select_all_salaries()
            .await
            .map_err(RatingError::LoadSalaries)?;
        if salaries.is_empty() {
            return Err(RatingError::NoSalaryData);
        }
        debug!(salary_count = salaries.len(), "工资记录读取完成");

        // ==========================================
        // 步骤2: 读取城市标准
        // ==========================================
        let cities = self
            .repo
            .select_all_cities()
            .await
            .map_err(RatingError::LoadCities)?;
        if cities.is_empty() {
            return Err(RatingError::NoCityStandards);
        }
        debug!(city_count = cities.len(), "城市标准读取完成");

        // ==========================================
        // 步骤3: 聚合与计算
        // ==========================================
        let results = self.engine.rate(&salaries, &cities, &run_id, Utc::now())?;

        // ==========================================
        // 步骤4: 追加计算结果
        // ==========================================
        let stored = self
            .repo
            .bulk_insert_results(results)
            .await
            .map_err(RatingError::StoreResults)?;

        info!(processed_count = stored, "计算完成");
        Ok(stored)
    }

    /// 执行计算, 将错误折叠为结构化结果
    pub async fn calculate_and_store(&self) -> CalculationOutcome {
        match self.run().await {
            Ok(processed_count) => CalculationOutcome {
                success: true,
                processed_count,
                errors: Vec::new(),
            },
            Err(e) => {
                error!(error = %e, "计算失败");
                CalculationOutcome::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CityStandard, ContributionResult, SalaryRecord};
    use crate::repository::{RepositoryError, RepositoryResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // ==========================================
    // Mock Repository
    // ==========================================
    #[derive(Default)]
    struct MockRepository {
        cities: Vec<CityStandard>,
        salaries: Vec<SalaryRecord>,
        results: Mutex<Vec<ContributionResult>>,
        city_reads: AtomicUsize,
        fail_salary_read: bool,
        fail_city_read: bool,
        fail_results_write: bool,
    }

    #[async_trait]
    impl ContributionRepository for MockRepository {
        async fn select_all_cities(&self) -> RepositoryResult<Vec<CityStandard>> {
            self.city_reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_city_read {
                return Err(RepositoryError::LockError("poisoned".to_string()));
            }
            Ok(self.cities.clone())
        }

        async fn select_all_salaries(&self) -> RepositoryResult<Vec<SalaryRecord>> {
            if self.fail_salary_read {
                return Err(RepositoryError::DatabaseQueryError(
                    "no such table: salaries".to_string(),
                ));
            }
            Ok(self.salaries.clone())
        }

        async fn bulk_insert_cities(&self, cities: Vec<CityStandard>) -> RepositoryResult<usize> {
            Ok(cities.len())
        }

        async fn bulk_insert_salaries(
            &self,
            salaries: Vec<SalaryRecord>,
        ) -> RepositoryResult<usize> {
            Ok(salaries.len())
        }

        async fn bulk_insert_results(
            &self,
            results: Vec<ContributionResult>,
        ) -> RepositoryResult<usize> {
            if self.fail_results_write {
                return Err(RepositoryError::DatabaseQueryError("disk full".to_string()));
            }
            let count = results.len();
            self.results.lock().unwrap().extend(results);
            Ok(count)
        }

        async fn list_results(&self, limit: usize) -> RepositoryResult<Vec<ContributionResult>> {
            Ok(self.results.lock().unwrap().iter().take(limit).cloned().collect())
        }
    }

    fn beijing() -> CityStandard {
        CityStandard {
            city_name: "北京".to_string(),
            year: "2024".to_string(),
            base_min: 5000,
            base_max: 30000,
            rate: 0.16,
        }
    }

    fn salary(name: &str, month: &str, amount: i64) -> SalaryRecord {
        SalaryRecord {
            employee_id: "E001".to_string(),
            employee_name: name.to_string(),
            city_name: "北京".to_string(),
            month: month.to_string(),
            salary_amount: amount,
        }
    }

    #[tokio::test]
    async fn test_calculate_and_store_success() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            salaries: vec![
                salary("张三", "202401", 8000),
                salary("张三", "202402", 10000),
                salary("李四", "202401", 6000),
            ],
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        let outcome = orchestrator.calculate_and_store().await;

        assert_eq!(
            outcome,
            CalculationOutcome {
                success: true,
                processed_count: 2,
                errors: vec![],
            }
        );
        let stored = repo.results.lock().unwrap();
        assert_eq!(stored.len(), 2);
        // 同一批次共享 run_id
        assert_eq!(stored[0].run_id, stored[1].run_id);
        assert!(Uuid::parse_str(&stored[0].run_id).is_ok());
    }

    #[tokio::test]
    async fn test_no_salaries_skips_city_read() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        let outcome = orchestrator.calculate_and_store().await;

        assert!(!outcome.success);
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(
            outcome.errors,
            vec!["no salary data found, upload employee salary data first".to_string()]
        );
        assert_eq!(repo.city_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_cities() {
        let repo = Arc::new(MockRepository {
            salaries: vec![salary("张三", "202401", 8000)],
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        let outcome = orchestrator.calculate_and_store().await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.errors,
            vec!["no city standards found, upload city standards first".to_string()]
        );
        assert!(repo.results.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_reports_store_error() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            salaries: vec![salary("张三", "202401", 8000)],
            fail_results_write: true,
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo);

        let outcome = orchestrator.calculate_and_store().await;

        assert!(!outcome.success);
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(outcome.errors, vec!["database query failed: disk full".to_string()]);
    }

    #[tokio::test]
    async fn test_salary_read_failure_aborts_before_city_read() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            salaries: vec![salary("张三", "202401", 8000)],
            fail_salary_read: true,
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        let outcome = orchestrator.calculate_and_store().await;

        assert!(!outcome.success);
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(
            outcome.errors,
            vec!["database query failed: no such table: salaries".to_string()]
        );
        assert_eq!(repo.city_reads.load(Ordering::SeqCst), 0);
        assert!(repo.results.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_city_read_failure_aborts_run() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            salaries: vec![salary("张三", "202401", 8000)],
            fail_city_read: true,
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        let outcome = orchestrator.calculate_and_store().await;

        assert!(!outcome.success);
        assert_eq!(outcome.processed_count, 0);
        assert_eq!(outcome.errors, vec!["database lock failed: poisoned".to_string()]);
        assert_eq!(repo.city_reads.load(Ordering::SeqCst), 1);
        assert!(repo.results.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_runs_append_results() {
        let repo = Arc::new(MockRepository {
            cities: vec![beijing()],
            salaries: vec![salary("张三", "202401", 8000)],
            ..Default::default()
        });
        let orchestrator = CalculationOrchestrator::new(repo.clone());

        orchestrator.calculate_and_store().await;
        orchestrator.calculate_and_store().await;

        let stored = repo.results.lock().unwrap();
        assert_eq!(stored.len(), 2);
        assert_ne!(stored[0].run_id, stored[1].run_id);
    }
}
