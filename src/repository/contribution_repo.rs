// ==========================================
// 五险一金计算系统 - 记录存储 Repository Trait
// ==========================================
// 职责: 定义 cities / salaries / results 三张表的数据访问接口
// 红线: Repository 不含业务规则, 只做数据读写
// ==========================================

use crate::domain::{CityStandard, ContributionResult, SalaryRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ContributionRepository Trait
// ==========================================
// 用途: 导入落库 + 计算读写
// 实现者: ContributionRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ContributionRepository: Send + Sync {
    // ===== 全量读取（按插入顺序）=====

    /// 读取全部城市社保标准
    async fn select_all_cities(&self) -> RepositoryResult<Vec<CityStandard>>;

    /// 读取全部员工工资记录
    async fn select_all_salaries(&self) -> RepositoryResult<Vec<SalaryRecord>>;

    // ===== 批量写入（单次调用原子: 全部成功或全部失败）=====

    /// 批量插入城市社保标准
    ///
    /// # 返回
    /// - Ok(usize): 插入的记录数
    /// - Err: 数据库错误（整个事务回滚）
    async fn bulk_insert_cities(&self, cities: Vec<CityStandard>) -> RepositoryResult<usize>;

    /// 批量插入员工工资记录
    async fn bulk_insert_salaries(&self, salaries: Vec<SalaryRecord>) -> RepositoryResult<usize>;

    /// 批量追加计算结果（不覆盖历史批次）
    async fn bulk_insert_results(&self, results: Vec<ContributionResult>)
        -> RepositoryResult<usize>;

    // ===== 查询 =====

    /// 最近的计算结果（按计算时间倒序）
    ///
    /// # 参数
    /// - limit: 返回记录数上限
    async fn list_results(&self, limit: usize) -> RepositoryResult<Vec<ContributionResult>>;
}
