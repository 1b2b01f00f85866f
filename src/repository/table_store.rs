// ==========================================
// 车队司机评分系统 - 通用表存储接口
// ==========================================
// 职责: 流水线唯一依赖的存储抽象
//   1. 等值过滤
//   2. 分页范围读取（游标式，限制峰值内存）
//   3. 批量写入
//   4. 按过滤条件删除
// 红线: 所有操作都以 month_run_id 为分区键
// ==========================================

use crate::domain::MonthRunId;
use crate::repository::error::RepositoryResult;
use rusqlite::types::Value;
use rusqlite::Row;
use std::marker::PhantomData;
use tracing::debug;

/// 默认分页大小
pub const DEFAULT_PAGE_SIZE: usize = 1000;

// ==========================================
// TableRecord - 表行映射
// ==========================================
/// 一行记录与表列之间的映射（不含分区列 month_run_id）
pub trait TableRecord: Sized {
    /// 表名
    const TABLE: &'static str;
    /// 列名（顺序与 from_row / to_values 一致）
    const COLUMNS: &'static [&'static str];

    /// 按 COLUMNS 顺序从查询结果构造记录
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// 按 COLUMNS 顺序输出待写入的值
    fn to_values(&self) -> Vec<Value>;
}

// ==========================================
// Filter - 等值过滤条件
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self {
            column,
            value: Value::Text(value.into()),
        }
    }
}

// ==========================================
// TableStore - 通用表存储
// ==========================================
pub trait TableStore: Send + Sync {
    /// 分页读取 [offset, offset + limit)
    fn select_page<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        filters: &[Filter],
        offset: usize,
        limit: usize,
    ) -> RepositoryResult<Vec<T>>;

    /// 批量写入，返回写入行数
    fn insert_batch<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize>;

    /// 按过滤条件删除，返回删除行数
    fn delete_where(
        &self,
        table: &str,
        month_run_id: &MonthRunId,
        filters: &[Filter],
    ) -> RepositoryResult<usize>;

    /// 整表替换：先删除该分区全部行，再批量写入
    ///
    /// 默认实现为两步操作；支持事务的实现应覆盖为原子操作
    fn replace_month<T: TableRecord>(
        &self,
        month_run_id: &MonthRunId,
        rows: &[T],
    ) -> RepositoryResult<usize> {
        self.delete_where(T::TABLE, month_run_id, &[])?;
        self.insert_batch(month_run_id, rows)
    }
}

// ==========================================
// PagedScan - 游标式分页扫描
// ==========================================
/// 固定页大小逐页读取，短页即结束
pub struct PagedScan<'a, S: TableStore, T: TableRecord> {
    store: &'a S,
    month_run_id: &'a MonthRunId,
    filters: Vec<Filter>,
    page_size: usize,
    offset: usize,
    exhausted: bool,
    _record: PhantomData<T>,
}

impl<'a, S: TableStore, T: TableRecord> PagedScan<'a, S, T> {
    pub fn new(store: &'a S, month_run_id: &'a MonthRunId, page_size: usize) -> Self {
        Self {
            store,
            month_run_id,
            filters: Vec::new(),
            page_size: page_size.max(1),
            offset: 0,
            exhausted: false,
            _record: PhantomData,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// 读取下一页；扫描结束返回 None
    pub fn next_page(&mut self) -> RepositoryResult<Option<Vec<T>>> {
        if self.exhausted {
            return Ok(None);
        }

        let rows = self.store.select_page::<T>(
            self.month_run_id,
            &self.filters,
            self.offset,
            self.page_size,
        )?;

        debug!(
            table = T::TABLE,
            offset = self.offset,
            rows = rows.len(),
            "分页读取"
        );

        if rows.len() < self.page_size {
            self.exhausted = true;
        }
        if rows.is_empty() {
            return Ok(None);
        }

        self.offset += rows.len();
        Ok(Some(rows))
    }

    /// 逐行消费全部页，返回扫描行数
    pub fn for_each_row(mut self, mut f: impl FnMut(T)) -> RepositoryResult<usize> {
        let mut scanned = 0;
        while let Some(page) = self.next_page()? {
            scanned += page.len();
            page.into_iter().for_each(&mut f);
        }
        Ok(scanned)
    }
}
