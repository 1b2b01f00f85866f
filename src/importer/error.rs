// ==========================================
// 车队司机评分系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("目录不存在: {0}")]
    DirectoryNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败 ({file}, 行 {row}): {message}")]
    CsvParseError {
        file: String,
        row: usize,
        message: String,
    },

    // ===== 数据映射错误 =====
    #[error("类型转换失败 ({file}, 行 {row}, 字段 {field}): 无法解析数值 {value}")]
    TypeConversionError {
        file: String,
        row: usize,
        field: String,
        value: String,
    },
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
