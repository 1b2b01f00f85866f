// ==========================================
// 车队司机评分系统 - 导入层
// ==========================================
// 职责: 将规范表头的 CSV 读入为 RawFactBundle
// 红线: 只做读取与类型转换，不做任何评分计算
// ==========================================

pub mod csv_loader;
pub mod error;

pub use csv_loader::load_bundle_from_dir;
pub use error::{ImportError, ImportResult};
