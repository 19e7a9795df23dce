// crates/lk_foundation/src/error.rs

//! 基础错误类型
//!
//! 定义整个项目的基础错误类型，仅包含与基础设施相关的错误。
//! 本层禁止引入任何物理或业务领域概念。
//!
//! # 错误分层
//!
//! ```text
//! 高层错误 (lk_physics::DynamicsError, LatticeError, ProcessorError)
//!        ↓ (转换)
//! 基础错误 ← 你在这里 (lk_foundation::LkError)
//! ```

use thiserror::Error;

/// 统一结果类型别名
///
/// 用于简化函数签名，等价于 `Result<T, LkError>`。
pub type LkResult<T> = Result<T, LkError>;

/// Foundation 层基础错误
///
/// 包含所有基础设施级别的错误，是错误体系的根基。
/// API 边界的前置条件违反统一用本类型表达。
#[derive(Debug, Error)]
pub enum LkError {
    /// 数组或集合大小不匹配
    ///
    /// 在需要严格大小一致性的操作中触发（如分解缓冲区、统计量归并）。
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称（用于调试）
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引访问越界
    #[error("索引越界: {index_type} 索引{index} 超出范围 0..{len}")]
    IndexOutOfBounds {
        /// 索引类别（如 "Cell", "Processor"）
        index_type: &'static str,
        /// 访问的索引值
        index: usize,
        /// 容器长度（上界）
        len: usize,
    },

    /// 输入数据验证失败
    ///
    /// 用于参数校验、前置条件检查等场景。
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 内部实现错误
    ///
    /// 当程序进入不应到达的状态时使用，通常表示不变量被破坏。
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

impl LkError {
    /// 创建大小不匹配错误
    #[inline]
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 创建索引越界错误
    #[inline]
    pub fn index_out_of_bounds(index_type: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds {
            index_type,
            index,
            len,
        }
    }

    /// 创建无效输入错误
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 创建内部错误
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 验证数组大小是否匹配，不匹配则返回 [`LkError::SizeMismatch`]
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> LkResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }

    /// 验证索引是否在有效范围内，越界则返回 [`LkError::IndexOutOfBounds`]
    #[inline]
    pub fn check_index(index_type: &'static str, index: usize, len: usize) -> LkResult<()> {
        if index >= len {
            Err(Self::index_out_of_bounds(index_type, index, len))
        } else {
            Ok(())
        }
    }
}

/// 检查条件，不满足则提前返回给定错误
///
/// # 示例
///
/// ```
/// use lk_foundation::{ensure, LkError, LkResult};
///
/// fn divide(a: f64, b: f64) -> LkResult<f64> {
///     ensure!(b != 0.0, LkError::invalid_input("除数不能为零"));
///     Ok(a / b)
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = LkError::size_mismatch("rawData", 26, 20);
        assert!(err.to_string().contains("rawData"));
        assert!(err.to_string().contains("26"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_check_size() {
        assert!(LkError::check_size("test", 10, 10).is_ok());
        let result = LkError::check_size("test", 10, 5);
        assert!(matches!(result.unwrap_err(), LkError::SizeMismatch { .. }));
    }

    #[test]
    fn test_check_index() {
        assert!(LkError::check_index("Cell", 5, 10).is_ok());
        let result = LkError::check_index("Cell", 10, 10);
        assert!(matches!(
            result.unwrap_err(),
            LkError::IndexOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_ensure_macro() {
        fn checked(v: f64) -> LkResult<f64> {
            ensure!(v >= 0.0, LkError::invalid_input("需要非负值"));
            Ok(v.sqrt())
        }
        assert!(checked(4.0).is_ok());
        assert!(checked(-1.0).is_err());
    }
}
