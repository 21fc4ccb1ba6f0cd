//! # 错误类型模块
//!
//! 定义隐写核心逻辑的类型化错误 `StegoError`。
//! 所有失败都以枚举成员的形式返回给调用者，核心内部不发生 panic，
//! 也不吞掉任何错误。

use std::io;
use thiserror::Error;

/// 隐写核心在嵌入或提取过程中可能产生的错误。
#[derive(Debug, Error)]
pub enum StegoError {
    /// 待隐藏的数据 (含封装头) 超出了当前掩码下图像的容量。
    /// 掩码为空 (0 个启用位) 时容量为 0，任何嵌入都会触发此错误。
    #[error(
        "The secret does not fit in the image. \nRequired: {required} bytes, Available: {available} bytes"
    )]
    CapacityExceeded { required: u64, available: u64 },

    /// 图像中没有找到有效的隐藏数据。
    /// 大小字段无法解析为正整数时即判定为此情况，而不是报告解析错误。
    #[error("The image does not appear to contain a hidden file.")]
    NoSecretFound,

    /// 像素在声明的数据长度被读完之前就耗尽了。
    /// 说明图像被裁剪或数据已损坏，绝不静默复用过期的像素数据。
    #[error(
        "The hidden file is truncated. \nDeclared: {expected} bytes, Recovered: {recovered} bytes"
    )]
    TruncatedSecret { expected: u64, recovered: u64 },

    /// 底层字节流或输出文件的 I/O 失败，原样向上传递，核心不做重试。
    #[error(transparent)]
    Io(#[from] io::Error),
}
