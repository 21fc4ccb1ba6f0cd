//! # lsb_stash 库
//!
//! 本库包含基于可配置位掩码的 LSB 文件隐写工具的核心逻辑。
//! 载体图像的每个像素有 R、G、B 三个 8-bit 通道，
//! 掩码决定每个通道中哪些位用来存放秘密文件的数据。

// 声明库包含的所有模块。

pub mod channels;
pub mod cli;
pub mod constants;
pub mod cursor;
pub mod error;
pub mod handler;
pub mod mask;
pub mod payload;
pub mod steganography;
