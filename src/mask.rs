//! # 位掩码模块
//!
//! `BitMask` 描述每个颜色通道中哪些位参与隐写：
//! 8 个布尔开关，下标 0 为最低有效位 (LSB)，下标 7 为最高有效位 (MSB)。
//! 扫描通道时的位置顺序固定为从下标 7 递减到 0，与掩码内容无关，
//! 嵌入与提取共用同一顺序，二者才能对齐。

use crate::constants::{NUM_BITS, NUM_CHANNELS};
use std::fmt;
use std::str::FromStr;

/// 每个颜色通道的位启用掩码。
///
/// 在一次嵌入或提取调用期间保持不变。启用的位越多，
/// 图像容量越大，但对载体的视觉扰动也越明显。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitMask([bool; NUM_BITS]);

impl BitMask {
    /// 从 8 个布尔开关构造掩码，`flags[0]` 对应 LSB。
    #[must_use]
    pub fn new(flags: [bool; NUM_BITS]) -> Self {
        Self(flags)
    }

    /// 从位下标列表构造掩码，下标超出 0..=7 的将被忽略。
    #[must_use]
    pub fn from_positions(positions: &[usize]) -> Self {
        let mut flags = [false; NUM_BITS];
        for &pos in positions {
            if pos < NUM_BITS {
                flags[pos] = true;
            }
        }
        Self(flags)
    }

    /// 查询某个位下标是否启用。超出范围一律视为未启用。
    #[must_use]
    pub fn is_enabled(&self, position: usize) -> bool {
        position < NUM_BITS && self.0[position]
    }

    /// 启用的位数，即每通道可写入的 bit 数。
    #[must_use]
    pub fn enabled_count(&self) -> u32 {
        self.0.iter().filter(|&&enabled| enabled).count() as u32
    }

    /// 按固定扫描顺序 (下标 7 递减到 0) 迭代启用的位下标。
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..NUM_BITS).rev().filter(move |&pos| self.0[pos])
    }

    /// 当前掩码下图像的最大可隐藏字节数。
    ///
    /// 公式为 `floor(width * height * 3 * n / 8)`，其中 `n` 为启用位数。
    /// 掩码为空时容量为 0。
    #[must_use]
    pub fn capacity(&self, width: u32, height: u32) -> u64 {
        capacity(width, height, self.enabled_count())
    }
}

/// 默认掩码只启用最低有效位，对载体的扰动最小。
impl Default for BitMask {
    fn default() -> Self {
        Self::from_positions(&[0])
    }
}

impl fmt::Display for BitMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pos in (0..NUM_BITS).filter(|&pos| self.0[pos]) {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{pos}")?;
            first = false;
        }
        Ok(())
    }
}

/// 从命令行形式的逗号分隔下标列表解析掩码，如 `"0"` 或 `"0,1,7"`。
///
/// 重复的下标无害；空串、非数字或超出 0..=7 的下标都会报错。
impl FromStr for BitMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut flags = [false; NUM_BITS];
        let mut any = false;

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let pos: usize = part
                .parse()
                .map_err(|_| format!("'{part}' is not a valid bit position"))?;
            if pos >= NUM_BITS {
                return Err(format!(
                    "bit position {pos} is out of range (expected 0 to {})",
                    NUM_BITS - 1
                ));
            }
            flags[pos] = true;
            any = true;
        }

        if !any {
            return Err("at least one bit position is required".to_string());
        }
        Ok(Self(flags))
    }
}

/// 图像在给定启用位数下的最大可隐藏字节数。
///
/// 纯函数：`floor(width * height * 3 * bits_per_channel / 8)`。
/// 嵌入前的容量校验和容量展示都使用它。
/// 中间乘积在 u128 里计算，极端尺寸下结果饱和到 `u64::MAX` 而不是回绕。
#[must_use]
pub fn capacity(width: u32, height: u32, bits_per_channel: u32) -> u64 {
    let bits = u128::from(width)
        * u128::from(height)
        * NUM_CHANNELS as u128
        * u128::from(bits_per_channel);
    u64::try_from(bits / NUM_BITS as u128).unwrap_or(u64::MAX)
}
