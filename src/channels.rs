//! # 通道位操作模块
//!
//! 负责单个像素层面的全部位操作：把像素的 R、G、B 通道拆成位向量、
//! 按掩码把待隐藏的 bit 写入启用的位置、以及反向把 bit 读出来。
//!
//! 写入和读取必须以完全相同的顺序访问通道和位下标
//! (通道按 R、G、B，位下标从 7 递减到 0)，提取才能与嵌入对齐。
//! 写入的每个 bit 都是原始 bit 的逻辑取反，提取时再取反一次即可还原，
//! 这一步是固定的混淆变换，双方必须一致。

use crate::constants::NUM_CHANNELS;
use crate::mask::BitMask;
use image::Rgb;
use std::collections::VecDeque;

/// 一个像素三个颜色通道的位向量表示，`channels[0..3]` 依次为 R、G、B。
///
/// 纯数据转换，任何 8-bit 输入都合法，编解码互为逆操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBits {
    channels: [u8; NUM_CHANNELS],
}

impl ChannelBits {
    /// 把像素拆成三个通道的位向量。
    #[must_use]
    pub fn decode(pixel: Rgb<u8>) -> Self {
        Self { channels: pixel.0 }
    }

    /// 把三个通道的位向量重新组装成像素。
    #[must_use]
    pub fn encode(&self) -> Rgb<u8> {
        Rgb(self.channels)
    }

    /// 读取某个通道中某个位下标的值，bit 0 为 LSB。
    #[must_use]
    pub fn bit(&self, channel: usize, position: usize) -> bool {
        self.channels[channel] & (1 << position) != 0
    }

    /// 设置某个通道中某个位下标的值。
    pub fn set_bit(&mut self, channel: usize, position: usize, value: bool) {
        if value {
            self.channels[channel] |= 1 << position;
        } else {
            self.channels[channel] &= !(1 << position);
        }
    }
}

/// 把队列中的 bit 写入一个像素的启用位置，返回更新后的像素和消耗的 bit 数。
///
/// `bits_remaining` 是该像素尚未使用的启用槽位数。一个字节可能跨越
/// 两个像素，恢复写入时要先跳过本像素中已经写过的槽位，
/// 跳过量为 `3 * n - bits_remaining` (n 为每通道启用位数)。
///
/// 通道按 R、G、B 顺序，位下标从 7 递减到 0；写入的值是
/// 队列头部 bit 的逻辑取反；队列一空立刻停止，哪怕停在通道中间。
#[must_use]
pub fn embed_into_pixel(
    pixel: Rgb<u8>,
    bits: &mut VecDeque<bool>,
    mask: &BitMask,
    bits_remaining: u32,
) -> (Rgb<u8>, u32) {
    let mut offset = mask.enabled_count() * NUM_CHANNELS as u32 - bits_remaining;
    let mut consumed = 0;

    let mut channel_bits = ChannelBits::decode(pixel);

    'channels: for channel in 0..NUM_CHANNELS {
        for position in mask.positions() {
            if offset > 0 {
                offset -= 1;
                continue;
            }

            let Some(bit) = bits.pop_front() else {
                break 'channels;
            };
            channel_bits.set_bit(channel, position, !bit);
            consumed += 1;
        }
    }

    (channel_bits.encode(), consumed)
}

/// 从一个像素的启用位置读出全部 bit，按写入顺序追加到输出队列。
///
/// 读取顺序与 [`embed_into_pixel`] 完全一致，读出的值取反后入队，
/// 与嵌入时的取反相抵消。
pub fn extract_from_pixel(pixel: Rgb<u8>, mask: &BitMask, out: &mut VecDeque<bool>) {
    let channel_bits = ChannelBits::decode(pixel);

    for channel in 0..NUM_CHANNELS {
        for position in mask.positions() {
            out.push_back(!channel_bits.bit(channel, position));
        }
    }
}
