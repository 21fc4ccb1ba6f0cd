//! # 像素游标模块
//!
//! 对载体图像做有状态的逐像素遍历：x 先增，到行尾换行，
//! 即按行优先顺序从 (0, 0) 走到 (width-1, height-1)。
//!
//! 写游标比读游标多一步：每次前进时，先把上一次交出的
//! (已被外部改写的) 像素提交回图像，再移动到下一个位置。
//! 游标状态由一次嵌入/提取调用独占持有，调用结束即丢弃，
//! 不存在任何跨调用的全局遍历状态。

use image::{Rgb, RgbImage};

/// 嵌入用写游标。持有载体图像的可变借用，生命周期覆盖一次完整的嵌入。
#[derive(Debug)]
pub struct WriteCursor<'a> {
    image: &'a mut RgbImage,
    x: u32,
    y: u32,
    issued: bool,
}

impl<'a> WriteCursor<'a> {
    #[must_use]
    pub fn new(image: &'a mut RgbImage) -> Self {
        Self {
            image,
            x: 0,
            y: 0,
            issued: false,
        }
    }

    /// 提交上一个像素并交出下一个像素；图像耗尽时返回 `None`。
    ///
    /// 首次调用直接交出 (0, 0)，不提交任何东西。之后的每次调用把
    /// `current` 写回上一次交出的坐标，再按行优先前进。
    /// 越界判定是 `y >= height`：最后一行走完后立即报告耗尽。
    pub fn advance(&mut self, current: Rgb<u8>) -> Option<Rgb<u8>> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return None;
        }
        if self.issued {
            // 耗尽后保持耗尽, 不再提交任何东西
            if self.y >= self.image.height() {
                return None;
            }
            self.image.put_pixel(self.x, self.y, current);

            self.x += 1;
            if self.x == self.image.width() {
                self.x = 0;
                self.y += 1;
            }
            if self.y >= self.image.height() {
                return None;
            }
        }

        self.issued = true;
        Some(*self.image.get_pixel(self.x, self.y))
    }

    /// 把最后一个 (可能只写了一部分的) 像素提交回图像。
    /// 嵌入循环结束后必须调用一次，否则末尾的数据会丢失。
    pub fn flush(&mut self, current: Rgb<u8>) {
        if self.issued && self.y < self.image.height() {
            self.image.put_pixel(self.x, self.y, current);
        }
    }
}

/// 提取用读游标。遍历顺序与 [`WriteCursor`] 完全一致，但不写回。
#[derive(Debug)]
pub struct ReadCursor<'a> {
    image: &'a RgbImage,
    x: u32,
    y: u32,
    issued: bool,
}

impl<'a> ReadCursor<'a> {
    #[must_use]
    pub fn new(image: &'a RgbImage) -> Self {
        Self {
            image,
            x: 0,
            y: 0,
            issued: false,
        }
    }

    /// 交出下一个像素；图像耗尽时返回 `None`，越界判定与写游标相同。
    pub fn advance(&mut self) -> Option<Rgb<u8>> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return None;
        }
        if self.issued {
            self.x += 1;
            if self.x == self.image.width() {
                self.x = 0;
                self.y += 1;
            }
            if self.y >= self.image.height() {
                return None;
            }
        }

        self.issued = true;
        Some(*self.image.get_pixel(self.x, self.y))
    }
}
