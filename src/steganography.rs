//! # 隐写核心模块
//!
//! 把掩码、通道位操作、像素游标和载荷封装串成两个公开操作：
//! [`embed_secret`] 把一个任意文件藏进载体图像的颜色通道，
//! [`retrieve_secret`] 把藏好的文件原样取出来。
//!
//! 两个操作都是同步的，一次调用跑完为止；载体图像由调用方持有，
//! 核心只通过游标读写像素，不负责图像的加载与保存。

use crate::channels::{embed_into_pixel, extract_from_pixel};
use crate::constants::{NUM_BITS, NUM_CHANNELS};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::StegoError;
use crate::mask::BitMask;
use crate::payload::{SecretAssembler, SecretFramer, SecretSink, framed_len};
use image::{Rgb, RgbImage};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// 把秘密文件嵌入载体图像的启用位中。
///
/// 嵌入前先用封装后的总长度和 [`BitMask::capacity`] 做容量校验，
/// 放不下就直接失败，一个像素都不改动；这样容量不足永远不会
/// 留下半改写的载体。掩码为空时容量为 0，同样在这里被拦下。
///
/// 之后逐字节展开成 bit (最高有效位在前) 写入像素，像素的启用槽位
/// 用完就向写游标要下一个像素；载荷结束后补一次 flush，
/// 把最后一个可能只写了一部分的像素提交回图像。
///
/// # Arguments
///
/// * `image` - 载体图像，嵌入会就地改写其像素。
/// * `secret` - 秘密文件的字节流。
/// * `file_name` - 秘密文件的名字，会随数据一起嵌入。
/// * `file_size` - 秘密文件的字节数。
/// * `mask` - 每通道的位启用掩码。
///
/// # Errors
///
/// 容量不足返回 [`StegoError::CapacityExceeded`]；
/// 字节流在 `file_size` 读满前结束或读取失败返回 I/O 错误。
pub fn embed_secret<R: Read>(
    image: &mut RgbImage,
    secret: R,
    file_name: &str,
    file_size: u64,
    mask: &BitMask,
) -> Result<(), StegoError> {
    let required = framed_len(file_name, file_size);
    let available = mask.capacity(image.width(), image.height());
    if required > available {
        return Err(StegoError::CapacityExceeded {
            required,
            available,
        });
    }

    let bits_per_pixel = mask.enabled_count() * NUM_CHANNELS as u32;
    let mut framer = SecretFramer::new(file_name, file_size, secret);
    let mut cursor = WriteCursor::new(image);

    let mut current = Rgb([0u8; NUM_CHANNELS]);
    let mut bits_remaining = 0u32;

    while let Some(byte) = framer.next_byte()? {
        let mut bits: VecDeque<bool> =
            (0..NUM_BITS).rev().map(|i| byte & (1 << i) != 0).collect();

        while !bits.is_empty() {
            if bits_remaining == 0 {
                current = cursor
                    .advance(current)
                    .ok_or(StegoError::CapacityExceeded {
                        required,
                        available,
                    })?;
                bits_remaining = bits_per_pixel;
            }

            let (updated, consumed) = embed_into_pixel(current, &mut bits, mask, bits_remaining);
            current = updated;
            bits_remaining -= consumed;
        }
    }

    // 最后一个像素可能只填了一部分, 仍要提交
    cursor.flush(current);
    Ok(())
}

/// 从载体图像中取回之前嵌入的秘密文件，返回恢复出的文件名。
///
/// 读游标按嵌入时的顺序遍历像素，每个像素取出全部启用位；
/// 累积队列每凑满 8 个 bit 合成一个字节 (最高有效位在前)，
/// 交给封装状态机。输出的创建与丢弃通过调用方注入的
/// [`SecretSink`] 完成。
///
/// # Errors
///
/// * [`StegoError::NoSecretFound`] - 图像里没有有效封装；
///   已创建的半成品输出会被丢弃。
/// * [`StegoError::TruncatedSecret`] - 封装头有效，但像素在声明的
///   数据长度读满之前耗尽。
/// * I/O 错误 - 输出创建、写入或最终冲刷失败。
pub fn retrieve_secret<S: SecretSink>(
    image: &RgbImage,
    mask: &BitMask,
    sink: S,
) -> Result<String, StegoError> {
    // 没有启用位就没有任何可恢复的数据
    if mask.enabled_count() == 0 {
        return Err(StegoError::NoSecretFound);
    }

    let mut cursor = ReadCursor::new(image);
    let mut assembler = SecretAssembler::new(sink);
    let mut bits: VecDeque<bool> = VecDeque::new();

    loop {
        let Some(pixel) = cursor.advance() else {
            return Err(assembler.exhausted());
        };
        extract_from_pixel(pixel, mask, &mut bits);

        while bits.len() >= NUM_BITS {
            let mut byte = 0u8;
            for _ in 0..NUM_BITS {
                byte = (byte << 1) | u8::from(bits.pop_front().unwrap_or(false));
            }

            if assembler.push_byte(byte)? {
                return assembler.finish();
            }
        }
    }
}

/// 往目录里写恢复出的文件的 [`SecretSink`] 实现。
///
/// 文件名取路径的最后一段，嵌入的名字带路径分隔符也不会写到
/// 目标目录之外。已存在的同名文件默认拒绝覆盖，除非开启 `force`。
#[derive(Debug)]
pub struct DirSink {
    dir: PathBuf,
    force: bool,
}

impl DirSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            dir: dir.into(),
            force,
        }
    }

    fn target_path(&self, file_name: &str) -> io::Result<PathBuf> {
        let name = Path::new(file_name).file_name().ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("'{file_name}' is not a usable file name"),
            )
        })?;
        Ok(self.dir.join(name))
    }
}

impl SecretSink for DirSink {
    type Writer = BufWriter<File>;

    fn create(&mut self, file_name: &str) -> io::Result<Self::Writer> {
        let path = self.target_path(file_name)?;
        if !self.force && path.exists() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("Output file already exists: {}", path.to_string_lossy()),
            ));
        }
        Ok(BufWriter::new(File::create(path)?))
    }

    fn discard(&mut self, file_name: &str) -> io::Result<()> {
        let path = self.target_path(file_name)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// 把恢复出的文件收进内存的 [`SecretSink`] 实现，
/// 适合不落盘的调用方 (比如测试或上层服务)。
#[derive(Debug, Default)]
pub struct MemorySink {
    file_name: Option<String>,
    data: Rc<RefCell<Vec<u8>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 恢复出的文件内容；提取完成前为空。
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.borrow().clone()
    }

    /// 创建过输出时记下的文件名。
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

/// 共享内存缓冲的写端。
#[derive(Debug)]
pub struct MemoryWriter(Rc<RefCell<Vec<u8>>>);

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SecretSink for &mut MemorySink {
    type Writer = MemoryWriter;

    fn create(&mut self, file_name: &str) -> io::Result<Self::Writer> {
        self.file_name = Some(file_name.to_string());
        self.data.borrow_mut().clear();
        Ok(MemoryWriter(Rc::clone(&self.data)))
    }

    fn discard(&mut self, _file_name: &str) -> io::Result<()> {
        self.file_name = None;
        self.data.borrow_mut().clear();
        Ok(())
    }
}
