//! # 载荷封装模块
//!
//! 定义秘密文件在位流中的序列化格式，以及两个方向的状态机。
//!
//! 线格式 (唯一需要逐位精确的契约):
//!
//! ```text
//! <文件名字节> 0x00 <十进制大小字符串字节> 0x00 <原始数据 × 大小>
//! ```
//!
//! 文件名和大小字符串都没有长度前缀，NUL 是唯一的分隔符；
//! 十进制数字串和常规文件名里都不会出现 NUL。
//! 每个字节按最高有效位在前展开成 8 个 bit 后交给通道层嵌入。

use crate::error::StegoError;
use std::io::{self, Read, Write};

/// 当前正在产出 (嵌入) 或消费 (提取) 的载荷逻辑段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadComponent {
    FileName,
    FileSize,
    RawData,
}

/// 提取阶段打开输出的抽象。
///
/// 文件名是从位流中间恢复出来的，所以输出必须在提取中途才能创建；
/// 判定"图像里没有秘密"时还要能把已创建的输出丢弃掉。
/// 由调用方注入具体实现，核心不关心输出落在哪里。
pub trait SecretSink {
    type Writer: Write;

    /// 以恢复出的文件名创建输出。
    fn create(&mut self, file_name: &str) -> io::Result<Self::Writer>;

    /// 丢弃之前以该文件名创建的输出。
    fn discard(&mut self, file_name: &str) -> io::Result<()>;
}

/// 嵌入方向的封装状态机：把 {文件名, 大小, 原始数据} 串成一条字节流。
///
/// 依次产出文件名字节、一个 NUL、大小的十进制字符串字节、
/// 一个 NUL，最后是恰好 `size` 个从秘密文件读出的原始字节。
#[derive(Debug)]
pub struct SecretFramer<R: Read> {
    reader: R,
    component: PayloadComponent,
    name_bytes: Vec<u8>,
    size_digits: Vec<u8>,
    pos: usize,
    remaining: u64,
}

impl<R: Read> SecretFramer<R> {
    #[must_use]
    pub fn new(file_name: &str, file_size: u64, reader: R) -> Self {
        Self {
            reader,
            component: PayloadComponent::FileName,
            name_bytes: file_name.as_bytes().to_vec(),
            size_digits: file_size.to_string().into_bytes(),
            pos: 0,
            remaining: file_size,
        }
    }

    /// 产出下一个待嵌入的字节；载荷结束时返回 `Ok(None)`。
    ///
    /// # Errors
    ///
    /// 秘密文件在声明的大小读满之前就结束，或底层读取失败时返回错误。
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        match self.component {
            PayloadComponent::FileName => {
                if self.pos == self.name_bytes.len() {
                    self.component = PayloadComponent::FileSize;
                    self.pos = 0;
                    return Ok(Some(0));
                }
                let byte = self.name_bytes[self.pos];
                self.pos += 1;
                Ok(Some(byte))
            }
            PayloadComponent::FileSize => {
                if self.pos == self.size_digits.len() {
                    self.component = PayloadComponent::RawData;
                    self.pos = 0;
                    return Ok(Some(0));
                }
                let byte = self.size_digits[self.pos];
                self.pos += 1;
                Ok(Some(byte))
            }
            PayloadComponent::RawData => {
                if self.remaining == 0 {
                    return Ok(None);
                }
                let mut buf = [0u8; 1];
                self.reader.read_exact(&mut buf)?;
                self.remaining -= 1;
                Ok(Some(buf[0]))
            }
        }
    }
}

/// 封装后的总字节数：文件名 + NUL + 大小字符串 + NUL + 原始数据。
/// 嵌入前的容量校验以它为准。
#[must_use]
pub fn framed_len(file_name: &str, file_size: u64) -> u64 {
    file_name.len() as u64 + 1 + file_size.to_string().len() as u64 + 1 + file_size
}

/// 提取方向的封装状态机：逐字节消费位流，重建秘密文件。
///
/// NUL 只在 `RawData` 之外被当作分隔符。文件名凑齐后通过
/// [`SecretSink`] 创建输出；大小字符串必须能解析为正整数，
/// 否则判定图像里没有秘密并丢弃已创建的输出。
#[derive(Debug)]
pub struct SecretAssembler<S: SecretSink> {
    sink: S,
    writer: Option<S::Writer>,
    component: PayloadComponent,
    name_bytes: Vec<u8>,
    file_name: String,
    size_digits: Vec<u8>,
    file_size: u64,
    written: u64,
}

impl<S: SecretSink> SecretAssembler<S> {
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            writer: None,
            component: PayloadComponent::FileName,
            name_bytes: Vec::new(),
            file_name: String::new(),
            size_digits: Vec::new(),
            file_size: 0,
            written: 0,
        }
    }

    /// 喂入一个从图像中恢复的字节；秘密文件写满时返回 `Ok(true)`。
    ///
    /// # Errors
    ///
    /// 大小字段无法解析为正整数时返回 [`StegoError::NoSecretFound`]
    /// 并丢弃已创建的输出；输出写入失败时返回 I/O 错误。
    pub fn push_byte(&mut self, byte: u8) -> Result<bool, StegoError> {
        match self.component {
            PayloadComponent::FileName => {
                if byte == 0 {
                    // 空文件名说明流里根本不是有效封装
                    if self.name_bytes.is_empty() {
                        return Err(StegoError::NoSecretFound);
                    }
                    self.file_name = String::from_utf8_lossy(&self.name_bytes).into_owned();
                    self.writer = Some(self.sink.create(&self.file_name)?);
                    self.component = PayloadComponent::FileSize;
                } else {
                    self.name_bytes.push(byte);
                }
                Ok(false)
            }
            PayloadComponent::FileSize => {
                if byte != 0 {
                    self.size_digits.push(byte);
                    return Ok(false);
                }

                let parsed = std::str::from_utf8(&self.size_digits)
                    .ok()
                    .and_then(|digits| digits.parse::<u64>().ok())
                    .filter(|&size| size > 0);

                match parsed {
                    Some(size) => {
                        self.file_size = size;
                        self.component = PayloadComponent::RawData;
                        Ok(false)
                    }
                    None => {
                        self.abandon();
                        Err(StegoError::NoSecretFound)
                    }
                }
            }
            PayloadComponent::RawData => {
                if self.written < self.file_size {
                    if let Some(writer) = self.writer.as_mut() {
                        writer.write_all(&[byte])?;
                    }
                    self.written += 1;
                }
                Ok(self.written == self.file_size)
            }
        }
    }

    /// 位流在秘密写满之前耗尽时的收尾，把耗尽归类为对应的错误。
    ///
    /// 已经进入 `RawData` 说明封装头是有效的，报告数据被截断；
    /// 否则图像里根本没有有效封装，报告没有秘密，并丢弃半成品输出。
    #[must_use]
    pub fn exhausted(mut self) -> StegoError {
        match self.component {
            PayloadComponent::RawData => StegoError::TruncatedSecret {
                expected: self.file_size,
                recovered: self.written,
            },
            _ => {
                self.abandon();
                StegoError::NoSecretFound
            }
        }
    }

    /// 提取顺利完成后的收尾：把输出冲刷落地，再交出恢复出的文件名。
    ///
    /// # Errors
    ///
    /// 输出冲刷失败时返回 I/O 错误，不会把失败当作成功上报。
    pub fn finish(mut self) -> Result<String, StegoError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(std::mem::take(&mut self.file_name))
    }

    fn abandon(&mut self) {
        if self.writer.take().is_some() {
            // 删除半成品输出失败不影响"没有秘密"这一结论
            let _ = self.sink.discard(&self.file_name);
        }
    }
}
