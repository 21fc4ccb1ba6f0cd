//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::mask::BitMask;
use clap::Parser;
use std::path::PathBuf;

/// 一款基于可配置位掩码 LSB 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或取回任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于可配置位掩码 LSB 隐写术的命令行工具，用于在无损格式图像 (如 PNG, BMP) 中隐藏或取回任意文件。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏) 和 recover (取回)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 把一个任意文件隐藏进无损格式图像 (如 PNG, BMP) 的颜色通道中。
    Hide(HideArgs),

    /// 从经过隐写的图像中取回隐藏的文件。
    Recover(RecoverArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 用于隐写的载体图像文件路径 (如 PNG, BMP)。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的秘密文件路径，文件名会随内容一起嵌入。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 隐写完成后保存结果图像的输出路径。
    /// 不指定时保存为载体图像所在目录下的 secret.bmp。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 每个颜色通道参与隐写的位下标，逗号分隔，0 为最低位，7 为最高位。
    /// 嵌入和取回必须使用相同的掩码。
    #[arg(short, long, default_value = "0")]
    pub bits: BitMask,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏文件数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 取回的文件保存到的目录。不指定时使用图像所在目录。
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// 每个颜色通道参与隐写的位下标，逗号分隔，必须与嵌入时一致。
    #[arg(short, long, default_value = "0")]
    pub bits: BitMask,

    /// 目标目录下已存在同名文件时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}
