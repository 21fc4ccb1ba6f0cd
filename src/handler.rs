//! # 命令处理逻辑模块
//!
//! 包含处理 `hide` 和 `recover` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O (图像的加载与保存、秘密文件的读取)、
//! 调用核心隐写算法以及向用户报告结果；核心算法本身只操作像素。

use crate::cli::{HideArgs, RecoverArgs};
use crate::constants::DEFAULT_STEGO_NAME;
use crate::steganography::{DirSink, embed_secret, retrieve_secret};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和秘密文件、调用核心嵌入函数，
/// 最后将结果图像写入目标路径。容量校验在核心内完成，
/// 放不下时载体不会被改动。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径、位掩码等的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取载体图像或秘密文件。
/// * 当前掩码下图像没有足够的空间容纳秘密文件。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法写入目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let mut carrier = image::open(&args.image)
        .with_context(|| {
            format!(
                "Unable to read image file: {}",
                args.image.to_string_lossy().red().bold()
            )
        })?
        .to_rgb8();

    let secret_name = file_name_of(&args.secret)?;
    let secret_size = std::fs::metadata(&args.secret)
        .with_context(|| {
            format!(
                "Unable to read secret file: {}",
                args.secret.to_string_lossy().red().bold()
            )
        })?
        .len();
    let secret = File::open(&args.secret).with_context(|| {
        format!(
            "Unable to read secret file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;

    let dest = args.dest.clone().unwrap_or_else(|| default_dest(&args.image));
    anyhow::ensure!(
        args.force || !dest.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        dest.to_string_lossy().red().bold()
    );

    embed_secret(
        &mut carrier,
        BufReader::new(secret),
        &secret_name,
        secret_size,
        &args.bits,
    )
    .with_context(|| {
        format!(
            "Failed to hide {} in the image.",
            secret_name.red().bold()
        )
    })?;

    carrier.save(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、调用核心取回函数，
/// 取回的文件以嵌入时的文件名写入目标目录。
///
/// # Arguments
///
/// * `args` - 包含输入路径、位掩码等的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件。
/// * 图像中没有隐藏的文件，或掩码与嵌入时不一致。
/// * 隐藏的文件不完整 (图像被裁剪或数据损坏)。
/// * 无法写入目标目录。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let carrier = image::open(&args.image)
        .with_context(|| {
            format!(
                "Unable to read image file: {}",
                args.image.to_string_lossy().red().bold()
            )
        })?
        .to_rgb8();

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.image));
    let sink = DirSink::new(&out_dir, args.force);

    let recovered = retrieve_secret(&carrier, &args.bits, sink).with_context(|| {
        format!(
            "Failed to recover a hidden file from: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The hidden file has been successfully recovered and saved: {}",
        out_dir.join(&recovered).to_string_lossy().green().bold()
    );
    Ok(())
}

/// 取路径的最后一段作为嵌入用的文件名。
fn file_name_of(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .with_context(|| {
            format!(
                "Unable to determine a file name for: {}",
                path.to_string_lossy().red().bold()
            )
        })?
        .to_string_lossy()
        .into_owned();
    Ok(name)
}

/// 未指定输出路径时，结果图像保存为载体所在目录下的默认文件名。
fn default_dest(image: &Path) -> PathBuf {
    parent_dir(image).join(DEFAULT_STEGO_NAME)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
