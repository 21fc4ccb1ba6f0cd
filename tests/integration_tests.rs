use anyhow::Ok;
use image::{ImageBuffer, Rgb};
use lsb_stash::{
    cli::{HideArgs, RecoverArgs},
    handler::{handle_hide, handle_recover},
};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(3))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgb([chunk[0], chunk[1], chunk[2]]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 验证从隐藏到取回的完整流程
#[test]
fn test_handle_hide_and_recover_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let hidden_image_path = dir.path().join("hidden.png");
    let secret_path = dir.path().join("payload.bin");
    let out_dir = dir.path().join("out");

    create_test_image(&original_image_path, 100, 100);
    fs::create_dir(&out_dir)?;
    let secret_bytes: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&secret_path, &secret_bytes)?;

    // 2. 测试 handle_hide
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        secret: secret_path.clone(),
        dest: Some(hidden_image_path.clone()),
        bits: "0,1".parse().unwrap(),
        force: false,
    };
    handle_hide(hide_args)?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );

    // 3. 测试 handle_recover
    let recover_args = RecoverArgs {
        image: hidden_image_path.clone(),
        out_dir: Some(out_dir.clone()),
        bits: "0,1".parse().unwrap(),
        force: false,
    };
    handle_recover(recover_args)?;

    // 4. 验证结果: 取回的文件以嵌入时的文件名落在目标目录
    let recovered_path = out_dir.join("payload.bin");
    assert!(
        recovered_path.exists(),
        "Recovered file should be created."
    );
    let recovered_bytes = fs::read(&recovered_path)?;
    assert_eq!(
        secret_bytes, recovered_bytes,
        "Recovered bytes must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并完成操作
#[test]
fn test_handle_hide_with_default_dest() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.png");
    let secret_path = dir.path().join("note.txt");
    let out_dir = dir.path().join("out");

    create_test_image(&original_image_path, 64, 64);
    fs::create_dir(&out_dir)?;
    fs::write(&secret_path, "default path test")?;

    // 2. 测试 handle_hide，不提供 dest 路径
    let hide_args = HideArgs {
        image: original_image_path.clone(),
        secret: secret_path.clone(),
        dest: None, // 关键：测试 None 的情况
        bits: "0".parse().unwrap(),
        force: false,
    };
    handle_hide(hide_args)?;

    // 验证默认的隐写图像是否已创建 (载体所在目录下的 secret.bmp)
    let expected_stego_path = dir.path().join("secret.bmp");
    assert!(
        expected_stego_path.exists(),
        "Default stego image should be created at: {:?}",
        expected_stego_path
    );

    // 3. 从默认位置取回并验证内容
    let recover_args = RecoverArgs {
        image: expected_stego_path,
        out_dir: Some(out_dir.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    };
    handle_recover(recover_args)?;

    let recovered = fs::read_to_string(out_dir.join("note.txt"))?;
    assert_eq!(recovered, "default path test");

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let secret_path = dir.path().join("secret.txt");
    let dest_path = dir.path().join("dest.png");

    create_test_image(&image_path, 50, 50);
    fs::write(&secret_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    // 先创建一个同名的目标文件，模拟“文件已存在”的场景
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    // 构建参数，不使用 --force
    let hide_args_no_force = HideArgs {
        image: image_path.clone(),
        secret: secret_path.clone(),
        dest: Some(dest_path.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    };

    // 执行并断言操作会失败
    let result = handle_hide(hide_args_no_force);
    assert!(
        result.is_err(),
        "Execution should fail without --force when file exists."
    );
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    // 构建参数，这次使用 --force
    let hide_args_with_force = HideArgs {
        image: image_path.clone(),
        secret: secret_path.clone(),
        dest: Some(dest_path.clone()),
        bits: "0".parse().unwrap(),
        force: true,
    };

    // 执行并断言操作会成功
    let result = handle_hide(hide_args_with_force);
    assert!(
        result.is_ok(),
        "Execution should succeed with --force when file exists."
    );

    // 验证文件确实被覆盖（内容不再是 "this is a dummy file..."）
    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    Ok(())
}

/// 验证取回时的覆盖保护：目标目录已有同名文件时必须显式指定 --force
#[test]
fn test_recover_overwrite_protection() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let stego_path = dir.path().join("stego.png");
    let secret_path = dir.path().join("data.txt");
    let out_dir = dir.path().join("out");

    create_test_image(&image_path, 64, 64);
    fs::create_dir(&out_dir)?;
    fs::write(&secret_path, "fresh content")?;

    handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        dest: Some(stego_path.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    })?;

    // 2. 目标目录里预先放一个同名文件
    fs::write(out_dir.join("data.txt"), "stale content")?;

    let result = handle_recover(RecoverArgs {
        image: stego_path.clone(),
        out_dir: Some(out_dir.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    });
    assert!(result.is_err(), "Recover should refuse to overwrite.");
    assert_eq!(fs::read_to_string(out_dir.join("data.txt"))?, "stale content");

    // 3. 使用 --force 后成功覆盖
    handle_recover(RecoverArgs {
        image: stego_path,
        out_dir: Some(out_dir.clone()),
        bits: "0".parse().unwrap(),
        force: true,
    })?;
    assert_eq!(fs::read_to_string(out_dir.join("data.txt"))?, "fresh content");

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_hide_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.png");
    let secret_path = dir.path().join("large.bin");
    let dest_path = dir.path().join("dest.png");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个远超容量的秘密文件
    let large_secret = vec![0xA5u8; 5000];
    fs::write(&secret_path, large_secret)?;

    // 2. 执行并断言错误
    let hide_args = HideArgs {
        image: image_path,
        secret: secret_path,
        dest: Some(dest_path.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    };
    let result = handle_hide(hide_args);

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("does not fit"));
    }
    assert!(!dest_path.exists(), "No output should be written on failure.");

    Ok(())
}

/// 验证从没有隐藏数据的图像取回时报告"没有秘密"且不创建任何文件
#[test]
fn test_recover_from_clean_image_finds_nothing() -> anyhow::Result<()> {
    // 1. 准备环境: 纯白图像的启用位内容是确定的, 必然不含有效封装
    let dir = tempdir()?;
    let image_path = dir.path().join("clean.png");
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir)?;

    let white = ImageBuffer::from_pixel(32, 32, Rgb([0xFFu8, 0xFF, 0xFF]));
    white.save(&image_path)?;

    // 2. 执行并断言错误
    let result = handle_recover(RecoverArgs {
        image: image_path,
        out_dir: Some(out_dir.clone()),
        bits: "0".parse().unwrap(),
        force: false,
    });

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("does not appear to contain"));
    }
    assert!(
        fs::read_dir(&out_dir)?.next().is_none(),
        "No file should be created when there is no secret."
    );

    Ok(())
}

/// 验证嵌入与取回的掩码不一致时不会得到原始内容
#[test]
fn test_recover_with_wrong_mask_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("image.png");
    let stego_path = dir.path().join("stego.png");
    let secret_path = dir.path().join("secret.txt");
    let out_dir = dir.path().join("out");

    create_test_image(&image_path, 64, 64);
    fs::create_dir(&out_dir)?;
    fs::write(&secret_path, "mask sensitive")?;

    handle_hide(HideArgs {
        image: image_path,
        secret: secret_path,
        dest: Some(stego_path.clone()),
        bits: "0,2".parse().unwrap(),
        force: false,
    })?;

    let result = handle_recover(RecoverArgs {
        image: stego_path,
        out_dir: Some(out_dir.clone()),
        bits: "7".parse().unwrap(),
        force: false,
    });
    // 错误掩码下对齐被破坏, 正确内容不可能被恢复出来
    assert!(
        result.is_err() || !out_dir.join("secret.txt").exists()
            || fs::read_to_string(out_dir.join("secret.txt"))? != "mask sensitive"
    );

    Ok(())
}
