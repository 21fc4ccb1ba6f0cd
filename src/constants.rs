/// 每个颜色通道的位数。
/// 像素的 R、G、B 通道各占 8 bits，隐写时在其中选取若干位置写入数据。
pub const NUM_BITS: usize = 8;

/// 每个像素参与隐写的颜色通道数 (R、G、B)。
/// Alpha 通道不参与隐写，载体图像统一按 RGB 处理。
pub const NUM_CHANNELS: usize = 3;

/// 'hide' 命令未指定输出路径时使用的默认文件名。
/// 结果图像将以该名称保存在载体图像所在的目录下。
pub const DEFAULT_STEGO_NAME: &str = "secret.bmp";
