/// 平均哈希
pub mod hashing;
/// 健康检查
pub mod health;
/// 照片上传与风格化
pub mod photo;
/// 目录布局、原子写入与 JPEG 编解码
pub mod storage;
/// 风格参考图上传
pub mod style;
/// 风格化例程与内置滤镜
pub mod stylize;
/// multipart 上传校验
pub mod upload;
