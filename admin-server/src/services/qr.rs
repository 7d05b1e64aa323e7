//! QR Code Generation Service
//!
//! Encodes a URL at error-correction level H (~30% redundancy) so a
//! centered logo overlay stays scannable, then resizes to the requested
//! pixel size. Logo failures always fall back to the plain QR code.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use qrcode::{EcLevel, QrCode};
use serde::Serialize;

use crate::utils::{AppError, AppResult, time};

/// 默认输出尺寸 (像素)
pub const DEFAULT_QR_SIZE: u32 = 1024;
/// 每个模块渲染的像素数 (缩放前)
const MODULE_PIXELS: u32 = 10;
/// logo 最大宽度 = QR 宽度 / 4
const LOGO_MAX_DIVISOR: u32 = 4;
/// logo 白色衬底的边距 (像素)
const LOGO_PADDING: u32 = 10;

/// `generate_and_save` 的结果 — 错误也被折叠进来，不向外抛
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct QrService {
    output_dir: PathBuf,
}

impl QrService {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 生成 QR 图像；`logo_path` 存在时居中合成 logo
    pub fn generate(
        &self,
        data: &str,
        logo_path: Option<&Path>,
        size: u32,
    ) -> AppResult<RgbaImage> {
        let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
            .map_err(|e| AppError::internal(format!("QR encoding failed: {}", e)))?;

        let modules = code
            .render::<image::Luma<u8>>()
            .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
            .build();

        let mut qr = DynamicImage::ImageLuma8(modules)
            .resize_exact(size, size, imageops::FilterType::Lanczos3)
            .to_rgba8();

        if let Some(logo_path) = logo_path
            && logo_path.exists()
        {
            qr = overlay_logo(qr, logo_path);
        }

        Ok(qr)
    }

    /// 生成并保存 PNG，文件名带时间戳
    ///
    /// 任何错误都折叠为 `{success:false, message}` — QR 是增值功能，
    /// 不允许让请求处理崩掉。
    pub fn generate_and_save(
        &self,
        data: &str,
        store_id: &str,
        logo_path: Option<&Path>,
        size: u32,
    ) -> QrOutcome {
        match self.try_generate_and_save(data, store_id, logo_path, size) {
            Ok((filepath, url)) => QrOutcome {
                success: true,
                filepath: Some(filepath),
                url: Some(url),
                message: "QR code generated".to_string(),
            },
            Err(e) => {
                tracing::error!(store_id = %store_id, error = %e, "QR code generation failed");
                QrOutcome {
                    success: false,
                    filepath: None,
                    url: None,
                    message: format!("QR code generation failed: {}", e),
                }
            }
        }
    }

    fn try_generate_and_save(
        &self,
        data: &str,
        store_id: &str,
        logo_path: Option<&Path>,
        size: u32,
    ) -> AppResult<(String, String)> {
        let image = self.generate(data, logo_path, size)?;

        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AppError::storage(format!("Failed to create QR directory: {}", e)))?;

        let filename = format!("qr_code_{}_{}.png", store_id, time::timestamp_slug());
        let path = self.output_dir.join(&filename);
        image
            .save(&path)
            .map_err(|e| AppError::internal(format!("Failed to save QR image: {}", e)))?;

        let filepath = path.to_string_lossy().replace('\\', "/");
        let url = if filepath.starts_with('/') {
            filepath.clone()
        } else {
            format!("/{}", filepath)
        };
        Ok((filepath, url))
    }
}

/// 居中合成 logo: 等比缩到 ≤ QR 宽度的 1/4，垫白色衬底提高对比度。
/// 打不开 logo 时静默回退到纯 QR。
fn overlay_logo(mut qr: RgbaImage, logo_path: &Path) -> RgbaImage {
    let logo = match image::open(logo_path) {
        Ok(logo) => logo,
        Err(e) => {
            tracing::warn!(path = %logo_path.display(), error = %e, "Failed to open logo, using plain QR");
            return qr;
        }
    };

    let max_side = qr.width() / LOGO_MAX_DIVISOR;
    let logo = logo.thumbnail(max_side, max_side).to_rgba8();

    let tile_width = logo.width() + LOGO_PADDING * 2;
    let tile_height = logo.height() + LOGO_PADDING * 2;
    if tile_width >= qr.width() || tile_height >= qr.height() {
        tracing::warn!("Logo tile does not fit into the QR image, using plain QR");
        return qr;
    }

    let mut tile = RgbaImage::from_pixel(tile_width, tile_height, Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut tile, &logo, LOGO_PADDING as i64, LOGO_PADDING as i64);

    let x = ((qr.width() - tile_width) / 2) as i64;
    let y = ((qr.height() - tile_height) / 2) as i64;
    imageops::overlay(&mut qr, &tile, x, y);
    qr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_pixel_size() {
        let dir = tempfile::tempdir().unwrap();
        let service = QrService::new(dir.path());
        let img = service
            .generate("https://example.com/store_1", None, 512)
            .unwrap();
        assert_eq!((img.width(), img.height()), (512, 512));
    }

    #[test]
    fn missing_logo_falls_back_to_plain_qr() {
        let dir = tempfile::tempdir().unwrap();
        let service = QrService::new(dir.path());
        let plain = service.generate("https://example.com", None, 256).unwrap();
        let with_missing_logo = service
            .generate(
                "https://example.com",
                Some(Path::new("does/not/exist.png")),
                256,
            )
            .unwrap();
        assert_eq!(plain.as_raw(), with_missing_logo.as_raw());
    }

    #[test]
    fn logo_is_composited_onto_white_tile() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        let logo = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 255]));
        logo.save(&logo_path).unwrap();

        let service = QrService::new(dir.path());
        let img = service
            .generate("https://example.com", Some(&logo_path), 1024)
            .unwrap();

        // 中心像素来自 logo
        let center = img.get_pixel(512, 512);
        assert_eq!(center.0[..3], [10, 20, 30]);
    }

    #[test]
    fn generate_and_save_writes_png_and_reports_paths() {
        let dir = tempfile::tempdir().unwrap();
        let service = QrService::new(dir.path().join("qrcodes"));
        let outcome =
            service.generate_and_save("https://example.com/s1", "store_1", None, DEFAULT_QR_SIZE);

        assert!(outcome.success, "{}", outcome.message);
        let filepath = outcome.filepath.unwrap();
        assert!(filepath.contains("qr_code_store_1_"));
        assert!(std::path::Path::new(&filepath).exists());
        assert!(outcome.url.unwrap().starts_with('/'));
    }

    #[test]
    fn broken_output_dir_folds_into_failure_outcome() {
        let dir = tempfile::tempdir().unwrap();
        // 把输出目录路径占成一个普通文件
        let blocked = dir.path().join("blocked");
        std::fs::write(&blocked, b"not a dir").unwrap();

        let service = QrService::new(&blocked);
        let outcome = service.generate_and_save("https://example.com", "s", None, 128);
        assert!(!outcome.success);
        assert!(outcome.filepath.is_none());
    }
}
