use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageFormat, imageops::FilterType};
use rand::RngCore;

use crate::application::ports::image_store::ImageStore;

/// Profile pictures are constrained to a small square thumbnail.
const PROFILE_BOUNDS: (u32, u32) = (125, 125);
/// Post pictures keep enough resolution for an article body.
const POST_BOUNDS: (u32, u32) = (480, 600);

const PROFILE_SUBDIR: &str = "profile_pics";
const POST_SUBDIR: &str = "post_pics";

/// Filename linked for accounts that never uploaded a picture.
const DEFAULT_AVATAR: &str = "default.jpg";

/// Resizes uploads and writes them under the uploads root with randomized
/// filenames, preserving the original extension.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(PROFILE_SUBDIR))?;
        std::fs::create_dir_all(root.join(POST_SUBDIR))?;
        let store = Self { root };
        store.ensure_default_avatar()?;
        Ok(store)
    }

    /// Accounts link `/static/profile_pics/default.jpg` until they upload a
    /// picture; write a placeholder there on first start so the URL resolves.
    fn ensure_default_avatar(&self) -> anyhow::Result<()> {
        let path = self.root.join(PROFILE_SUBDIR).join(DEFAULT_AVATAR);
        if path.exists() {
            return Ok(());
        }
        let (w, h) = PROFILE_BOUNDS;
        let placeholder = image::RgbImage::from_pixel(w, h, image::Rgb([206, 212, 218]));
        DynamicImage::ImageRgb8(placeholder).save_with_format(&path, ImageFormat::Jpeg)?;
        Ok(())
    }

    async fn store(
        &self,
        subdir: &str,
        bounds: (u32, u32),
        bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String> {
        let filename = random_filename(original_filename);
        let path = self.root.join(subdir).join(&filename);
        let target = path.clone();
        // Decode/resize/encode are CPU-bound; keep them off the async runtime.
        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let img = image::load_from_memory(&bytes)?;
            let resized = fit_within(&img, bounds.0, bounds.1);
            save_as(&resized, &target)
        })
        .await??;
        Ok(filename)
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store_profile_image(
        &self,
        bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String> {
        self.store(PROFILE_SUBDIR, PROFILE_BOUNDS, bytes, original_filename)
            .await
    }

    async fn store_post_image(
        &self,
        bytes: Vec<u8>,
        original_filename: Option<&str>,
    ) -> anyhow::Result<String> {
        self.store(POST_SUBDIR, POST_BOUNDS, bytes, original_filename)
            .await
    }
}

/// 8 random bytes, hex-encoded, plus the sanitized original extension
/// (`jpg` when the upload had none).
fn random_filename(original: Option<&str>) -> String {
    let mut raw = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut raw);
    let hex = raw.iter().fold(String::with_capacity(16), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    });
    let ext = original
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    format!("{hex}.{ext}")
}

/// Scale down to fit `max_w` x `max_h`, preserving aspect ratio and never
/// upscaling.
fn fit_within(img: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let ratio = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    if ratio >= 1.0 {
        return img.clone();
    }
    let new_w = ((w as f32 * ratio) as u32).max(1);
    let new_h = ((h as f32 * ratio) as u32).max(1);
    img.resize(new_w, new_h, FilterType::Lanczos3)
}

fn save_as(img: &DynamicImage, path: &Path) -> anyhow::Result<()> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Jpeg);
    // JPEG has no alpha channel; flatten before encoding.
    if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, format)?;
    } else {
        img.save_with_format(path, format)?;
    }
    Ok(())
}
