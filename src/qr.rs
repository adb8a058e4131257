use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};

use crate::codec::AvatarCodec;
use crate::model::Avatar;
use crate::{AvatarError, Result};

const LOG_PREFIX: &str = "[qr]";

pub const DEFAULT_QR_SIZE: u32 = 512;
/// Light border required around the symbol by the QR standard.
pub const QUIET_ZONE_MODULES: u32 = 4;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Turns payload text into QR images and finds payloads in images.
#[derive(Clone, Copy, Debug)]
pub struct QrAdapter {
    codec: AvatarCodec,
}

impl QrAdapter {
    pub fn new(codec: AvatarCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &AvatarCodec {
        &self.codec
    }

    /// Draw `text` as a `size`x`size` QR symbol at the highest error
    /// correction level.
    pub fn render(&self, text: &str, size: u32) -> Result<GrayImage> {
        let code = symbol(text)?;
        let width = code.width() as u32;
        let modules = width + 2 * QUIET_ZONE_MODULES;
        if size < modules {
            return Err(AvatarError::Render(format!(
                "{}px is too small for a symbol of {} modules",
                size, modules
            )));
        }

        let colors = code.to_colors();
        let image = GrayImage::from_fn(size, size, |x, y| {
            let mx = x * modules / size;
            let my = y * modules / size;
            if mx < QUIET_ZONE_MODULES
                || my < QUIET_ZONE_MODULES
                || mx >= width + QUIET_ZONE_MODULES
                || my >= width + QUIET_ZONE_MODULES
            {
                return LIGHT;
            }
            let index = ((my - QUIET_ZONE_MODULES) * width
                + (mx - QUIET_ZONE_MODULES)) as usize;
            match colors[index] {
                Color::Dark => DARK,
                Color::Light => LIGHT,
            }
        });

        log::debug!(
            "{} rendered {} bytes as {} modules at {}px",
            LOG_PREFIX,
            text.len(),
            width,
            size
        );
        Ok(image)
    }

    /// Draw `text` with Unicode blocks, two characters per module so the
    /// symbol stays square in a terminal.
    pub fn render_text(&self, text: &str) -> Result<String> {
        let code = symbol(text)?;
        Ok(code
            .render::<char>()
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .dark_color('█')
            .light_color(' ')
            .build())
    }

    /// Look for a QR symbol in `image` and return its text.
    ///
    /// Frames without a readable code are normal while scanning and give
    /// `None`.
    pub fn scan(&self, image: &GrayImage) -> Option<String> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            image.width() as usize,
            image.height() as usize,
            |x, y| image.get_pixel(x as u32, y as u32)[0],
        );
        let grids = prepared.detect_grids();
        if grids.is_empty() {
            return None;
        }

        grids
            .iter()
            .find_map(|grid| match grid.decode() {
                Ok((_, content)) => Some(content),
                Err(err) => {
                    log::debug!("{} undecodable grid: {:?}", LOG_PREFIX, err);
                    None
                }
            })
    }

    pub fn scan_dynamic(&self, image: &DynamicImage) -> Option<String> {
        self.scan(&image.to_luma8())
    }

    /// Encode an avatar and draw it as a QR symbol.
    pub fn render_avatar(
        &self,
        avatar: &Avatar,
        size: u32,
    ) -> Result<GrayImage> {
        self.render(&self.codec.encode(avatar), size)
    }

    /// Render an avatar into an image file, format picked from the
    /// extension.
    pub fn save_avatar(
        &self,
        avatar: &Avatar,
        size: u32,
        path: &Path,
    ) -> Result<()> {
        self.render_avatar(avatar, size)?.save(path)?;
        log::info!("{} saved {} to {}", LOG_PREFIX, avatar.id, path.display());
        Ok(())
    }

    /// Open an image file and look for a code in it.
    pub fn scan_file(&self, path: &Path) -> Result<Option<String>> {
        let image = image::open(path)?;
        Ok(self.scan_dynamic(&image))
    }

    /// Scan an image and decode the avatar it carries.
    ///
    /// `None` when there is no code in the image, `Some(Err(..))` when
    /// there is one but it does not hold a valid avatar.
    pub fn scan_avatar(&self, image: &GrayImage) -> Option<Result<Avatar>> {
        self.scan(image)
            .map(|text| self.codec.decode(&text))
    }
}

impl Default for QrAdapter {
    fn default() -> Self {
        Self::new(AvatarCodec::default())
    }
}

fn symbol(text: &str) -> Result<QrCode> {
    QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H).map_err(
        |err| match err {
            QrError::DataTooLong => AvatarError::Render(format!(
                "{} bytes do not fit in a QR symbol at level H",
                text.len()
            )),
            other => AvatarError::Render(other.to_string()),
        },
    )
}
