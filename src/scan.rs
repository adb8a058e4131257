use image::GrayImage;

use crate::model::Avatar;
use crate::qr::QrAdapter;
use crate::AvatarError;

/// Result of offering one camera frame to a [`ScanSession`].
#[derive(Debug)]
pub enum ScanOutcome {
    /// The session already delivered an avatar and waits for `resume`.
    Paused,
    /// No readable code in the frame.
    NotFound,
    /// A code was read but does not hold a valid avatar. Reported once per
    /// distinct payload while the camera stays on the same code.
    Rejected(AvatarError),
    /// The same invalid code as the previous frame.
    AlreadyRejected,
    Decoded(Avatar),
}

/// Turns a stream of frames into at most one decoded avatar.
///
/// After a successful decode the session pauses, so the caller is not
/// flooded with the same code seen in consecutive frames.
pub struct ScanSession {
    qr: QrAdapter,
    active: bool,
    last_rejected: Option<String>,
}

impl ScanSession {
    pub fn new(qr: QrAdapter) -> Self {
        Self {
            qr,
            active: true,
            last_rejected: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn offer(&mut self, frame: &GrayImage) -> ScanOutcome {
        if !self.active {
            return ScanOutcome::Paused;
        }

        let text = match self.qr.scan(frame) {
            Some(text) => text,
            None => return ScanOutcome::NotFound,
        };
        if self.last_rejected.as_deref() == Some(text.as_str()) {
            return ScanOutcome::AlreadyRejected;
        }

        match self.qr.codec().decode(&text) {
            Ok(avatar) => {
                log::info!("[scan] decoded avatar `{}`", avatar.name);
                self.active = false;
                self.last_rejected = None;
                ScanOutcome::Decoded(avatar)
            }
            Err(err) => {
                log::warn!("[scan] rejected code: {}", err);
                self.last_rejected = Some(text);
                ScanOutcome::Rejected(err)
            }
        }
    }

    /// Start accepting frames again.
    pub fn resume(&mut self) {
        self.active = true;
        self.last_rejected = None;
    }
}
