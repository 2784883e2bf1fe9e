use docchat_core::core::PreviewId;

use crate::events::KittyImageData;

/// Decoded image for the preview handle currently shown.
///
/// Only results for the tracked handle are accepted; anything else belongs
/// to a preview that has already been superseded.
#[derive(Debug, Default)]
pub struct PreviewPane {
    tracked: Option<PreviewId>,
    image: Option<KittyImageData>,
    error: Option<String>,
}

impl PreviewPane {
    pub fn tracked(&self) -> Option<PreviewId> {
        self.tracked
    }

    pub fn image(&self) -> Option<&KittyImageData> {
        self.image.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switches to a new handle, dropping decoded data. Returns whether the
    /// handle changed.
    pub fn track(&mut self, id: Option<PreviewId>) -> bool {
        if self.tracked == id {
            return false;
        }
        self.tracked = id;
        self.image = None;
        self.error = None;
        true
    }

    /// Stores a decode result. Returns `false` if `id` is not tracked.
    pub fn set_decoded(&mut self, id: PreviewId, result: Result<KittyImageData, String>) -> bool {
        if self.tracked != Some(id) {
            return false;
        }
        match result {
            Ok(image) => {
                self.image = Some(image);
                self.error = None;
            }
            Err(error) => {
                self.image = None;
                self.error = Some(error);
            }
        }
        true
    }
}
