//! Mock indicator panel for testing

use std::vec::Vec;

use crate::platform::traits::{LedImage, LedPanelInterface};

/// Mock panel that records every applied image
#[derive(Debug, Default)]
pub struct MockPanel {
    history: Vec<LedImage>,
}

impl MockPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently applied image
    pub fn current(&self) -> LedImage {
        self.history.last().copied().unwrap_or_default()
    }

    /// Every applied image, oldest first
    pub fn history(&self) -> &[LedImage] {
        &self.history
    }
}

impl LedPanelInterface for MockPanel {
    fn apply(&mut self, image: LedImage) {
        self.history.push(image);
    }
}
