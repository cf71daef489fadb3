//! Bundled collaborator implementations and the plugin carrier struct.

#[cfg(feature = "syntect")]
pub mod syntect;

use crate::adapters::{Fetcher, HighlightAdapter, ImageSender};

/// Collaborators handed to a render call. All optional; renderers degrade
/// per their contracts when one is absent.
#[derive(Default, Clone, Copy)]
pub struct Plugins<'p> {
    /// Code block syntax highlighting.
    pub highlighter: Option<&'p dyn HighlightAdapter>,
    /// Inline terminal image drawing (console renderer only).
    pub image_sender: Option<&'p dyn ImageSender>,
    /// Remote image bytes (console renderer only).
    pub fetcher: Option<&'p dyn Fetcher>,
}

impl std::fmt::Debug for Plugins<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("highlighter", &self.highlighter.is_some())
            .field("image_sender", &self.image_sender.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .finish()
    }
}
