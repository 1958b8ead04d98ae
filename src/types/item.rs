use base64::{engine::general_purpose::STANDARD, Engine};

/// One submitted image, already pre-processed upstream.
///
/// The item's 0-based global index is positional: it is derived from
/// the chunk's `base_index` plus the item's offset, so it is never
/// stored here (one source of truth, see [`crate::splitter::Chunk`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem {
    /// Base64-encoded image content.
    pub encoded_payload: String,
    /// Declared mime type, e.g. `image/jpeg`.
    pub payload_kind: String,
    /// Original file name, echoed into the produced metadata.
    pub display_name: String,
}

impl InputItem {
    pub fn new(
        encoded_payload: impl Into<String>,
        payload_kind: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            encoded_payload: encoded_payload.into(),
            payload_kind: payload_kind.into(),
            display_name: display_name.into(),
        }
    }

    /// Encode raw image bytes into an item.
    pub fn from_bytes(
        bytes: &[u8],
        payload_kind: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self::new(STANDARD.encode(bytes), payload_kind, display_name)
    }
}
