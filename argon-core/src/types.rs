//! Core types for Argon
//!
//! These types represent the fundamental data structures used throughout
//! the enumeration and coalescing path.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global handle counter for unique entry IDs
static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of one in-flight enumeration entry
///
/// Eviction from the in-flight registry is keyed by this identity rather
/// than by option equality, so two structurally equal requests from
/// different calls can never evict each other's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

/// Requested thumbnail dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ThumbnailSize {
    /// Create a new thumbnail size
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
        }
    }
}

impl std::fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parameters of one logical enumeration request
///
/// This is the coalescing key: two requests with structurally equal
/// options (field by field, derived equality) share one underlying
/// enumeration while it is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Include individual windows
    pub capture_window: bool,
    /// Include full screens/monitors
    pub capture_screen: bool,
    /// Thumbnail dimensions to produce
    pub thumbnail_size: ThumbnailSize,
    /// Also fetch application icons for window sources
    pub fetch_window_icons: bool,
}

impl SourceOptions {
    /// Options selecting window sources only
    pub fn windows(thumbnail_size: ThumbnailSize) -> Self {
        Self {
            capture_window: true,
            capture_screen: false,
            thumbnail_size,
            fetch_window_icons: false,
        }
    }

    /// Options selecting screen sources only
    pub fn screens(thumbnail_size: ThumbnailSize) -> Self {
        Self {
            capture_window: false,
            capture_screen: true,
            thumbnail_size,
            fetch_window_icons: false,
        }
    }

    /// Options selecting both windows and screens
    pub fn all(thumbnail_size: ThumbnailSize) -> Self {
        Self {
            capture_window: true,
            capture_screen: true,
            thumbnail_size,
            fetch_window_icons: false,
        }
    }

    /// Enable or disable window icon fetching
    pub fn with_window_icons(mut self, fetch: bool) -> Self {
        self.fetch_window_icons = fetch;
        self
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self::all(ThumbnailSize::default())
    }
}

impl std::fmt::Display for SourceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds = match (self.capture_window, self.capture_screen) {
            (true, true) => "windows+screens",
            (true, false) => "windows",
            (false, true) => "screens",
            (false, false) => "none",
        };
        write!(f, "{} @ {}", kinds, self.thumbnail_size)?;
        if self.fetch_window_icons {
            write!(f, " +icons")?;
        }
        Ok(())
    }
}

/// One capturable source as reported by a capture backend
///
/// Thumbnails (and icons, when present) are raw bitmaps here; the
/// session adapter encodes them into transportable strings at
/// settlement time.
#[derive(Debug, Clone)]
pub struct RawSource {
    /// Opaque source identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Thumbnail bitmap
    pub thumbnail: RgbaImage,
    /// Display identifier, for screen sources
    pub display_id: Option<String>,
    /// Application icon bitmap, if the backend had one
    pub app_icon: Option<RgbaImage>,
}

/// One capturable source in transportable form
///
/// `display_id` and `app_icon` serialize as absent fields (not null)
/// when they carry nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Opaque source identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Thumbnail encoded as a transportable string
    pub thumbnail: String,
    /// Display identifier, for screen sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    /// Application icon encoded as a transportable string; present only
    /// if icon fetching was requested and the source carried an icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_icon: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_uniqueness() {
        let a = Handle::new();
        let b = Handle::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_options_structural_equality() {
        let a = SourceOptions::windows(ThumbnailSize::new(150, 150));
        let b = SourceOptions {
            capture_window: true,
            capture_screen: false,
            thumbnail_size: ThumbnailSize::new(150, 150),
            fetch_window_icons: false,
        };
        assert_eq!(a, b);

        let c = b.clone().with_window_icons(true);
        assert_ne!(a, c);
    }

    #[test]
    fn test_entry_optional_fields_absent() {
        let entry = SourceEntry {
            id: "window:1".into(),
            name: "Terminal".into(),
            thumbnail: "data:image/png;base64,".into(),
            display_id: None,
            app_icon: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("display_id"));
        assert!(!json.contains("app_icon"));
    }
}
