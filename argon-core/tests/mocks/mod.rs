//! Mock infrastructure for testing
//!
//! Provides a recording capture backend and raw-source helpers so tests
//! can drive terminal signals directly.

#![allow(dead_code)]

use argon_core::capture::{CaptureBackend, CaptureSession};
use argon_core::types::{RawSource, SourceOptions, ThumbnailSize};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use std::sync::Arc;

/// Capture backend that records every started enumeration
///
/// It never signals on its own; tests fire `finished`/`failed` on the
/// recorded sessions themselves.
pub struct MockBackend {
    started: Mutex<Vec<(SourceOptions, Arc<CaptureSession>)>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Mutex::new(Vec::new()),
        })
    }

    /// Number of enumerations the coalescer started on this backend
    pub fn started_count(&self) -> usize {
        self.started.lock().len()
    }

    /// Session of the `index`-th started enumeration
    pub fn session(&self, index: usize) -> Arc<CaptureSession> {
        Arc::clone(&self.started.lock()[index].1)
    }

    /// Session of the most recently started enumeration
    pub fn last_session(&self) -> Arc<CaptureSession> {
        let started = self.started.lock();
        Arc::clone(&started.last().expect("no enumeration started").1)
    }

    /// Options of the most recently started enumeration
    pub fn last_options(&self) -> SourceOptions {
        let started = self.started.lock();
        started.last().expect("no enumeration started").0.clone()
    }
}

impl CaptureBackend for MockBackend {
    fn start_enumeration(&self, options: SourceOptions, session: Arc<CaptureSession>) {
        self.started.lock().push((options, session));
    }
}

/// Options used by most tests: windows only, 150x150, no icons
pub fn test_options() -> SourceOptions {
    SourceOptions {
        capture_window: true,
        capture_screen: false,
        thumbnail_size: ThumbnailSize::new(150, 150),
        fetch_window_icons: false,
    }
}

/// Create a solid-color test bitmap
pub fn test_thumbnail(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Create a raw source with an 8x8 thumbnail and an optional 4x4 icon
pub fn raw_source(id: &str, name: &str, with_icon: bool) -> RawSource {
    RawSource {
        id: id.to_string(),
        name: name.to_string(),
        thumbnail: test_thumbnail(8, 8, [0, 128, 255, 255]),
        display_id: None,
        app_icon: with_icon.then(|| test_thumbnail(4, 4, [255, 255, 0, 255])),
    }
}
