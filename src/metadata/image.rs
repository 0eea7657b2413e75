// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image dimensions

use std::path::Path;
use tracing::debug;

/// Read `(width, height)` from the image header without decoding pixels
pub fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            debug!("No image dimensions for {:?}: {}", path, e);
            None
        }
    }
}
