// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between image pixel coordinates and screen coordinates
//! for an image drawn scaled and offset inside the canvas.

use crate::models::shape::Point;

/// Placement of an image on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Screen position of the image's top-left corner
    pub origin_x: f64,
    pub origin_y: f64,
    /// Screen pixels per image pixel
    pub scale: f64,
}

impl ViewTransform {
    /// Fit an image into the available area at no more than `display_height`
    /// screen pixels tall, keeping its aspect ratio and centering it.
    pub fn fit(
        image_size: (u32, u32),
        available: (f64, f64),
        offset: (f64, f64),
        display_height: u32,
    ) -> Self {
        let (width, height) = (f64::from(image_size.0.max(1)), f64::from(image_size.1.max(1)));
        let target_height = available.1.min(f64::from(display_height));
        let scale = (target_height / height).min(available.0 / width).max(f64::EPSILON);

        let (display_width, display_height) = (width * scale, height * scale);
        Self {
            origin_x: offset.0 + (available.0 - display_width) / 2.0,
            origin_y: offset.1 + (available.1 - display_height) / 2.0,
            scale,
        }
    }

    /// Convert screen coordinates to image pixel coordinates.
    pub fn to_image(&self, screen_x: f64, screen_y: f64) -> Point {
        Point {
            x: (screen_x - self.origin_x) / self.scale,
            y: (screen_y - self.origin_y) / self.scale,
        }
    }

    /// Convert image pixel coordinates to screen coordinates.
    pub fn to_screen(&self, point: &Point) -> (f64, f64) {
        (
            self.origin_x + point.x * self.scale,
            self.origin_y + point.y * self.scale,
        )
    }
}
