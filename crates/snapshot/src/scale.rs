use crate::model::ScaleMode;

use image::{
	imageops::{self, FilterType},
	Rgb, RgbImage,
};

const LETTERBOX_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Where an aspect-preserved picture lands inside the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

/// Fits `source` inside `target` without distortion, centered on the free axis.
///
/// Wider sources fit to the target width, everything else to the target height. The
/// computed side is truncated, then kept within `1..=target`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_dimensions(source: (u32, u32), target: (u32, u32)) -> Placement {
	let (source_width, source_height) = source;
	let (target_width, target_height) = target;

	if source_width == 0 || source_height == 0 {
		return Placement {
			x: 0,
			y: 0,
			width: target_width,
			height: target_height,
		};
	}

	let source_aspect = f64::from(source_width) / f64::from(source_height);
	let target_aspect = f64::from(target_width) / f64::from(target_height);

	if source_aspect > target_aspect {
		let height = ((f64::from(target_width) / source_aspect) as u32).clamp(1, target_height);
		Placement {
			x: 0,
			y: (target_height - height) / 2,
			width: target_width,
			height,
		}
	} else {
		let width = ((f64::from(target_height) * source_aspect) as u32).clamp(1, target_width);
		Placement {
			x: (target_width - width) / 2,
			y: 0,
			width,
			height: target_height,
		}
	}
}

/// Resamples a decoded frame to the requested size.
pub fn scale_frame(frame: &RgbImage, width: u32, height: u32, mode: ScaleMode) -> RgbImage {
	match mode {
		ScaleMode::Stretch => imageops::resize(frame, width, height, FilterType::Triangle),
		ScaleMode::Fit => {
			let placement = fit_dimensions(frame.dimensions(), (width, height));
			imageops::resize(
				frame,
				placement.width,
				placement.height,
				FilterType::Triangle,
			)
		}
		ScaleMode::Letterbox => {
			let placement = fit_dimensions(frame.dimensions(), (width, height));
			let fitted = imageops::resize(
				frame,
				placement.width,
				placement.height,
				FilterType::Triangle,
			);

			let mut canvas = RgbImage::from_pixel(width, height, LETTERBOX_COLOR);
			imageops::overlay(
				&mut canvas,
				&fitted,
				i64::from(placement.x),
				i64::from(placement.y),
			);
			canvas
		}
	}
}
