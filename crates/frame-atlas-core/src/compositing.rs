use crate::error::{AtlasError, Result};
use crate::model::{Frame, Rect};
use image::RgbaImage;

/// Copy `frame` into `canvas` with its top-left at `dest`, optionally rotated
/// 90° clockwise. Pixels are overwritten, never blended.
///
/// `dest` must lie inside the canvas and match the frame size (swapped when
/// rotated); anything else is reported as a consistency error instead of
/// being clipped.
pub fn blit_frame(frame: &Frame, canvas: &mut RgbaImage, dest: &Rect, rotated: bool) -> Result<()> {
    let (cw, ch) = canvas.dimensions();
    if dest.x as u64 + dest.w as u64 > cw as u64 || dest.y as u64 + dest.h as u64 > ch as u64 {
        return Err(AtlasError::Consistency(format!(
            "rect {:?} for '{}' exceeds sheet bounds {}x{}",
            dest, frame.id, cw, ch
        )));
    }
    let (sw, sh) = (frame.width, frame.height);
    let (rw, rh) = if rotated { (sh, sw) } else { (sw, sh) };
    if dest.w != rw || dest.h != rh {
        return Err(AtlasError::Consistency(format!(
            "rect {}x{} for '{}' does not match frame size {}x{}",
            dest.w, dest.h, frame.id, rw, rh
        )));
    }

    let stride = cw as usize * 4;
    let buf: &mut [u8] = canvas;
    if !rotated {
        let row_len = sw as usize * 4;
        for yy in 0..sh as usize {
            let src = &frame.pixels[yy * row_len..(yy + 1) * row_len];
            let off = (dest.y as usize + yy) * stride + dest.x as usize * 4;
            buf[off..off + row_len].copy_from_slice(src);
        }
        return Ok(());
    }

    for yy in 0..rh as usize {
        for xx in 0..rw as usize {
            let (ix, iy) = (yy, sh as usize - 1 - xx);
            let s = (iy * sw as usize + ix) * 4;
            let d = (dest.y as usize + yy) * stride + (dest.x as usize + xx) * 4;
            buf[d..d + 4].copy_from_slice(&frame.pixels[s..s + 4]);
        }
    }
    Ok(())
}
