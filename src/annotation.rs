//! Drawing of detection boxes on frames.

use crate::{
    constants::{FACE_RECT_COLOR, RECT_THICKNESS, TARGET_RECT_COLOR},
    Result,
};
use opencv::{
    core::{Mat, Rect, Scalar},
    imgproc::{self, LINE_8},
};

/// Colors and line width used for annotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    /// Color of every candidate box (BGR)
    pub face_color: [u8; 3],
    /// Color of the selected target box (BGR)
    pub target_color: [u8; 3],
    /// Line thickness in pixels
    pub thickness: i32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            face_color: FACE_RECT_COLOR,
            target_color: TARGET_RECT_COLOR,
            thickness: RECT_THICKNESS,
        }
    }
}

fn bgr(color: [u8; 3]) -> Scalar {
    Scalar::new(f64::from(color[0]), f64::from(color[1]), f64::from(color[2]), 0.0)
}

/// Draw all candidates, then the target on top in its own color
///
/// # Errors
///
/// Returns an error if drawing fails
pub fn annotate_frame(frame: &mut Mat, candidates: &[Rect], target: Option<Rect>, style: &AnnotationStyle) -> Result<()> {
    for candidate in candidates {
        imgproc::rectangle(frame, *candidate, bgr(style.face_color), style.thickness, LINE_8, 0)?;
    }

    if let Some(target) = target {
        imgproc::rectangle(frame, target, bgr(style.target_color), style.thickness, LINE_8, 0)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::{core::Vec3b, prelude::*};

    fn blank() -> Mat {
        Mat::zeros(120, 120, opencv::core::CV_8UC3).unwrap().to_mat().unwrap()
    }

    fn pixel(frame: &Mat, x: i32, y: i32) -> [u8; 3] {
        let px = frame.at_2d::<Vec3b>(y, x).unwrap();
        [px[0], px[1], px[2]]
    }

    #[test]
    fn test_candidates_and_target_colors() {
        let mut frame = blank();
        let small = Rect::new(10, 10, 20, 20);
        let large = Rect::new(50, 50, 40, 40);

        annotate_frame(&mut frame, &[small, large], Some(large), &AnnotationStyle::default()).unwrap();

        assert_eq!(pixel(&frame, 10, 15), FACE_RECT_COLOR);
        assert_eq!(pixel(&frame, 50, 70), TARGET_RECT_COLOR);
        // Interior untouched
        assert_eq!(pixel(&frame, 70, 70), [0, 0, 0]);
    }

    #[test]
    fn test_no_target_still_draws_candidates() {
        let mut frame = blank();
        let candidate = Rect::new(20, 20, 30, 30);

        annotate_frame(&mut frame, &[candidate], None, &AnnotationStyle::default()).unwrap();

        assert_eq!(pixel(&frame, 20, 30), FACE_RECT_COLOR);
    }

    #[test]
    fn test_empty_frame_annotation_is_noop() {
        let mut frame = blank();
        annotate_frame(&mut frame, &[], None, &AnnotationStyle::default()).unwrap();
        let total = opencv::core::sum_elems(&frame).unwrap();
        assert_eq!(total, Scalar::all(0.0));
    }
}
