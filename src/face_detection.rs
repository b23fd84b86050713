use crate::{
    constants::{
        EYE_MIN_NEIGHBORS, EYE_MIN_SIZE, EYE_SCALE_FACTOR, FACE_MIN_NEIGHBORS, FACE_MIN_SIZE, FACE_SCALE_FACTOR,
    },
    Error, Result,
};
use log::{debug, info};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::Path;

/// Source of candidate face regions for a frame
pub trait CandidateDetector {
    /// Detect candidate faces in a BGR frame
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying detector fails
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>>;
}

/// Tunable parameters of the cascade detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Image pyramid scale step for the face cascade
    pub scale_factor: f64,
    /// Minimum neighbor count for a face to be kept
    pub min_neighbors: i32,
    /// Smallest face side length (pixels)
    pub min_face_size: i32,
    /// Image pyramid scale step for the eye cascade
    pub eye_scale_factor: f64,
    /// Minimum neighbor count for an eye to be kept
    pub eye_min_neighbors: i32,
    /// Smallest eye side length (pixels)
    pub min_eye_size: i32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: FACE_SCALE_FACTOR,
            min_neighbors: FACE_MIN_NEIGHBORS,
            min_face_size: FACE_MIN_SIZE,
            eye_scale_factor: EYE_SCALE_FACTOR,
            eye_min_neighbors: EYE_MIN_NEIGHBORS,
            min_eye_size: EYE_MIN_SIZE,
        }
    }
}

/// Face and eye cascades, loaded once at startup
pub struct CascadeModels {
    face: CascadeClassifier,
    eye: CascadeClassifier,
}

impl CascadeModels {
    /// Load both cascades from XML files
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or does not hold a cascade
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(face_path: P, eye_path: Q) -> Result<Self> {
        let face = load_cascade(face_path.as_ref())?;
        let eye = load_cascade(eye_path.as_ref())?;
        Ok(Self { face, eye })
    }
}

fn load_cascade(path: &Path) -> Result<CascadeClassifier> {
    if !path.exists() {
        return Err(Error::Classifier(format!("Cascade file not found: {}", path.display())));
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| Error::Classifier(format!("Cascade path is not valid UTF-8: {}", path.display())))?;

    let classifier = CascadeClassifier::new(path_str)?;
    if classifier.empty()? {
        return Err(Error::Classifier(format!("Failed to load cascade: {}", path.display())));
    }

    info!("Loaded cascade {}", path.display());
    Ok(classifier)
}

/// Haar cascade face detector that keeps only faces containing an eye
pub struct CascadeFaceDetector {
    models: CascadeModels,
    params: DetectionParams,
}

impl CascadeFaceDetector {
    /// Create a detector from loaded models
    #[must_use]
    pub const fn new(models: CascadeModels, params: DetectionParams) -> Self {
        Self { models, params }
    }

    fn has_eye(&mut self, gray: &Mat, face: Rect) -> Result<bool> {
        let face_roi = Mat::roi(gray, face)?;
        let face_roi_mat = face_roi.try_clone()?;

        let mut eyes = Vector::<Rect>::new();
        self.models.eye.detect_multi_scale(
            &face_roi_mat,
            &mut eyes,
            self.params.eye_scale_factor,
            self.params.eye_min_neighbors,
            0,
            Size::new(self.params.min_eye_size, self.params.min_eye_size),
            Size::new(0, 0),
        )?;

        Ok(!eyes.is_empty())
    }
}

impl CandidateDetector for CascadeFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Vec<Rect>> {
        if frame.empty() {
            return Ok(Vec::new());
        }

        let mut gray = Mat::default();
        imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;

        let mut faces = Vector::<Rect>::new();
        self.models.face.detect_multi_scale(
            &gray,
            &mut faces,
            self.params.scale_factor,
            self.params.min_neighbors,
            0,
            Size::new(self.params.min_face_size, self.params.min_face_size),
            Size::new(0, 0),
        )?;

        let bounds = Rect::new(0, 0, gray.cols(), gray.rows());
        let mut candidates = Vec::with_capacity(faces.len());

        for face in faces {
            let face = clip_to_frame(face, bounds);
            if face.width <= 0 || face.height <= 0 {
                continue;
            }
            if self.has_eye(&gray, face)? {
                candidates.push(face);
            }
        }

        debug!("{} face(s) confirmed by eye detection", candidates.len());
        Ok(candidates)
    }
}

/// Restrict a region to the frame so it can be used as a crop
#[must_use]
pub fn clip_to_frame(region: Rect, bounds: Rect) -> Rect {
    let x1 = region.x.max(bounds.x);
    let y1 = region.y.max(bounds.y);
    let x2 = (region.x + region.width).min(bounds.x + bounds.width);
    let y2 = (region.y + region.height).min(bounds.y + bounds.height);
    Rect::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
}
