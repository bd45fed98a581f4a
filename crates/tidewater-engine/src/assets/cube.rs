use std::path::{Path, PathBuf};

use crate::error::EngineError;

use super::ImageData;

/// File names of the six faces, in layer order.
pub const CUBE_FACE_FILES: [&str; 6] = [
    "skybox1.jpg",
    "skybox2.jpg",
    "skybox3.jpg",
    "skybox4.jpg",
    "skybox5.jpg",
    "skybox6.jpg",
];

/// Cube-map face. The discriminant is the texture array layer the GPU samples
/// for that direction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CubeFace {
    PositiveX = 0,
    NegativeX = 1,
    PositiveY = 2,
    NegativeY = 3,
    PositiveZ = 4,
    NegativeZ = 5,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    pub fn layer(self) -> u32 {
        self as u32
    }
}

/// Six validated faces: square, all the same size, in `CubeFace` order.
#[derive(Debug, Clone)]
pub struct CubeFaces {
    faces: [ImageData; 6],
}

impl CubeFaces {
    /// Validates faces given in `+X, -X, +Y, -Y, +Z, -Z` order.
    ///
    /// `origins` name the faces in errors.
    pub fn new(faces: [ImageData; 6], origins: &[PathBuf; 6]) -> Result<Self, EngineError> {
        let size = faces[0].width;
        for (face, origin) in faces.iter().zip(origins) {
            if !face.is_square() {
                return Err(EngineError::asset(
                    origin,
                    format!("cube face must be square, got {}x{}", face.width, face.height),
                ));
            }
            if face.width != size {
                return Err(EngineError::asset(
                    origin,
                    format!("cube face is {0}x{0}, expected {size}x{size}", face.width),
                ));
            }
        }

        Ok(Self { faces })
    }

    /// Loads `skybox1.jpg` .. `skybox6.jpg` from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, EngineError> {
        let origins = CUBE_FACE_FILES.map(|name| dir.join(name));

        let mut loaded = Vec::with_capacity(6);
        for path in &origins {
            loaded.push(ImageData::load(path)?);
        }

        let faces: [ImageData; 6] = loaded
            .try_into()
            .map_err(|_| EngineError::asset(dir, "expected six cube faces"))?;

        Self::new(faces, &origins)
    }

    /// Edge length in texels.
    pub fn size(&self) -> u32 {
        self.faces[0].width
    }

    pub fn face(&self, face: CubeFace) -> &ImageData {
        &self.faces[face.layer() as usize]
    }

    /// Faces paired with their layers, in upload order.
    pub fn iter(&self) -> impl Iterator<Item = (CubeFace, &ImageData)> {
        CubeFace::ALL.into_iter().map(|f| (f, self.face(f)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins() -> [PathBuf; 6] {
        CUBE_FACE_FILES.map(PathBuf::from)
    }

    fn tagged_faces(size: u32) -> [ImageData; 6] {
        std::array::from_fn(|i| ImageData::solid(size, size, [i as u8, 0, 0, 255]))
    }

    #[test]
    fn face_order_is_preserved() {
        let cube = CubeFaces::new(tagged_faces(4), &origins()).unwrap();
        for (i, (face, img)) in cube.iter().enumerate() {
            assert_eq!(face.layer(), i as u32);
            assert_eq!(img.rgba[0], i as u8);
        }
        assert_eq!(cube.face(CubeFace::NegativeZ).rgba[0], 5);
        assert_eq!(cube.size(), 4);
    }

    #[test]
    fn non_square_face_is_rejected() {
        let mut faces = tagged_faces(4);
        faces[2] = ImageData::solid(4, 8, [0; 4]);
        let err = CubeFaces::new(faces, &origins()).unwrap_err();
        assert!(err.to_string().contains("skybox3.jpg"));
    }

    #[test]
    fn mismatched_face_size_is_rejected() {
        let mut faces = tagged_faces(4);
        faces[5] = ImageData::solid(8, 8, [0; 4]);
        assert!(CubeFaces::new(faces, &origins()).is_err());
    }

    #[test]
    fn missing_directory_fails_on_first_face() {
        let err = CubeFaces::load_dir(Path::new("/nonexistent/tidewater")).unwrap_err();
        assert!(err.to_string().contains("skybox1.jpg"));
    }
}
