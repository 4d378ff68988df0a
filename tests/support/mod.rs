#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::GrayImage;

/// Throwaway dataset root under the system temp dir, removed on drop.
pub struct Fixture {
    pub root: PathBuf,
}

impl Fixture {
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "nerfmask_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn image(&self, rel: &str, width: u32, height: u32) {
        let path = self.path(rel);
        ensure_parent(&path);
        image::RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]))
            .save(&path)
            .unwrap();
    }

    /// Lossless grayscale mask.
    pub fn mask(&self, rel: &str, mask: &GrayImage) {
        let path = self.path(rel);
        ensure_parent(&path);
        mask.save(&path).unwrap();
    }

    pub fn manifest(&self, doc: serde_json::Value) {
        std::fs::write(
            self.path("transforms.json"),
            serde_json::to_string_pretty(&doc).unwrap(),
        )
        .unwrap();
    }

    pub fn read_manifest(&self) -> serde_json::Value {
        let text = std::fs::read_to_string(self.path("transforms.json")).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.root).ok();
    }
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

/// `w`×`h` white mask with the pixels of `[x0, x1) × [y0, y1)` set to 0.
pub fn mask_with_box(w: u32, h: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            image::Luma([0])
        } else {
            image::Luma([255])
        }
    })
}

/// Pixels below the preview threshold.
pub fn masked_pixels(mask: &GrayImage) -> Vec<(u32, u32)> {
    mask.enumerate_pixels()
        .filter(|(_, _, p)| p.0[0] < 128)
        .map(|(x, y, _)| (x, y))
        .collect()
}

/// Three frames: frame 0 has a real mask masking `[0,8) × [0,8)`, frames 1 and 2 have none.
pub fn three_frame_dataset(name: &str) -> Fixture {
    let fx = Fixture::new(name);
    fx.image("images/frame_0.png", 32, 24);
    fx.image("images/frame_1.png", 32, 24);
    fx.image("images/frame_2.png", 16, 16);
    fx.mask("masks/frame_0.png", &mask_with_box(32, 24, 0, 0, 8, 8));
    fx.manifest(serde_json::json!({
        "camera_model": "OPENCV",
        "frames": [
            {
                "file_path": "images/frame_0.png",
                "mask_path": "masks/frame_0.png",
                "transform_matrix": [[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]
            },
            { "file_path": "images/frame_1.png", "colmap_im_id": 2 },
            { "file_path": "images/frame_2.png", "colmap_im_id": 3 }
        ]
    }));
    fx
}
