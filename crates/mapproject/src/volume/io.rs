//! Slice-stack I/O: one grayscale image per z-slice.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

use super::{Volume, VolumeError};

const SLICE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "bmp", "pgm", "jpg", "jpeg"];

/// Image files in `dir` with a known raster extension, sorted by file name.
pub fn list_slice_files(dir: &Path) -> Result<Vec<PathBuf>, VolumeError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_slice = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SLICE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_slice {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every slice image in `dir` (sorted by name) into a volume.
pub fn load_slice_dir(dir: &Path) -> Result<Volume<f32>, VolumeError> {
    let files = list_slice_files(dir)?;
    load_slice_stack(&files)
}

/// Load an ordered list of grayscale slices into a volume.
///
/// 8- and 16-bit gray images keep their raw values; colour images are
/// reduced to 8-bit luma first.
pub fn load_slice_stack<P: AsRef<Path>>(paths: &[P]) -> Result<Volume<f32>, VolumeError> {
    let Some(first_path) = paths.first() else {
        return Err(VolumeError::EmptyStack);
    };
    let first = image::open(first_path.as_ref())?;
    let (w, h) = (first.width(), first.height());
    let plane = w as usize * h as usize;

    let mut volume = Volume::try_new([w as usize, h as usize, paths.len()])?;
    write_slice(volume.slice_mut(0), first);
    for (index, path) in paths.iter().enumerate().skip(1) {
        let img = image::open(path.as_ref())?;
        if (img.width(), img.height()) != (w, h) {
            return Err(VolumeError::SliceSize {
                index,
                expected: [w, h],
                got: [img.width(), img.height()],
            });
        }
        write_slice(volume.slice_mut(index), img);
    }
    tracing::debug!(
        width = w,
        height = h,
        depth = paths.len(),
        voxels = plane * paths.len(),
        "loaded slice stack"
    );
    Ok(volume)
}

fn write_slice(dst: &mut [f32], img: DynamicImage) {
    match img {
        DynamicImage::ImageLuma8(buf) => copy_luma(dst, buf.as_raw()),
        DynamicImage::ImageLuma16(buf) => copy_luma(dst, buf.as_raw()),
        other => {
            let gray: GrayImage = other.into_luma8();
            copy_luma(dst, gray.as_raw());
        }
    }
}

fn copy_luma<T: Copy + Into<f32>>(dst: &mut [f32], src: &[T]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s.into();
    }
}

/// Write each z-slice of a 16-bit volume as `<prefix>_<zzzz>.png` in `dir`.
pub fn save_u16_stack(
    volume: &Volume<u16>,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, VolumeError> {
    std::fs::create_dir_all(dir)?;
    let [w, h, d] = volume.dims();
    let digits = d.max(1).to_string().len().max(4);
    let mut written = Vec::with_capacity(d);
    for z in 0..d {
        let buf: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_raw(w as u32, h as u32, volume.slice(z).to_vec()).ok_or(
                VolumeError::DataLength {
                    expected: w * h,
                    got: volume.slice(z).len(),
                },
            )?;
        let path = dir.join(format!("{}_{:0width$}.png", prefix, z, width = digits));
        buf.save(&path)?;
        written.push(path);
    }
    tracing::debug!(dir = %dir.display(), slices = d, "wrote slice stack");
    Ok(written)
}

/// Round and saturate a float volume to 16 bits and write it as a PNG stack.
pub fn save_slice_stack(
    volume: &Volume<f32>,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, VolumeError> {
    save_u16_stack(&volume.to_u16(), dir, prefix)
}
