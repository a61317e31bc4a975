//! NIfTI file I/O
//!
//! Loads probability maps from `.nii` / `.nii.gz` files or byte buffers and
//! writes float32 NIfTI-1 volumes (used for exported masks and fixtures).

use std::io::{Cursor, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use ndarray::Array;
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::volume::{Dims, VolumetricImage};

/// NIfTI data loaded from bytes
pub struct NiftiData {
    /// Volume data as f64, x varies fastest
    pub data: Vec<f64>,
    /// Dimensions (nx, ny, nz)
    pub dims: Dims,
    /// Voxel sizes in mm
    pub voxel_size: (f64, f64, f64),
    /// Affine transformation matrix (4x4, row-major)
    pub affine: [f64; 16],
}

impl NiftiData {
    /// Drop the spatial header, keeping only the voxel grid
    pub fn into_image(self) -> PipelineResult<VolumetricImage> {
        VolumetricImage::new(self.data, self.dims)
    }
}

/// Check if bytes are gzip compressed
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Get header info for diagnostics
fn get_header_info(bytes: &[u8]) -> String {
    if bytes.len() < 348 {
        return format!("File too small ({} bytes, need at least 348)", bytes.len());
    }

    let sizeof_hdr = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let magic = String::from_utf8_lossy(&bytes[344..348]).to_string();
    let datatype = i16::from_le_bytes([bytes[70], bytes[71]]);

    format!("sizeof_hdr={}, magic='{}', datatype={}", sizeof_hdr, magic, datatype)
}

fn parse_object(bytes: &[u8]) -> PipelineResult<InMemNiftiObject> {
    if is_gzip(bytes) {
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes))).map_err(|e| {
            let mut decompressed = Vec::new();
            let info = match std::io::Read::read_to_end(
                &mut GzDecoder::new(Cursor::new(bytes)),
                &mut decompressed,
            ) {
                Ok(_) => get_header_info(&decompressed),
                Err(_) => "could not decompress".to_string(),
            };
            PipelineError::Format(format!("Failed to read gzipped NIfTI: {} ({})", e, info))
        })
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes)).map_err(|e| {
            PipelineError::Format(format!("Failed to read NIfTI: {} ({})", e, get_header_info(bytes)))
        })
    }
}

/// Load a 3D NIfTI volume from bytes
///
/// Supports both .nii and .nii.gz (gzip is auto-detected). A trailing axis of
/// length 1 is accepted; any real 4th dimension is a format error.
pub fn load_nifti(bytes: &[u8]) -> PipelineResult<NiftiData> {
    let obj = parse_object(bytes)?;
    let header = obj.header();

    let ndim = header.dim[0] as usize;
    if ndim < 3 {
        return Err(PipelineError::Format(format!("Expected a 3D volume, got {}D", ndim)));
    }

    let voxel_size = (
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    );
    let affine = get_affine(header);

    let array: Array<f64, _> = obj
        .into_volume()
        .into_ndarray()
        .map_err(|e| PipelineError::Format(format!("Failed to convert to ndarray: {}", e)))?;
    let shape = array.shape().to_vec();

    if shape.len() < 3 {
        return Err(PipelineError::Format(format!("Expected a 3D array, got {}D", shape.len())));
    }
    let extra: usize = shape[3..].iter().product();
    if extra != 1 {
        return Err(PipelineError::Format(format!(
            "Expected a single 3D volume, got shape {:?}",
            shape
        )));
    }
    if shape.len() > 3 {
        warn!(?shape, "dropping singleton trailing axes");
    }

    let (nx, ny, nz) = (shape[0], shape[1], shape[2]);

    // Fortran order to match NIfTI convention; trailing axes are all zero
    let mut index = vec![0usize; shape.len()];
    let mut data = Vec::with_capacity(nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                index[0] = i;
                index[1] = j;
                index[2] = k;
                data.push(array[index.as_slice()]);
            }
        }
    }

    debug!(nx, ny, nz, "loaded NIfTI volume");

    Ok(NiftiData {
        data,
        dims: (nx, ny, nz),
        voxel_size,
        affine,
    })
}

/// Get affine transformation matrix from header
fn get_affine(header: &NiftiHeader) -> [f64; 16] {
    // Prefer sform if available
    if header.sform_code > 0 {
        let s = &header.srow_x;
        let t = &header.srow_y;
        let u = &header.srow_z;
        [
            s[0] as f64, s[1] as f64, s[2] as f64, s[3] as f64,
            t[0] as f64, t[1] as f64, t[2] as f64, t[3] as f64,
            u[0] as f64, u[1] as f64, u[2] as f64, u[3] as f64,
            0.0, 0.0, 0.0, 1.0,
        ]
    } else {
        let vsx = header.pixdim[1] as f64;
        let vsy = header.pixdim[2] as f64;
        let vsz = header.pixdim[3] as f64;
        [
            vsx, 0.0, 0.0, 0.0,
            0.0, vsy, 0.0, 0.0,
            0.0, 0.0, vsz, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }
}

/// Encode data as uncompressed float32 NIfTI-1 bytes
pub fn save_nifti(
    data: &[f64],
    dims: Dims,
    voxel_size: (f64, f64, f64),
    affine: &[f64; 16],
) -> PipelineResult<Vec<u8>> {
    let (nx, ny, nz) = dims;
    if nx.checked_mul(ny).and_then(|n| n.checked_mul(nz)) != Some(data.len()) {
        return Err(PipelineError::Format(format!(
            "Voxel count {} does not match dimensions {}x{}x{}",
            data.len(), nx, ny, nz
        )));
    }
    if nx > i16::MAX as usize || ny > i16::MAX as usize || nz > i16::MAX as usize {
        return Err(PipelineError::Format(format!(
            "Dimensions {}x{}x{} exceed the NIfTI-1 limit",
            nx, ny, nz
        )));
    }
    let (vsx, vsy, vsz) = voxel_size;

    let mut header = [0u8; 348];

    // sizeof_hdr
    header[0..4].copy_from_slice(&348i32.to_le_bytes());

    let dim: [i16; 8] = [3, nx as i16, ny as i16, nz as i16, 1, 1, 1, 1];
    for (i, &d) in dim.iter().enumerate() {
        let offset = 40 + i * 2;
        header[offset..offset + 2].copy_from_slice(&d.to_le_bytes());
    }

    // datatype = FLOAT32, bitpix = 32
    header[70..72].copy_from_slice(&16i16.to_le_bytes());
    header[72..74].copy_from_slice(&32i16.to_le_bytes());

    let pixdim: [f32; 8] = [1.0, vsx as f32, vsy as f32, vsz as f32, 1.0, 1.0, 1.0, 1.0];
    for (i, &p) in pixdim.iter().enumerate() {
        let offset = 76 + i * 4;
        header[offset..offset + 4].copy_from_slice(&p.to_le_bytes());
    }

    // vox_offset: header + 4 byte extension flag
    header[108..112].copy_from_slice(&352.0f32.to_le_bytes());
    header[112..116].copy_from_slice(&1.0f32.to_le_bytes());
    header[116..120].copy_from_slice(&0.0f32.to_le_bytes());

    // sform_code = 1 (scanner anat)
    header[254..256].copy_from_slice(&1i16.to_le_bytes());

    for (row, base) in [280usize, 296, 312].iter().enumerate() {
        for i in 0..4 {
            let offset = base + i * 4;
            header[offset..offset + 4].copy_from_slice(&(affine[row * 4 + i] as f32).to_le_bytes());
        }
    }

    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(352 + data.len() * 4);
    buffer.write_all(&header)?;
    buffer.write_all(&[0u8; 4])?;
    for &val in data {
        buffer.write_all(&(val as f32).to_le_bytes())?;
    }

    Ok(buffer)
}

/// Encode data as gzipped NIfTI bytes (.nii.gz)
pub fn save_nifti_gz(
    data: &[f64],
    dims: Dims,
    voxel_size: (f64, f64, f64),
    affine: &[f64; 16],
) -> PipelineResult<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let uncompressed = save_nifti(data, dims, voxel_size, affine)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

/// Read a NIfTI file from a filesystem path
///
/// A missing or unreadable path is reported as `NotFound`.
pub fn read_nifti_file(path: &Path) -> PipelineResult<NiftiData> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    load_nifti(&bytes)
}

/// Save NIfTI data to a file, gzip compressed when the path ends with .nii.gz
pub fn save_nifti_to_file(
    path: &Path,
    data: &[f64],
    dims: Dims,
    voxel_size: (f64, f64, f64),
    affine: &[f64; 16],
) -> PipelineResult<()> {
    let bytes = if path.to_string_lossy().ends_with(".nii.gz") {
        save_nifti_gz(data, dims, voxel_size, affine)?
    } else {
        save_nifti(data, dims, voxel_size, affine)?
    };
    std::fs::write(path, &bytes)?;
    Ok(())
}
