//! STL export
//!
//! Binary layout: 80-byte header, u32 triangle count, then per triangle a
//! facet normal, three vertices (all little-endian f32) and a u16 attribute.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::mesh::{triangle_normal, Mesh};
use crate::error::{PipelineError, PipelineResult};

const HEADER_TEXT: &[u8] = b"brainmesh binary STL";

/// STL encoding
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

fn facet_normal(triangle: &[[f32; 3]; 3]) -> [f32; 3] {
    let [a, b, c] = triangle.map(|v| [v[0] as f64, v[1] as f64, v[2] as f64]);
    let n = triangle_normal(a, b, c);
    [n[0] as f32, n[1] as f32, n[2] as f32]
}

/// Write `mesh` as binary STL
pub fn write_stl_binary<W: Write>(mesh: &Mesh, writer: &mut W) -> PipelineResult<()> {
    let count = u32::try_from(mesh.num_faces()).map_err(|_| {
        PipelineError::Value(format!("{} triangles exceed the STL limit", mesh.num_faces()))
    })?;

    let mut header = [0u8; 80];
    header[..HEADER_TEXT.len()].copy_from_slice(HEADER_TEXT);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    for triangle in mesh.triangles() {
        for c in facet_normal(triangle) {
            writer.write_all(&c.to_le_bytes())?;
        }
        for vertex in triangle {
            for &c in vertex {
                writer.write_all(&c.to_le_bytes())?;
            }
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

/// Write `mesh` as ASCII STL under the solid name `name`
pub fn write_stl_ascii<W: Write>(mesh: &Mesh, name: &str, writer: &mut W) -> PipelineResult<()> {
    writeln!(writer, "solid {}", name)?;
    for triangle in mesh.triangles() {
        let n = facet_normal(triangle);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n[0], n[1], n[2])?;
        writeln!(writer, "    outer loop")?;
        for v in triangle {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v[0], v[1], v[2])?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {}", name)?;
    Ok(())
}

/// Save `mesh` to an STL file
pub fn save_stl(path: &Path, mesh: &Mesh, format: StlFormat) -> PipelineResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        StlFormat::Binary => write_stl_binary(mesh, &mut writer)?,
        StlFormat::Ascii => {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "structure".to_string());
            write_stl_ascii(mesh, &name, &mut writer)?
        }
    }
    writer.flush()?;
    debug!(path = %path.display(), faces = mesh.num_faces(), ?format, "wrote STL");
    Ok(())
}
