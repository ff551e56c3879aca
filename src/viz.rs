use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use crate::error::Error;




/**
 * Writes the sampled leading field to a flat raster file: two `f32` values
 * giving the sampled width and height, then one frame after another of
 * `width * height` row-major `f32` values. All values are little-endian.
 */
pub struct VizWriter<W: Write> {
    writer: W,
    dims: (usize, usize),
    frames: usize,
}




// ============================================================================
impl VizWriter<BufWriter<File>> {

    /// Create (or truncate) the file at `path` and write the header.
    pub fn create<P: AsRef<Path>>(path: P, dims: (usize, usize)) -> Result<Self, Error> {
        Self::new(BufWriter::new(File::create(path)?), dims)
    }
}

impl<W: Write> VizWriter<W> {

    pub fn new(mut writer: W, dims: (usize, usize)) -> Result<Self, Error> {
        writer.write_all(&(dims.0 as f32).to_le_bytes())?;
        writer.write_all(&(dims.1 as f32).to_le_bytes())?;
        Ok(Self { writer, dims, frames: 0 })
    }

    /// Append one frame. The frame must have exactly `width * height` values.
    pub fn write_frame(&mut self, frame: &[f32]) -> Result<(), Error> {
        let (w, h) = self.dims;

        if frame.len() != w * h {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("frame has {} values, raster is {}x{}", frame.len(), w, h))));
        }
        for value in frame {
            self.writer.write_all(&value.to_le_bytes())?;
        }
        self.frames += 1;
        Ok(())
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        Ok(self.writer.flush()?)
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W, Error> {
        self.flush()?;
        Ok(self.writer)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::VizWriter;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn header_then_frames() {
        let mut viz = VizWriter::new(Vec::new(), (3, 2)).unwrap();
        viz.write_frame(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        viz.write_frame(&[0.5; 6]).unwrap();
        assert_eq!(viz.frames(), 2);

        let data = floats(&viz.into_inner().unwrap());
        assert_eq!(data.len(), 2 + 12);
        assert_eq!(&data[..2], &[3.0, 2.0]);
        assert_eq!(&data[2..8], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(data[13], 0.5);
    }

    #[test]
    fn frame_of_wrong_size_is_rejected() {
        let mut viz = VizWriter::new(Vec::new(), (2, 2)).unwrap();
        assert!(viz.write_frame(&[1.0; 3]).is_err());
        assert_eq!(viz.frames(), 0);
    }
}
