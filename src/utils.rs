//! Compression transparency (§6): `.gz` and `.xz` are always supported;
//! `.zst` only when the crate is built with the `zstd` feature. Parsers
//! never see compressed bytes.

use std::io::Read;
use std::path::Path;

use crate::error::{AppStreamError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    None,
    Gzip,
    Xz,
    Zstd,
}

fn codec_for(path: &Path) -> Codec {
    match path.extension().and_then(|e| e.to_str()) {
        Some("gz") => Codec::Gzip,
        Some("xz") => Codec::Xz,
        Some("zst") => Codec::Zstd,
        _ => Codec::None,
    }
}

/// Reads `path` fully, transparently decompressing based on its extension.
pub fn read_possibly_compressed(path: &Path) -> Result<Vec<u8>> {
    let raw = std::fs::read(path).map_err(|e| AppStreamError::File {
        path: path.to_path_buf(),
        source: e,
    })?;
    decompress(&raw, codec_for(path), path)
}

fn decompress(raw: &[u8], codec: Codec, path: &Path) -> Result<Vec<u8>> {
    match codec {
        Codec::None => Ok(raw.to_vec()),
        Codec::Gzip => {
            #[cfg(feature = "gzip")]
            {
                let mut out = Vec::new();
                flate2::read::GzDecoder::new(raw)
                    .read_to_end(&mut out)
                    .map_err(|e| AppStreamError::parse_at(path, format!("gzip decode failed: {e}")))?;
                Ok(out)
            }
            #[cfg(not(feature = "gzip"))]
            Err(AppStreamError::parse_at(path, "gzip support not built into this crate"))
        }
        Codec::Xz => {
            #[cfg(feature = "xz")]
            {
                let mut out = Vec::new();
                xz2::read::XzDecoder::new(raw)
                    .read_to_end(&mut out)
                    .map_err(|e| AppStreamError::parse_at(path, format!("xz decode failed: {e}")))?;
                Ok(out)
            }
            #[cfg(not(feature = "xz"))]
            Err(AppStreamError::parse_at(path, "xz support not built into this crate"))
        }
        Codec::Zstd => {
            #[cfg(feature = "zstd")]
            {
                let mut out = Vec::new();
                zstd::stream::read::Decoder::new(raw)
                    .and_then(|mut d| d.read_to_end(&mut out))
                    .map_err(|e| AppStreamError::parse_at(path, format!("zstd decode failed: {e}")))?;
                Ok(out)
            }
            #[cfg(not(feature = "zstd"))]
            Err(AppStreamError::parse_at(path, "zstd support not built into this crate"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_passes_through() {
        let result = decompress(b"<component/>", Codec::None, Path::new("a.xml")).unwrap();
        assert_eq!(result, b"<component/>");
    }

    #[test]
    fn codec_detected_from_extension() {
        assert_eq!(codec_for(Path::new("foo.xml.gz")), Codec::Gzip);
        assert_eq!(codec_for(Path::new("foo.yml.xz")), Codec::Xz);
        assert_eq!(codec_for(Path::new("foo.xml")), Codec::None);
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_round_trips() {
        use std::io::Write;
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b"<component/>").unwrap();
        let compressed = encoder.finish().unwrap();
        let result = decompress(&compressed, Codec::Gzip, Path::new("a.xml.gz")).unwrap();
        assert_eq!(result, b"<component/>");
    }
}
