//! Chart (`.ojn`) header reader
//!
//! Only the fixed 300-byte header is read; note data is left to the game.
//! The header carries everything the song list needs: title and per-slot
//! levels, plus note counts that tell whether a slot is charted at all.

use std::io::{self, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use o2launch_shared::CONTENT_FORMAT;

use crate::catalog::DIFFICULTY_SLOTS;
use crate::catalog::fixed_ascii_field;

/// Error reading a chart header.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// File is shorter than the fixed header
    #[error("chart header truncated (need {expected} bytes)")]
    Truncated { expected: usize },

    /// Signature at offset 4 is not `ojn\0`
    #[error("bad chart signature {found:02X?}")]
    BadSignature { found: [u8; 4] },

    /// Underlying reader failed
    #[error("chart I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for ContentError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated {
                expected: CONTENT_FORMAT.header_size,
            }
        } else {
            Self::Io(error)
        }
    }
}

/// Fixed header at the start of every chart file.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentHeader {
    pub song_id: i32,
    pub encode_version: f32,
    pub genre: i32,
    pub bpm: f32,
    /// Level per slot; the fourth value is unused by the game
    pub level: [i16; 4],
    pub event_count: [i32; 3],
    pub note_count: [i32; 3],
    pub measure_count: [i32; 3],
    pub package_count: [i32; 3],
    pub old_encode_version: i16,
    pub old_song_id: i16,
    pub old_genre: String,
    pub bmp_size: i32,
    pub old_file_version: i32,
    pub title: String,
    pub artist: String,
    pub noter: String,
    pub ojm_file: String,
    pub cover_size: i32,
    pub time: [i32; 3],
    pub data_offset: [i32; 4],
}

impl ContentHeader {
    /// Read a header from the start of a chart stream.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, ContentError> {
        let song_id = reader.read_i32::<LittleEndian>()?;

        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature)?;
        if &signature != CONTENT_FORMAT.signature {
            return Err(ContentError::BadSignature { found: signature });
        }

        let encode_version = reader.read_f32::<LittleEndian>()?;
        let genre = reader.read_i32::<LittleEndian>()?;
        let bpm = reader.read_f32::<LittleEndian>()?;

        let mut level = [0i16; 4];
        reader.read_i16_into::<LittleEndian>(&mut level)?;

        let event_count = read_i32_array(&mut reader)?;
        let note_count = read_i32_array(&mut reader)?;
        let measure_count = read_i32_array(&mut reader)?;
        let package_count = read_i32_array(&mut reader)?;

        let old_encode_version = reader.read_i16::<LittleEndian>()?;
        let old_song_id = reader.read_i16::<LittleEndian>()?;
        let old_genre = read_text(&mut reader, 20)?;
        let bmp_size = reader.read_i32::<LittleEndian>()?;
        let old_file_version = reader.read_i32::<LittleEndian>()?;

        let title = read_text(&mut reader, 64)?;
        let artist = read_text(&mut reader, 32)?;
        let noter = read_text(&mut reader, 32)?;
        let ojm_file = read_text(&mut reader, 32)?;

        let cover_size = reader.read_i32::<LittleEndian>()?;
        let time = read_i32_array(&mut reader)?;
        let mut data_offset = [0i32; 4];
        reader.read_i32_into::<LittleEndian>(&mut data_offset)?;

        Ok(Self {
            song_id,
            encode_version,
            genre,
            bpm,
            level,
            event_count,
            note_count,
            measure_count,
            package_count,
            old_encode_version,
            old_song_id,
            old_genre,
            bmp_size,
            old_file_version,
            title,
            artist,
            noter,
            ojm_file,
            cover_size,
            time,
            data_offset,
        })
    }

    /// Read the header of a chart file on disk.
    pub fn read_file(path: &Path) -> Result<Self, ContentError> {
        let file = std::fs::File::open(path).map_err(ContentError::Io)?;
        Self::read(io::BufReader::new(file))
    }

    /// Catalog difficulty slots derived from this header.
    ///
    /// A slot without notes is treated as absent.
    pub fn difficulties(&self) -> [Option<i32>; DIFFICULTY_SLOTS] {
        std::array::from_fn(|slot| {
            (self.note_count[slot] > 0).then_some(i32::from(self.level[slot]))
        })
    }
}

fn read_i32_array<R: Read>(reader: &mut R) -> io::Result<[i32; 3]> {
    let mut values = [0i32; 3];
    reader.read_i32_into::<LittleEndian>(&mut values)?;
    Ok(values)
}

fn read_text<R: Read>(reader: &mut R, len: usize) -> io::Result<String> {
    let mut field = vec![0u8; len];
    reader.read_exact(&mut field)?;
    // Header strings are C strings padded with garbage after the NUL.
    let end = field.iter().position(|&b| b == 0).unwrap_or(len);
    Ok(fixed_ascii_field(&field[..end]))
}
