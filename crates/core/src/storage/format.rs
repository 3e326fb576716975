use super::encryption::KdfParams;
use crate::errors::CoreError;

/// Magic bytes of a saved dashboard session.
pub const MAGIC: &[u8; 4] = b"FDSN";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + ciphertext_len(4)
pub const HEADER_SIZE: usize = 50;

/// Header of a session file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
}

/// Frame `ciphertext` behind a header. All integers little-endian.
///
/// ```text
/// [FDSN] [version u16] [memory_cost u32] [time_cost u32] [parallelism u32]
/// [salt 16B] [nonce 12B] [ciphertext_len u32] [ciphertext]
/// ```
pub fn write_file(header: &SessionHeader, ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
    let len = u32::try_from(ciphertext.len())
        .map_err(|_| CoreError::Serialization("session payload too large".into()))?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&header.version.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.memory_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.time_cost.to_le_bytes());
    buf.extend_from_slice(&header.kdf_params.parallelism.to_le_bytes());
    buf.extend_from_slice(&header.salt);
    buf.extend_from_slice(&header.nonce);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(ciphertext);
    Ok(buf)
}

/// Split a session file into its header and ciphertext.
pub fn read_file(data: &[u8]) -> Result<(SessionHeader, &[u8]), CoreError> {
    if data.len() < HEADER_SIZE {
        return Err(CoreError::InvalidFileFormat(
            "too small to be a session file".into(),
        ));
    }
    let mut reader = ByteReader { data, offset: 0 };

    if reader.take::<4>() != *MAGIC {
        return Err(CoreError::InvalidFileFormat("bad magic bytes".into()));
    }

    let version = u16::from_le_bytes(reader.take());
    if version == 0 || version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(version));
    }

    let kdf_params = KdfParams {
        memory_cost: u32::from_le_bytes(reader.take()),
        time_cost: u32::from_le_bytes(reader.take()),
        parallelism: u32::from_le_bytes(reader.take()),
    };
    kdf_params.check_bounds()?;

    let salt = reader.take::<16>();
    let nonce = reader.take::<12>();
    let len = u32::from_le_bytes(reader.take()) as usize;

    let rest = &data[reader.offset..];
    if rest.len() < len {
        return Err(CoreError::InvalidFileFormat(format!(
            "truncated: expected {len} bytes of ciphertext, got {}",
            rest.len()
        )));
    }

    let header = SessionHeader {
        version,
        kdf_params,
        salt,
        nonce,
    };
    Ok((header, &rest[..len]))
}

/// Fixed-size reads over a buffer already checked to hold `HEADER_SIZE` bytes.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl ByteReader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }
}
