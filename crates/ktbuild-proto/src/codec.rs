//! Length-delimited framing for the persistent worker protocol.
//!
//! Each message is preceded by its size as a base-128 varint, the same
//! framing as protobuf's `writeDelimitedTo`/`parseDelimitedFrom`.

use std::io;

use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on the varint prefix of a 64-bit length.
const MAX_VARINT_LEN: usize = 10;

/// Read one length-delimited message.
///
/// Returns `Ok(None)` when the stream ends cleanly before a new message.
pub async fn read_delimited<M, R>(reader: &mut R) -> io::Result<Option<M>>
where
    M: Message + Default,
    R: AsyncRead + Unpin,
{
    let Some(len) = read_length(reader).await? else {
        return Ok(None);
    };

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;

    M::decode(buf.as_slice())
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write one length-delimited message and flush.
pub async fn write_delimited<M, W>(writer: &mut W, message: &M) -> io::Result<()>
where
    M: Message,
    W: AsyncWrite + Unpin,
{
    let buf = message.encode_length_delimited_to_vec();
    writer.write_all(&buf).await?;
    writer.flush().await
}

async fn read_length<R>(reader: &mut R) -> io::Result<Option<usize>>
where
    R: AsyncRead + Unpin,
{
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if i == 0 && e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        };
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return usize::try_from(value)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        "length prefix longer than 10 bytes",
    ))
}
