//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Ver (1)  │ Kind (1) │ Len (4)  │       Body (bincode)        │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! - Command frames: `Kind` is the operation code, the body is the
//!   bincode-encoded [`Command`].
//! - Response frames: `Kind` is the response kind code, the body is the
//!   bincode-encoded [`Response`].
//!
//! `Len` is big endian.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Command, Operation, Response, ResponseKind};
use crate::error::{Result, ThotError};

/// Wire format version carried by every frame
pub const PROTOCOL_VERSION: u8 = 1;

/// Header size: 1 byte version + 1 byte kind + 4 bytes length
pub const HEADER_SIZE: usize = 6;

/// Maximum body size (16 MB)
pub const MAX_BODY_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Frame helpers
// =============================================================================

fn encode_frame(kind: u8, body: &[u8]) -> Result<Bytes> {
    if body.len() > MAX_BODY_SIZE as usize {
        return Err(ThotError::Protocol(format!(
            "Body too large: {} bytes (max {})",
            body.len(),
            MAX_BODY_SIZE
        )));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + body.len());
    frame.put_u8(PROTOCOL_VERSION);
    frame.put_u8(kind);
    frame.put_u32(body.len() as u32);
    frame.put_slice(body);

    Ok(frame.freeze())
}

/// Parse and validate a header, returning (kind, body_len)
fn parse_header(mut header: &[u8]) -> Result<(u8, usize)> {
    if header.len() < HEADER_SIZE {
        return Err(ThotError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            header.len()
        )));
    }

    let version = header.get_u8();
    let kind = header.get_u8();
    let body_len = header.get_u32();

    if version != PROTOCOL_VERSION {
        return Err(ThotError::Protocol(format!(
            "Unsupported protocol version {} (expected {})",
            version, PROTOCOL_VERSION
        )));
    }

    if body_len > MAX_BODY_SIZE {
        return Err(ThotError::Protocol(format!(
            "Body too large: {} bytes (max {})",
            body_len, MAX_BODY_SIZE
        )));
    }

    Ok((kind, body_len as usize))
}

/// Split a complete frame into (kind, body)
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    let (kind, body_len) = parse_header(bytes)?;

    let total_len = HEADER_SIZE + body_len;
    if bytes.len() < total_len {
        return Err(ThotError::Protocol(format!(
            "Incomplete body: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

/// Read one whole frame (header + body) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let (_, body_len) = parse_header(&header)?;

    let mut frame = vec![0u8; HEADER_SIZE + body_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if body_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Result<Bytes> {
    let body = bincode::serialize(command)?;
    encode_frame(command.operation() as u8, &body)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (kind, body) = split_frame(bytes)?;

    let operation = Operation::from_code(kind).ok_or_else(|| {
        ThotError::Protocol(format!("Unknown operation kind: 0x{:02x}", kind))
    })?;

    let command: Command = bincode::deserialize(body)?;

    if command.operation() != operation {
        return Err(ThotError::Protocol(format!(
            "Header says {:?} but payload is {:?}",
            operation,
            command.operation()
        )));
    }

    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Bytes> {
    let body = bincode::serialize(response)?;
    encode_frame(response.kind() as u8, &body)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (kind, body) = split_frame(bytes)?;

    let kind = ResponseKind::from_code(kind).ok_or_else(|| {
        ThotError::Protocol(format!("Unknown response kind: 0x{:02x}", kind))
    })?;

    let response: Response = bincode::deserialize(body)?;

    if response.kind() != kind {
        return Err(ThotError::Protocol(format!(
            "Header says {:?} but body is {:?}",
            kind,
            response.kind()
        )));
    }

    if let Response::Error { message } = &response {
        if message.is_empty() {
            return Err(ThotError::Protocol(
                "ERROR response without a message".to_string(),
            ));
        }
    }

    Ok(response)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
///
/// Blocks until a complete response is received or an error occurs
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
