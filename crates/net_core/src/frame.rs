//! Versioned length framing for outbound messages, tagged with the logical
//! channel they were broadcast on.
//!
//! Format (little-endian):
//! - u8 `FRAME_VERSION` (2)
//! - u8 channel id
//! - u32 LEN (bytes of payload)
//! - [u8; LEN] payload

use crate::Channel;

const FRAME_VERSION: u8 = 2;
const HEADER_LEN: usize = 6;
const MAX_FRAME_LEN: usize = 1_048_576; // 1 MiB cap for safety

/// Write a framed message into `out`, appending to any existing bytes.
pub fn write_msg(out: &mut Vec<u8>, channel: Channel, payload: &[u8]) {
    out.push(FRAME_VERSION);
    out.push(channel as u8);
    let len = u32::try_from(payload.len()).unwrap_or(0);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
}

/// Read a single framed message from the front of `inp`, advancing it.
/// Returns the channel and a payload slice borrowed from the input.
pub fn read_msg<'a>(inp: &mut &'a [u8]) -> anyhow::Result<(Channel, &'a [u8])> {
    use anyhow::bail;
    let buf: &'a [u8] = *inp;
    if buf.len() < HEADER_LEN {
        bail!("short frame header");
    }
    let ver = buf[0];
    if ver != FRAME_VERSION {
        bail!("unsupported frame version: {ver}");
    }
    let channel = Channel::from_u8(buf[1])?;
    let mut lenb = [0u8; 4];
    lenb.copy_from_slice(&buf[2..HEADER_LEN]);
    let len = u32::from_le_bytes(lenb) as usize;
    if len > MAX_FRAME_LEN {
        bail!("frame too large: {len} > {MAX_FRAME_LEN}");
    }
    if buf.len() < HEADER_LEN + len {
        bail!("short frame payload");
    }
    let payload = &buf[HEADER_LEN..HEADER_LEN + len];
    *inp = &buf[HEADER_LEN + len..];
    Ok((channel, payload))
}
