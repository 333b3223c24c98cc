//! Encode/decode traits and little-endian primitives shared by message types.
//!
//! Strings are u16-length-prefixed UTF-8; optional ids carry a presence byte.

/// Types implementing encoding write themselves into a byte buffer.
pub trait SnapshotEncode {
    fn encode(&self, out: &mut Vec<u8>);
}

/// Types implementing decoding reconstruct themselves from a byte slice,
/// advancing it past the consumed bytes.
pub trait SnapshotDecode: Sized {
    fn decode(inp: &mut &[u8]) -> anyhow::Result<Self>;
}

pub(crate) fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

pub(crate) fn put_bool(out: &mut Vec<u8>, v: bool) {
    out.push(u8::from(v));
}

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_f32(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn put_vec2(out: &mut Vec<u8>, v: [f32; 2]) {
    put_f32(out, v[0]);
    put_f32(out, v[1]);
}

pub(crate) fn put_opt_u32(out: &mut Vec<u8>, v: Option<u32>) {
    match v {
        Some(id) => {
            out.push(1);
            put_u32(out, id);
        }
        None => out.push(0),
    }
}

pub(crate) fn put_str(out: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let len = u16::try_from(bytes.len()).unwrap_or(u16::MAX);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&bytes[..usize::from(len)]);
}

pub(crate) fn put_bytes(out: &mut Vec<u8>, b: &[u8]) {
    let len = u32::try_from(b.len()).unwrap_or(u32::MAX);
    put_u32(out, len);
    out.extend_from_slice(&b[..len as usize]);
}

pub(crate) fn take<const N: usize>(inp: &mut &[u8]) -> anyhow::Result<[u8; N]> {
    if inp.len() < N {
        anyhow::bail!("short read");
    }
    let (a, b) = inp.split_at(N);
    *inp = b;
    let mut buf = [0u8; N];
    buf.copy_from_slice(a);
    Ok(buf)
}

pub(crate) fn take_u8(inp: &mut &[u8]) -> anyhow::Result<u8> {
    Ok(take::<1>(inp)?[0])
}

pub(crate) fn take_bool(inp: &mut &[u8]) -> anyhow::Result<bool> {
    match take_u8(inp)? {
        0 => Ok(false),
        1 => Ok(true),
        v => anyhow::bail!("invalid bool byte: {v}"),
    }
}

pub(crate) fn take_u32(inp: &mut &[u8]) -> anyhow::Result<u32> {
    Ok(u32::from_le_bytes(take::<4>(inp)?))
}

pub(crate) fn take_i32(inp: &mut &[u8]) -> anyhow::Result<i32> {
    Ok(i32::from_le_bytes(take::<4>(inp)?))
}

pub(crate) fn take_f32(inp: &mut &[u8]) -> anyhow::Result<f32> {
    Ok(f32::from_le_bytes(take::<4>(inp)?))
}

pub(crate) fn take_vec2(inp: &mut &[u8]) -> anyhow::Result<[f32; 2]> {
    Ok([take_f32(inp)?, take_f32(inp)?])
}

pub(crate) fn take_opt_u32(inp: &mut &[u8]) -> anyhow::Result<Option<u32>> {
    if take_bool(inp)? { Ok(Some(take_u32(inp)?)) } else { Ok(None) }
}

pub(crate) fn take_str(inp: &mut &[u8]) -> anyhow::Result<String> {
    let len = usize::from(u16::from_le_bytes(take::<2>(inp)?));
    if inp.len() < len {
        anyhow::bail!("short string: need {len}, have {}", inp.len());
    }
    let (a, b) = inp.split_at(len);
    *inp = b;
    Ok(std::str::from_utf8(a)?.to_string())
}

pub(crate) fn take_bytes(inp: &mut &[u8]) -> anyhow::Result<Vec<u8>> {
    let len = take_u32(inp)? as usize;
    if inp.len() < len {
        anyhow::bail!("short bytes: need {len}, have {}", inp.len());
    }
    let (a, b) = inp.split_at(len);
    *inp = b;
    Ok(a.to_vec())
}
