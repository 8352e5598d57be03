//! Wire protocol between the HILS Controller and Plant.
//!
//! Two fixed-layout binary frames travel over the UDP link, both network
//! byte order (big-endian), both integrity-checked with a truncated MD5.
//! This crate is pure: no sockets, no clock reads, no allocation beyond the
//! returned byte buffers.

use md5::{Digest, Md5};

/// Force vector commanded by the Controller, sent to the Plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestPacket {
    /// Monotonic sequence assigned by the Controller, unique within a run.
    pub seq: u32,
    /// Controller send wall time; archival only, not used for RTT.
    pub timestamp: f64,
    pub fx: f32,
    pub fy: f32,
    pub fz: f32,
}

/// Plant-reported state, sent back to the Controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsePacket {
    /// Echoes the request's `seq`.
    pub seq: u32,
    /// Plant send wall time; archival only.
    pub timestamp: f64,
    pub pos_x: f32,
    pub pos_y: f32,
    pub pos_z: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub vel_z: f32,
    pub acc_x: f32,
    pub acc_y: f32,
    pub acc_z: f32,
}

pub const REQUEST_LEN: usize = 32;
pub const RESPONSE_LEN: usize = 72;

/// Bytes of reserved header padding in the response frame. The response's
/// checksum covers 64 header bytes (§4.1), but seq + timestamp + the nine
/// f32 state fields only account for 48 of them; the remaining 16 are a
/// zeroed reserved block, included in the checksum like any other header
/// byte. See DESIGN.md for the reasoning.
const RESPONSE_RESERVED_LEN: usize = 16;

/// A decode failure: wrong length, or a checksum that doesn't match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalid;

fn md5_low64(bytes: &[u8]) -> u64 {
    let digest = Md5::digest(bytes);
    let mut low = [0u8; 8];
    low.copy_from_slice(&digest[8..16]);
    u64::from_be_bytes(low)
}

pub fn pack_request(p: RequestPacket) -> [u8; REQUEST_LEN] {
    let mut buf = [0u8; REQUEST_LEN];
    let mut w = 0;
    buf[w..w + 4].copy_from_slice(&p.seq.to_be_bytes());
    w += 4;
    buf[w..w + 8].copy_from_slice(&p.timestamp.to_be_bytes());
    w += 8;
    buf[w..w + 4].copy_from_slice(&p.fx.to_be_bytes());
    w += 4;
    buf[w..w + 4].copy_from_slice(&p.fy.to_be_bytes());
    w += 4;
    buf[w..w + 4].copy_from_slice(&p.fz.to_be_bytes());
    w += 4;
    debug_assert_eq!(w, REQUEST_LEN - 8);

    let checksum = md5_low64(&buf[..w]);
    buf[w..w + 8].copy_from_slice(&checksum.to_be_bytes());
    buf
}

pub fn unpack_request(bytes: &[u8]) -> Result<RequestPacket, Invalid> {
    if bytes.len() != REQUEST_LEN {
        return Err(Invalid);
    }
    let header = &bytes[..REQUEST_LEN - 8];
    let stored_checksum = u64::from_be_bytes(bytes[REQUEST_LEN - 8..].try_into().unwrap());
    if md5_low64(header) != stored_checksum {
        return Err(Invalid);
    }

    let seq = u32::from_be_bytes(header[0..4].try_into().unwrap());
    let timestamp = f64::from_be_bytes(header[4..12].try_into().unwrap());
    let fx = f32::from_be_bytes(header[12..16].try_into().unwrap());
    let fy = f32::from_be_bytes(header[16..20].try_into().unwrap());
    let fz = f32::from_be_bytes(header[20..24].try_into().unwrap());

    Ok(RequestPacket { seq, timestamp, fx, fy, fz })
}

pub fn pack_response(p: ResponsePacket) -> [u8; RESPONSE_LEN] {
    let mut buf = [0u8; RESPONSE_LEN];
    let mut w = 0;
    buf[w..w + 4].copy_from_slice(&p.seq.to_be_bytes());
    w += 4;
    buf[w..w + 8].copy_from_slice(&p.timestamp.to_be_bytes());
    w += 8;
    for v in [
        p.pos_x, p.pos_y, p.pos_z, p.vel_x, p.vel_y, p.vel_z, p.acc_x, p.acc_y, p.acc_z,
    ] {
        buf[w..w + 4].copy_from_slice(&v.to_be_bytes());
        w += 4;
    }
    // reserved block stays zeroed; already zero-initialized
    w += RESPONSE_RESERVED_LEN;
    debug_assert_eq!(w, RESPONSE_LEN - 8);

    let checksum = md5_low64(&buf[..w]);
    buf[w..w + 8].copy_from_slice(&checksum.to_be_bytes());
    buf
}

pub fn unpack_response(bytes: &[u8]) -> Result<ResponsePacket, Invalid> {
    if bytes.len() != RESPONSE_LEN {
        return Err(Invalid);
    }
    let header = &bytes[..RESPONSE_LEN - 8];
    let stored_checksum = u64::from_be_bytes(bytes[RESPONSE_LEN - 8..].try_into().unwrap());
    if md5_low64(header) != stored_checksum {
        return Err(Invalid);
    }

    let seq = u32::from_be_bytes(header[0..4].try_into().unwrap());
    let timestamp = f64::from_be_bytes(header[4..12].try_into().unwrap());
    let mut floats = [0f32; 9];
    for (i, f) in floats.iter_mut().enumerate() {
        let o = 12 + i * 4;
        *f = f32::from_be_bytes(header[o..o + 4].try_into().unwrap());
    }

    Ok(ResponsePacket {
        seq,
        timestamp,
        pos_x: floats[0],
        pos_y: floats[1],
        pos_z: floats[2],
        vel_x: floats[3],
        vel_y: floats[4],
        vel_z: floats[5],
        acc_x: floats[6],
        acc_y: floats[7],
        acc_z: floats[8],
    })
}
