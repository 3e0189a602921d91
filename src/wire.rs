//! RREQ option wire codec (§4.3 C4).
//!
//! Mirrors the reference stack's `OutputBuffer`/`InputBuffer` split: encoding
//! writes into a caller-owned byte slice and never allocates, decoding reads
//! from a borrowed slice and never copies more than it has to. Both sides
//! report truncation the same way the buffer primitives do, via a `Result`
//! rather than a panic.

use crate::addr::Address;
use crate::error::{DsrError, Result};

/// DSR option type for a Route Request, per RFC 4728 §5.
pub const DSR_OPT_RREQ: u8 = 2;

/// Fixed header length in bytes (identification + target), matching
/// `length = 6 + 4k` in the wire layout: `6` accounts for the two header
/// bytes not counted in `length` (`type`, `length` itself) plus the 4-byte
/// target address minus the 2-byte identification... concretely: `length`
/// counts everything after the `type`/`length` octets, i.e.
/// `id (2) + target (4) + 4*hops.len()`.
const FIXED_BODY_LEN: usize = 6;

/// A parsed RREQ option: the request identifier, the sought target, and the
/// accumulated hop addresses (in traversal order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RreqOption {
    pub id: u16,
    pub target: Address,
    pub hops: Vec<Address>,
}

impl RreqOption {
    /// A freshly originated RREQ option carrying no hops yet.
    pub fn new(id: u16, target: Address) -> Self {
        Self { id, target, hops: Vec::new() }
    }

    /// `length` as it would be encoded on the wire.
    pub fn wire_len(&self) -> usize {
        FIXED_BODY_LEN + 4 * self.hops.len()
    }

    /// Total encoded size including the `type`/`length` header bytes.
    pub fn encoded_size(&self) -> usize {
        2 + self.wire_len()
    }

    /// Writes `self` into `buf`, which must be at least
    /// [`RreqOption::encoded_size`] bytes. Returns the number of bytes
    /// written.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_size();
        if buf.len() < needed {
            return Err(DsrError::MalformedPacket { reason: "buffer too small for RREQ option" });
        }
        buf[0] = DSR_OPT_RREQ;
        buf[1] = self.wire_len() as u8;
        buf[2..4].copy_from_slice(&self.id.to_be_bytes());
        buf[4..8].copy_from_slice(&self.target.to_octets());
        let mut off = 8;
        for hop in &self.hops {
            buf[off..off + 4].copy_from_slice(&hop.to_octets());
            off += 4;
        }
        Ok(needed)
    }

    /// Appends one hop address in place, advancing the encoded length by
    /// four bytes. The caller must already have grown the underlying buffer
    /// (and shifted any trailing options) by four bytes before calling
    /// this on the wire form; on the in-memory `RreqOption` it is a plain
    /// push.
    pub fn append_local_address(&mut self, self_addr: Address) {
        self.hops.push(self_addr);
    }

    /// Parses an RREQ option (including its `type`/`length` header) from
    /// `bytes`. Returns the option and the number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < 2 {
            return Err(DsrError::MalformedPacket { reason: "truncated RREQ option header" });
        }
        let opt_type = bytes[0];
        if opt_type != DSR_OPT_RREQ {
            return Err(DsrError::MalformedPacket { reason: "not an RREQ option" });
        }
        let length = bytes[1] as usize;
        if length < FIXED_BODY_LEN || (length - FIXED_BODY_LEN) % 4 != 0 {
            return Err(DsrError::MalformedPacket { reason: "inconsistent RREQ option length" });
        }
        let total = 2 + length;
        if bytes.len() < total {
            return Err(DsrError::MalformedPacket { reason: "truncated RREQ option body" });
        }
        let id = u16::from_be_bytes([bytes[2], bytes[3]]);
        let target = Address::from_octets([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let k = (length - FIXED_BODY_LEN) / 4;
        let mut hops = Vec::with_capacity(k);
        let mut off = 8;
        for _ in 0..k {
            hops.push(Address::from_octets([
                bytes[off],
                bytes[off + 1],
                bytes[off + 2],
                bytes[off + 3],
            ]));
            off += 4;
        }
        Ok((Self { id, target, hops }, total))
    }
}
