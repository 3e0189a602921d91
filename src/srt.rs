//! Source-route vector algebra (§4.2 C3).
//!
//! `SourceRoute` is an immutable value: every transformation below returns a
//! freshly owned route rather than mutating in place, mirroring the
//! reference implementation's `dsr_srt_new_*` family (each of which
//! allocates a new `struct dsr_srt`). None of these functions perform I/O or
//! allocate anything beyond an owned `Vec`; they cannot fail.

use crate::addr::Address;

/// An ordered path from `src` to `dst` through zero or more intermediate
/// `hops`. Index `n = hops.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRoute {
    pub src: Address,
    pub dst: Address,
    pub hops: Vec<Address>,
}

impl SourceRoute {
    pub fn new(src: Address, dst: Address, hops: Vec<Address>) -> Self {
        Self { src, dst, hops }
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Swaps `src`/`dst` and reverses `hops`.
    pub fn reverse(&self) -> Self {
        let mut hops = self.hops.clone();
        hops.reverse();
        Self { src: self.dst, dst: self.src, hops }
    }

    /// The prefix of `self` ending at the first occurrence of `addr` in
    /// `hops`, as a route from `self.src` to `addr`. `None` if `addr` does
    /// not appear in `hops`.
    pub fn split(&self, addr: Address) -> Option<Self> {
        let idx = self.hops.iter().position(|&h| h == addr)?;
        Some(Self { src: self.src, dst: addr, hops: self.hops[..idx].to_vec() })
    }

    /// `reverse(split(self, addr))`.
    pub fn split_reverse(&self, addr: Address) -> Option<Self> {
        self.split(addr).map(|s| s.reverse())
    }

    /// Removes the hops strictly between the occurrences of `a1` and `a2`,
    /// keeping `src`/`dst` unchanged. `a1` may be `src` itself (position
    /// `0`); `a2` may be `dst` itself (position `n + 1`). Returns `self`
    /// unchanged in shape (still a valid, possibly empty, route) when `a1`
    /// or `a2` cannot be located — the reference implementation simply
    /// computes an empty cut in that case rather than failing.
    pub fn shortcut(&self, a1: Address, a2: Address) -> Self {
        let n = self.hops.len();
        let mut a1_pos: Option<usize> = if self.src == a1 { Some(0) } else { None };
        let mut a2_pos: Option<usize> = None;

        for (i, &hop) in self.hops.iter().enumerate() {
            if hop == a1 {
                a1_pos = Some(i + 1);
            }
            if hop == a2 {
                a2_pos = Some(i + 1);
            }
        }
        if self.dst == a2 {
            a2_pos = Some(n + 1);
        }

        let a1_pos = a1_pos.unwrap_or(0);
        let a2_pos = a2_pos.unwrap_or(n + 1);

        let kept: Vec<Address> = self
            .hops
            .iter()
            .enumerate()
            .filter(|&(i, _)| !(i + 1 > a1_pos && i + 1 < a2_pos))
            .map(|(_, &hop)| hop)
            .collect();

        Self { src: self.src, dst: self.dst, hops: kept }
    }

    /// Joins `self` and `tail`, assuming `self.dst == tail.src` (the caller
    /// is responsible for that semantic connectivity; this function does
    /// not check it and never deduplicates — call [`check_duplicate`] on
    /// the result).
    pub fn concatenate(&self, tail: &Self) -> Self {
        let mut hops = Vec::with_capacity(self.hops.len() + 1 + tail.hops.len());
        hops.extend_from_slice(&self.hops);
        hops.push(tail.src);
        hops.extend_from_slice(&tail.hops);
        Self { src: self.src, dst: tail.dst, hops }
    }

    /// `true` iff any address repeats across `{src} ∪ hops ∪ {dst}`,
    /// scanning in order.
    pub fn check_duplicate(&self) -> bool {
        let mut seen = Vec::with_capacity(self.hops.len() + 2);
        seen.push(self.src);
        for &hop in &self.hops {
            if seen.contains(&hop) {
                return true;
            }
            seen.push(hop);
        }
        seen.contains(&self.dst)
    }

    /// The next hop with `sleft` segments remaining: `hops[n - sleft]` when
    /// `sleft > 0`, else `dst`.
    pub fn next_hop(&self, sleft: usize) -> Address {
        if sleft == 0 {
            self.dst
        } else {
            self.hops[self.hops.len() - sleft]
        }
    }

    /// The previous hop with `sleft` segments remaining: `src` when
    /// `n - 1 == sleft`, else `hops[n - 2 - sleft]`.
    pub fn prev_hop(&self, sleft: usize) -> Address {
        let n = self.hops.len();
        if n == 0 || n - 1 == sleft {
            self.src
        } else {
            self.hops[n - 2 - sleft]
        }
    }

    /// `true` iff `addr` appears in the suffix `hops[n-sleft..n]` or equals
    /// `dst`.
    pub fn find_addr(&self, addr: Address, sleft: usize) -> bool {
        let n = self.hops.len();
        if n == 0 || sleft > n || sleft < 1 {
            return false;
        }
        if self.hops[n - sleft..].contains(&addr) {
            return true;
        }
        addr == self.dst
    }
}
