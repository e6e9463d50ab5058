// ── IP exclusion ranges ──
//
// Records whose address falls inside any of these ranges are suppressed
// from results no matter what else matches. Containment is real CIDR
// masking, not a textual prefix test.

use std::fmt;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Serialize, Serializer};

use crate::error::RangeError;

/// Loopback plus the RFC 1918 private blocks.
pub const DEFAULT_EXCLUDED_RANGES: &[&str] =
    &["127.0.0.0/8", "10.0.0.0/8", "172.16.0.0/12", "192.168.0.0/16"];

// ── ExclusionRange ──────────────────────────────────────────────────

/// One validated range. `raw` is the text as entered (trimmed), which is
/// what gets displayed and sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRange {
    raw: String,
    net: Ipv4Net,
}

impl ExclusionRange {
    /// Parse `a.b.c.d` or `a.b.c.d/n`: four 1-3 digit octets up to 255,
    /// optional 1-2 digit prefix up to 32. Leading zeros are accepted
    /// (`010.0.0.0/8` is `10.0.0.0/8`). A bare address is a single host.
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(RangeError::Empty);
        }
        let malformed = || RangeError::Malformed(raw.to_owned());

        let (addr, prefix) = match raw.split_once('/') {
            Some((addr, prefix)) => (addr, bounded_number(prefix, 2, 32).ok_or_else(malformed)?),
            None => (raw, 32),
        };

        let mut octets = [0u8; 4];
        let mut parts = addr.split('.');
        for octet in &mut octets {
            *octet = parts
                .next()
                .and_then(|part| bounded_number(part, 3, 255))
                .ok_or_else(malformed)?;
        }
        if parts.next().is_some() {
            return Err(malformed());
        }

        let net = Ipv4Net::new(Ipv4Addr::from(octets), prefix).map_err(|_| malformed())?;
        Ok(Self {
            raw: raw.to_owned(),
            net,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn net(&self) -> Ipv4Net {
        self.net
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.net.contains(&ip)
    }

    /// Same network after masking host bits (`10.1.0.0/8` == `10.0.0.0/8`).
    fn same_network(&self, other: &Ipv4Net) -> bool {
        self.net.trunc() == other.trunc()
    }
}

/// `1..=max_digits` ASCII digits whose value is at most `max`.
fn bounded_number(text: &str, max_digits: usize, max: u8) -> Option<u8> {
    if text.is_empty() || text.len() > max_digits || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u8>().ok().filter(|n| *n <= max)
}

impl fmt::Display for ExclusionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for ExclusionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

// ── ExclusionRangeSet ───────────────────────────────────────────────

/// Ordered, duplicate-free list of exclusion ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExclusionRangeSet {
    ranges: Vec<ExclusionRange>,
}

impl ExclusionRangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four loopback/private defaults.
    pub fn with_defaults() -> Self {
        let ranges = DEFAULT_EXCLUDED_RANGES
            .iter()
            .filter_map(|r| ExclusionRange::parse(r).ok())
            .collect();
        Self { ranges }
    }

    /// Build from user or config text, rejecting the first invalid or
    /// duplicate entry.
    pub fn parse_all<I, S>(ranges: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for range in ranges {
            set.add(range.as_ref())?;
        }
        Ok(set)
    }

    /// Validate and append.
    pub fn add(&mut self, input: &str) -> Result<&ExclusionRange, RangeError> {
        let range = ExclusionRange::parse(input)?;
        if self.ranges.iter().any(|r| r.same_network(&range.net)) {
            return Err(RangeError::Duplicate(range.raw));
        }
        self.ranges.push(range);
        Ok(&self.ranges[self.ranges.len() - 1])
    }

    /// Remove the entry whose text (or network) equals `input`.
    pub fn remove(&mut self, input: &str) -> Option<ExclusionRange> {
        let input = input.trim();
        let parsed = ExclusionRange::parse(input).ok();
        let pos = self.ranges.iter().position(|r| {
            r.raw == input || parsed.as_ref().is_some_and(|p| r.same_network(&p.net))
        })?;
        Some(self.ranges.remove(pos))
    }

    /// Whether an address string falls inside any range.
    ///
    /// Absent or non-IPv4 addresses are never excluded.
    pub fn excludes(&self, ip: Option<&str>) -> bool {
        let Some(ip) = ip.and_then(|s| s.trim().parse::<Ipv4Addr>().ok()) else {
            return false;
        };
        self.ranges.iter().any(|r| r.contains(ip))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExclusionRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Range texts in order, as sent on the wire.
    pub fn as_strings(&self) -> Vec<String> {
        self.ranges.iter().map(|r| r.raw.clone()).collect()
    }
}
