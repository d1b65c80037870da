use crate::ports::outbound::ChecksumProvider;

/// Trailer length appended by [`seal`].
pub const CHECKSUM_LEN: usize = 4;

/// Checksum provider using crc32fast.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultChecksumProvider;

impl ChecksumProvider for DefaultChecksumProvider {
    fn compute_crc32(&self, data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// `payload || crc32(payload)` (big-endian).
pub fn seal(provider: &impl ChecksumProvider, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(&provider.compute_crc32(payload).to_be_bytes());
    out
}

/// Strip and check the trailer added by [`seal`].
pub fn unseal<'a>(provider: &impl ChecksumProvider, record: &'a [u8]) -> Option<&'a [u8]> {
    let split = record.len().checked_sub(CHECKSUM_LEN)?;
    let (payload, trailer) = record.split_at(split);
    let mut crc = [0u8; CHECKSUM_LEN];
    crc.copy_from_slice(trailer);
    provider
        .verify_crc32(payload, u32::from_be_bytes(crc))
        .then_some(payload)
}
