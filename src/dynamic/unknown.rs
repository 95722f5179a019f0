use prost::{
    bytes::{Buf, BufMut},
    encoding::{decode_varint, encode_key, WireType},
    DecodeError,
};

const MAX_GROUP_DEPTH: u32 = 100;
const MAX_VARINT_LEN: usize = 10;

/// Wire data for fields not known to a message, kept in the order it was read.
///
/// Each field is stored as the exact bytes of its key and payload, so re-encoding the
/// message emits it unchanged.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct UnknownFieldSet {
    buf: Vec<u8>,
}

/// A field key along with the bytes it was decoded from.
#[derive(Debug, Clone, Copy)]
pub(super) struct RawKey {
    number: u32,
    wire_type: WireType,
    bytes: [u8; MAX_VARINT_LEN],
    len: usize,
}

impl UnknownFieldSet {
    pub(super) fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub(super) fn clear(&mut self) {
        self.buf.clear();
    }

    pub(super) fn extend_from(&mut self, other: &UnknownFieldSet) {
        self.buf.extend_from_slice(&other.buf);
    }

    pub(super) fn encode_raw<B>(&self, buf: &mut B)
    where
        B: BufMut,
    {
        buf.put_slice(&self.buf);
    }

    pub(super) fn encoded_len(&self) -> usize {
        self.buf.len()
    }

    /// Copies the payload of the field with the given key from `buf`. On error, nothing is
    /// recorded.
    pub(super) fn capture<B>(&mut self, key: &RawKey, buf: &mut B) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        let start = self.buf.len();
        self.buf.extend_from_slice(key.as_bytes());
        if let Err(err) = copy_value(key.number, key.wire_type, buf, &mut self.buf, 0) {
            self.buf.truncate(start);
            return Err(err);
        }

        tracing::trace!(
            number = key.number,
            wire_type = ?key.wire_type,
            len = self.buf.len() - start,
            "captured unknown field"
        );
        Ok(())
    }
}

impl RawKey {
    /// Reads a key from `buf`, failing on the same inputs as [`prost::encoding::decode_key`].
    pub(super) fn read<B>(buf: &mut B) -> Result<Self, DecodeError>
    where
        B: Buf,
    {
        let mut bytes = [0; MAX_VARINT_LEN];
        let (value, len) = read_varint(buf, &mut bytes)?;
        if value > u64::from(u32::MAX) {
            return Err(DecodeError::new(format!("invalid key value: {}", value)));
        }
        let wire_type = WireType::try_from(value & 0x07)?;
        let number = value as u32 >> 3;
        if number == 0 {
            return Err(DecodeError::new("invalid tag value: 0"));
        }

        Ok(RawKey {
            number,
            wire_type,
            bytes,
            len,
        })
    }

    /// Builds the canonical encoding of a key.
    pub(super) fn new(number: u32, wire_type: WireType) -> Self {
        let mut bytes = [0; MAX_VARINT_LEN];
        let mut out = &mut bytes[..];
        encode_key(number, wire_type, &mut out);
        let len = MAX_VARINT_LEN - out.len();
        RawKey {
            number,
            wire_type,
            bytes,
            len,
        }
    }

    pub(super) fn number(&self) -> u32 {
        self.number
    }

    pub(super) fn wire_type(&self) -> WireType {
        self.wire_type
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Reads the bytes of one varint into `raw`, returning its value and encoded length.
fn read_varint<B>(buf: &mut B, raw: &mut [u8; MAX_VARINT_LEN]) -> Result<(u64, usize), DecodeError>
where
    B: Buf,
{
    for len in 1..=MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(DecodeError::new("invalid varint"));
        }
        let byte = buf.get_u8();
        raw[len - 1] = byte;
        if byte < 0x80 {
            let value = decode_varint(&mut &raw[..len])?;
            return Ok((value, len));
        }
    }
    Err(DecodeError::new("invalid varint"))
}

fn copy_varint<B>(buf: &mut B, out: &mut Vec<u8>) -> Result<u64, DecodeError>
where
    B: Buf,
{
    let mut raw = [0; MAX_VARINT_LEN];
    let (value, len) = read_varint(buf, &mut raw)?;
    out.extend_from_slice(&raw[..len]);
    Ok(value)
}

fn copy_value<B>(
    number: u32,
    wire_type: WireType,
    buf: &mut B,
    out: &mut Vec<u8>,
    depth: u32,
) -> Result<(), DecodeError>
where
    B: Buf,
{
    match wire_type {
        WireType::Varint => {
            copy_varint(buf, out)?;
        }
        WireType::SixtyFourBit => copy_exact(8, buf, out)?,
        WireType::ThirtyTwoBit => copy_exact(4, buf, out)?,
        WireType::LengthDelimited => {
            let len = copy_varint(buf, out)?;
            let len = usize::try_from(len).map_err(|_| DecodeError::new("buffer underflow"))?;
            copy_exact(len, buf, out)?;
        }
        WireType::StartGroup => copy_group(number, buf, out, depth)?,
        WireType::EndGroup => return Err(DecodeError::new("unexpected end group tag")),
    }
    Ok(())
}

fn copy_group<B>(number: u32, buf: &mut B, out: &mut Vec<u8>, depth: u32) -> Result<(), DecodeError>
where
    B: Buf,
{
    if depth >= MAX_GROUP_DEPTH {
        return Err(DecodeError::new("recursion limit reached"));
    }

    loop {
        let key = RawKey::read(buf)?;
        out.extend_from_slice(key.as_bytes());
        if key.wire_type == WireType::EndGroup {
            if key.number != number {
                return Err(DecodeError::new("unexpected end group tag"));
            }
            return Ok(());
        }
        copy_value(key.number, key.wire_type, buf, out, depth + 1)?;
    }
}

fn copy_exact<B>(len: usize, buf: &mut B, out: &mut Vec<u8>) -> Result<(), DecodeError>
where
    B: Buf,
{
    if buf.remaining() < len {
        return Err(DecodeError::new("buffer underflow"));
    }
    out.extend_from_slice(&buf.copy_to_bytes(len));
    Ok(())
}
