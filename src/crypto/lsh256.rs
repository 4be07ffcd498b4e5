//! LSH-256 (KS X 3262) with a 1 to 256 bit digest.
//!
//! Merkle-Damgard over 128-byte blocks. Each block is expanded into 27
//! sixteen-word sub-messages and mixed into the 16-word chaining value over 26
//! steps. The final chaining value is folded to 8 words and serialized
//! little-endian.

use crate::crypto::errors::CryptoError;

pub const BLOCK_BYTES: usize = 128;
pub const MAX_OUTPUT_BITS: usize = 256;

const CV_WORDS: usize = 16;
const STEPS: usize = 26;
const SCHEDULE_WORDS: usize = CV_WORDS * (STEPS + 1);

const ALPHA_EVEN: u32 = 29;
const ALPHA_ODD: u32 = 5;
const BETA_EVEN: u32 = 1;
const BETA_ODD: u32 = 17;
const GAMMA: [u32; 8] = [0, 8, 16, 24, 24, 16, 8, 0];

/// Source index of each word in the message expansion recurrence.
const TAU: [usize; CV_WORDS] = [3, 2, 0, 1, 7, 4, 5, 6, 11, 10, 8, 9, 15, 12, 13, 14];

/// Word permutation applied after every step.
const SIGMA: [usize; CV_WORDS] = [6, 4, 5, 7, 12, 15, 14, 13, 2, 0, 1, 3, 8, 11, 10, 9];

const IV224: [u32; CV_WORDS] = [
    0x068608d3, 0x62d8f7a7, 0xd76652ab, 0x4c600a43, 0xbdc40aa8, 0x1eca0b68, 0xda1a89be, 0x3147d354,
    0x707eb4f9, 0xf65b3862, 0x6b0b2abe, 0x56b8ec0a, 0xcf237286, 0xee0d1727, 0x33636595, 0x8bb8d05f,
];

const IV256: [u32; CV_WORDS] = [
    0x46a10f1f, 0xfddce486, 0xb41443a8, 0x198e6b9d, 0x3304388d, 0xb0f5a3c7, 0xb36061c4, 0x7adbd553,
    0x105d5378, 0x2f74de54, 0x5c2f2d95, 0xf2553fbe, 0x8051357a, 0x138668c8, 0x47aa4484, 0xe01afb41,
];

const STEP_CONSTANTS: [u32; 8 * STEPS] = [
    0x917caf90, 0x6c1b10a2, 0x6f352943, 0xcf778243, 0x2ceb7472, 0x29e96ff2, 0x8a9ba428, 0x2eeb2642,
    0x0e2c4021, 0x872bb30e, 0xa45e6cb2, 0x46f9c612, 0x185fe69e, 0x1359621b, 0x263fccb2, 0x1a116870,
    0x3a6c612f, 0xb2dec195, 0x02cb1f56, 0x40bfd858, 0x784684b6, 0x6cbb7d2e, 0x660c7ed8, 0x2b79d88a,
    0xa6cd9069, 0x91a05747, 0xcdea7558, 0x00983098, 0xbecb3b2e, 0x2838ab9a, 0x728b573e, 0xa55262b5,
    0x745dfa0f, 0x31f79ed8, 0xb85fce25, 0x98c8c898, 0x8a0669ec, 0x60e445c2, 0xfde295b0, 0xf7b5185a,
    0xd2580983, 0x29967709, 0x182df3dd, 0x61916130, 0x90705676, 0x452a0822, 0xe07846ad, 0xaccd7351,
    0x2a618d55, 0xc00d8032, 0x4621d0f5, 0xf2f29191, 0x00c6cd06, 0x6f322a67, 0x58bef48d, 0x7a40c4fd,
    0x8beee27f, 0xcd8db2f2, 0x67f2c63b, 0xe5842383, 0xc793d306, 0xa15c91d6, 0x17b381e5, 0xbb05c277,
    0x7ad1620a, 0x5b40a5bf, 0x5ab901a2, 0x69a7a768, 0x5b66d9cd, 0xfdee6877, 0xcb3566fc, 0xc0c83a32,
    0x4c336c84, 0x9be6651a, 0x13baa3fc, 0x114f0fd1, 0xc240a728, 0xec56e074, 0x009c63c7, 0x89026cf2,
    0x7f9ff0d0, 0x824b7fb5, 0xce5ea00f, 0x605ee0e2, 0x02e7cfea, 0x43375560, 0x9d002ac7, 0x8b6f5f7b,
    0x1f90c14f, 0xcdcb3537, 0x2cfeafdd, 0xbf3fc342, 0xeab7b9ec, 0x7a8cb5a3, 0x9d2af264, 0xfacedb06,
    0xb052106e, 0x99006d04, 0x2bae8d09, 0xff030601, 0xa271a6d6, 0x0742591d, 0xc81d5701, 0xc9a9e200,
    0x02627f1e, 0x996d719d, 0xda3b9634, 0x02090800, 0x14187d78, 0x499b7624, 0xe57458c9, 0x738be2c9,
    0x64e19d20, 0x06df0f36, 0x15d1cb0e, 0x0b110802, 0x2c95f58c, 0xe5119a6d, 0x59cd22ae, 0xff6eac3c,
    0x467ebd84, 0xe5ee453c, 0xe79cd923, 0x1c190a0d, 0xc28b81b8, 0xf6ac0852, 0x26efd107, 0x6e1ae93b,
    0xc53c41ca, 0xd4338221, 0x8475fd0a, 0x35231729, 0x4e0d3a7a, 0xa2b45b48, 0x16c0d82d, 0x890424a9,
    0x017e0c8f, 0x07b5a3f5, 0xfa73078e, 0x583a405e, 0x5b47b4c8, 0x570fa3ea, 0xd7990543, 0x8d28ce32,
    0x7f8a9b90, 0xbd5998fc, 0x6d7a9688, 0x927a9eb6, 0xa2fc7d23, 0x66b38e41, 0x709e491a, 0xb5f700bf,
    0x0a262c0f, 0x16f295b9, 0xe8111ef5, 0x0d195548, 0x9f79a0c5, 0x1a41cfa7, 0x0ee7638a, 0xacf7c074,
    0x30523b19, 0x09884ecf, 0xf93014dd, 0x266e9d55, 0x191a6664, 0x5c1176c1, 0xf64aed98, 0xa4b83520,
    0x828d5449, 0x91d71dd8, 0x2944f2d6, 0x950bf27b, 0x3380ca7d, 0x6d88381d, 0x4138868e, 0x5ced55c4,
    0x0fe19dcb, 0x68f4f669, 0x6e37c8ff, 0xa0fe6e10, 0xb44b47b0, 0xf5c0558a, 0x79bf14cf, 0x4a431a20,
    0xf17f68da, 0x5deb5fd1, 0xa600c86d, 0x9f6c7eb0, 0xff92f864, 0xb615e07f, 0x38d3e448, 0x8d5d3a6a,
    0x70e843cb, 0x494b312e, 0xa6c93613, 0x0beb2f4f, 0x928b5d63, 0xcbf66035, 0x0cb82c80, 0xea97a4f7,
    0x592c0f3b, 0x947c5f77, 0x6fff49b9, 0xf71a7e5a, 0x1de8c0f5, 0xc2569600, 0xc4e4ac8c, 0x823c9ce1,
];

fn expand(block: &[u8]) -> [u32; SCHEDULE_WORDS] {
    let mut msg = [0u32; SCHEDULE_WORDS];
    for (word, bytes) in msg.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for i in 2..=STEPS {
        let idx = CV_WORDS * i;
        for j in 0..CV_WORDS {
            msg[idx + j] = msg[idx - CV_WORDS + j].wrapping_add(msg[idx - 2 * CV_WORDS + TAU[j]]);
        }
    }
    msg
}

fn step(cv: &mut [u32; CV_WORDS], msg: &[u32], idx: usize, alpha: u32, beta: u32) {
    let mut tcv = [0u32; CV_WORDS];
    let sub = &msg[CV_WORDS * idx..CV_WORDS * (idx + 1)];
    for col in 0..8 {
        let mut vl = cv[col] ^ sub[col];
        let mut vr = cv[col + 8] ^ sub[col + 8];
        vl = vl.wrapping_add(vr).rotate_left(alpha) ^ STEP_CONSTANTS[8 * idx + col];
        vr = vl.wrapping_add(vr).rotate_left(beta);
        tcv[col] = vl.wrapping_add(vr);
        tcv[col + 8] = vr.rotate_left(GAMMA[col]);
    }
    for (word, &src) in cv.iter_mut().zip(SIGMA.iter()) {
        *word = tcv[src];
    }
}

/// Compresses one 128-byte block into the chaining value.
fn compress(cv: &mut [u32; CV_WORDS], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_BYTES);
    let msg = expand(block);
    for pair in 0..STEPS / 2 {
        step(cv, &msg, 2 * pair, ALPHA_EVEN, BETA_EVEN);
        step(cv, &msg, 2 * pair + 1, ALPHA_ODD, BETA_ODD);
    }
    for (word, &m) in cv.iter_mut().zip(&msg[CV_WORDS * STEPS..]) {
        *word ^= m;
    }
}

fn initial_cv(output_bits: usize) -> [u32; CV_WORDS] {
    match output_bits {
        224 => IV224,
        256 => IV256,
        _ => {
            let mut cv = [0u32; CV_WORDS];
            cv[0] = 32;
            cv[1] = output_bits as u32;
            compress(&mut cv, &[0u8; BLOCK_BYTES]);
            cv
        }
    }
}

/// Streaming LSH-256 state.
///
/// Input is buffered until a full block is available. The last update may end
/// on a partial byte via [`Lsh256::update_bits`]; nothing can be added after it.
#[derive(Clone, Debug)]
pub struct Lsh256 {
    output_bits: usize,
    cv: [u32; CV_WORDS],
    buf: [u8; BLOCK_BYTES],
    bit_offset: usize,
}

impl Lsh256 {
    /// Creates a state producing `output_bits` bits, between 1 and 256.
    pub fn new(output_bits: usize) -> Result<Self, CryptoError> {
        if output_bits == 0 || output_bits > MAX_OUTPUT_BITS {
            return Err(CryptoError::InvalidOutputLength(output_bits));
        }
        Ok(Self {
            output_bits,
            cv: initial_cv(output_bits),
            buf: [0u8; BLOCK_BYTES],
            bit_offset: 0,
        })
    }

    /// One-shot digest of `data`.
    pub fn digest(output_bits: usize, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut state = Self::new(output_bits)?;
        state.update(data)?;
        Ok(state.finalize())
    }

    pub fn output_bits(&self) -> usize {
        self.output_bits
    }

    /// Discards all absorbed input.
    pub fn reset(&mut self) {
        self.cv = initial_cv(self.output_bits);
        self.buf = [0u8; BLOCK_BYTES];
        self.bit_offset = 0;
    }

    /// Absorbs whole bytes.
    pub fn update(&mut self, data: &[u8]) -> Result<(), CryptoError> {
        self.update_bits(data, data.len() * 8)
    }

    /// Absorbs the first `bits` bits of `data`, most significant bit first.
    ///
    /// If `bits` is not a multiple of 8 the state only accepts `finalize`
    /// afterwards; further non-empty updates fail with
    /// [`CryptoError::UnalignedUpdate`].
    pub fn update_bits(&mut self, data: &[u8], bits: usize) -> Result<(), CryptoError> {
        if bits > data.len() * 8 {
            return Err(CryptoError::BitLengthOverflow {
                bits,
                available: data.len(),
            });
        }
        if bits == 0 {
            return Ok(());
        }
        if self.bit_offset % 8 != 0 {
            return Err(CryptoError::UnalignedUpdate);
        }

        let whole = bits / 8;
        self.absorb(&data[..whole]);

        let trailing_bits = bits % 8;
        if trailing_bits > 0 {
            self.buf[self.bit_offset / 8] = data[whole] & !(0xffu8 >> trailing_bits);
            self.bit_offset += trailing_bits;
        }
        Ok(())
    }

    /// Absorbs whole bytes into a byte-aligned state.
    fn absorb(&mut self, mut input: &[u8]) {
        debug_assert_eq!(self.bit_offset % 8, 0);
        let buffered = self.bit_offset / 8;
        let gap = BLOCK_BYTES - buffered;
        if buffered > 0 && input.len() >= gap {
            self.buf[buffered..].copy_from_slice(&input[..gap]);
            compress(&mut self.cv, &self.buf);
            self.bit_offset = 0;
            input = &input[gap..];
        }

        let mut blocks = input.chunks_exact(BLOCK_BYTES);
        for block in &mut blocks {
            compress(&mut self.cv, block);
        }

        let rest = blocks.remainder();
        let buffered = self.bit_offset / 8;
        self.buf[buffered..buffered + rest.len()].copy_from_slice(rest);
        self.bit_offset += rest.len() * 8;
    }

    /// Pads, compresses the last block and returns the digest.
    pub fn finalize(mut self) -> Vec<u8> {
        let rbytes = self.bit_offset / 8;
        let rbits = self.bit_offset % 8;
        if rbits > 0 {
            self.buf[rbytes] |= 0x80 >> rbits;
        } else {
            self.buf[rbytes] = 0x80;
        }
        self.buf[rbytes + 1..].fill(0);
        compress(&mut self.cv, &self.buf);

        let mut out = Vec::with_capacity(MAX_OUTPUT_BITS / 8);
        for i in 0..8 {
            out.extend_from_slice(&(self.cv[i] ^ self.cv[i + 8]).to_le_bytes());
        }

        let len = self.output_bits.div_ceil(8);
        out.truncate(len);
        let rbits = self.output_bits % 8;
        if rbits > 0 {
            out[len - 1] &= 0xffu8 << (8 - rbits);
        }
        out
    }
}

/// Byte-only view of an [`Lsh256`] state.
///
/// Without access to [`Lsh256::update_bits`] the state stays byte aligned, so
/// writes cannot fail.
#[derive(Clone, Debug)]
pub struct Lsh256Bytes(Lsh256);

impl Lsh256Bytes {
    pub fn new(output_bits: usize) -> Result<Self, CryptoError> {
        Lsh256::new(output_bits).map(Self)
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.absorb(data);
    }

    pub fn finalize(self) -> Vec<u8> {
        self.0.finalize()
    }
}
