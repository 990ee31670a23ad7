//! Cryptographic operations for GlobalPlatform SCP02 protocol
//!
//! Session key derivation, card and host cryptograms, and the retail MAC
//! that protects EXTERNAL AUTHENTICATE. DES and triple DES come from the
//! `des` crate; the chaining is done here.

use cipher::{
    Block, BlockEncrypt, Iv, IvSizeUser, Key, KeyInit, KeySizeUser,
    consts::{U8, U16},
    generic_array::GenericArray,
};
use des::{Des, TdesEde3};

/// Derivation constant
pub type Purpose = [u8; 2];
/// Sequence counter returned by INITIALIZE UPDATE
pub type SequenceCounter = [u8; 2];
/// Card challenge returned by INITIALIZE UPDATE
pub type CardChallenge = [u8; 6];
/// Host challenge sent with INITIALIZE UPDATE
pub type Challenge = [u8; 8];
/// Card or host cryptogram
pub type Cryptogram = [u8; 8];
/// Command MAC
pub type Scp02Mac = [u8; 8];

/// Derivation purpose for the session encryption key
pub const DERIVATION_ENC: Purpose = [0x01, 0x82];
/// Derivation purpose for the session MAC key
pub const DERIVATION_MAC: Purpose = [0x01, 0x01];

/// ISO 7816-4 padding marker
const PAD: u8 = 0x80;

/// Placeholder struct for defining SCP02 cryptographic parameters
#[allow(missing_debug_implementations)]
pub struct Scp02;

impl KeySizeUser for Scp02 {
    type KeySize = U16;
}

impl IvSizeUser for Scp02 {
    type IvSize = U8;
}

/// Resize the SCP02 16-byte key to 24 bytes for 3DES
///
/// The first 8 bytes are repeated as the third key part.
pub fn resize_key(key: &Key<Scp02>) -> Key<TdesEde3> {
    let mut result = Key::<TdesEde3>::default();
    result[..16].copy_from_slice(key);
    result[16..24].copy_from_slice(&key[..8]);
    result
}

fn xor_into(block: &mut Block<TdesEde3>, data: &[u8]) {
    for (a, b) in block.iter_mut().zip(data) {
        *a ^= *b;
    }
}

/// Triple-DES CBC encryption in place
///
/// Each block is chained into the next through an explicit running IV.
pub fn encrypt_cbc(key: &Key<Scp02>, iv: &Iv<Scp02>, blocks: &mut [Block<TdesEde3>]) {
    let cipher = TdesEde3::new(&resize_key(key));
    let mut chain = *iv;

    for block in blocks.iter_mut() {
        xor_into(block, &chain);
        cipher.encrypt_block(block);
        chain = *block;
    }
}

/// Derive a session key from a static key, the sequence counter and a purpose
///
/// The 16-byte derivation data `purpose | seq | 00..` is encrypted with 3DES
/// in CBC mode under a zero IV.
pub fn derive_key(card_key: &Key<Scp02>, seq: &SequenceCounter, purpose: &Purpose) -> Key<Scp02> {
    let mut blocks = [Block::<TdesEde3>::default(); 2];
    blocks[0][0..2].copy_from_slice(purpose);
    blocks[0][2..4].copy_from_slice(seq);

    encrypt_cbc(card_key, &Iv::<Scp02>::default(), &mut blocks);

    let mut result = Key::<Scp02>::default();
    result[0..8].copy_from_slice(&blocks[0]);
    result[8..16].copy_from_slice(&blocks[1]);
    result
}

/// Calculate the card or host cryptogram
///
/// A full 3DES CBC-MAC under the session encryption key over 16 bytes of
/// challenge data followed by the padding block `80 00 .. 00`. The card
/// cryptogram covers `host | seq | card`, the host cryptogram `seq | card | host`.
pub fn calculate_cryptogram(
    enc_key: &Key<Scp02>,
    sequence_counter: &SequenceCounter,
    card_challenge: &CardChallenge,
    host_challenge: &Challenge,
    for_host: bool,
) -> Cryptogram {
    let mut blocks = [Block::<TdesEde3>::default(); 3];

    if for_host {
        blocks[0][0..2].copy_from_slice(sequence_counter);
        blocks[0][2..8].copy_from_slice(card_challenge);
        blocks[1].copy_from_slice(host_challenge);
    } else {
        blocks[0].copy_from_slice(host_challenge);
        blocks[1][0..2].copy_from_slice(sequence_counter);
        blocks[1][2..8].copy_from_slice(card_challenge);
    }
    blocks[2][0] = PAD;

    encrypt_cbc(enc_key, &Iv::<Scp02>::default(), &mut blocks);
    blocks[2].into()
}

/// Calculate the SCP02 command MAC (ISO 9797-1 MAC algorithm 3)
///
/// Every full block is chained with single DES under the left half of the key;
/// the final block, padded by XORing `0x80` at the position the padding would
/// start, is encrypted with 3DES. No padded copy of `data` is made.
pub fn mac_full_3des(key: &Key<Scp02>, iv: &Iv<Scp02>, data: &[u8]) -> Scp02Mac {
    let des = Des::new(GenericArray::from_slice(&key[..8]));
    let tdes = TdesEde3::new(&resize_key(key));

    let mut chain = *iv;
    let mut blocks = data.chunks_exact(8);
    for block in &mut blocks {
        xor_into(&mut chain, block);
        des.encrypt_block(&mut chain);
    }

    let tail = blocks.remainder();
    xor_into(&mut chain, tail);
    chain[tail.len()] ^= PAD;
    tdes.encrypt_block(&mut chain);

    chain.into()
}
