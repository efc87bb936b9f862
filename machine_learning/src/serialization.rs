//! Binary form of a trained model.
//!
//! ```text
//! +-------+---------+------------------+-------------------+------------------------+
//! | magic | version | header len (u32) | header (json)     | params (f32 LE) ...    |
//! | NSQL  | 1 byte  | big endian       | `ModelConfig`     | header.size() floats   |
//! +-------+---------+------------------+-------------------+------------------------+
//! ```

use crate::{MlErr, ModelConfig, Result};

const MAGIC: &[u8; 4] = b"NSQL";
const VERSION: u8 = 1;

type HeaderLen = u32;
const HEADER_LEN_SIZE: usize = size_of::<HeaderLen>();
const PREAMBLE_SIZE: usize = MAGIC.len() + 1 + HEADER_LEN_SIZE;
const PARAM_SIZE: usize = size_of::<f32>();

/// Encodes a model configuration and its parameters.
///
/// # Arguments
/// * `config` - The model configuration, stored as the header.
/// * `params` - The flat parameter buffer.
///
/// # Returns
/// The encoded bytes.
pub fn encode(config: &ModelConfig, params: &[f32]) -> Result<Vec<u8>> {
    let header = serde_json::to_vec(config)
        .map_err(|e| MlErr::CorruptBlob(format!("failed to encode header: {e}")))?;

    let header_len = HeaderLen::try_from(header.len())
        .map_err(|_| MlErr::CorruptBlob(format!("header too large: {} bytes", header.len())))?;

    let mut buf = Vec::with_capacity(PREAMBLE_SIZE + header.len() + params.len() * PARAM_SIZE);
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&header_len.to_be_bytes());
    buf.extend_from_slice(&header);
    params
        .iter()
        .for_each(|p| buf.extend_from_slice(&p.to_le_bytes()));

    Ok(buf)
}

/// Decodes bytes produced by `encode`.
///
/// # Arguments
/// * `bytes` - The encoded model.
///
/// # Returns
/// The configuration and the parameters, or `MlErr::CorruptBlob` if the bytes are malformed.
pub fn decode(bytes: &[u8]) -> Result<(ModelConfig, Vec<f32>)> {
    if bytes.len() < PREAMBLE_SIZE {
        return Err(MlErr::CorruptBlob(format!(
            "{} bytes is shorter than the {PREAMBLE_SIZE} byte preamble",
            bytes.len()
        )));
    }

    let (magic, rest) = bytes.split_at(MAGIC.len());
    if magic != MAGIC {
        return Err(MlErr::CorruptBlob("bad magic".into()));
    }

    let (version, rest) = rest.split_at(1);
    if version[0] != VERSION {
        return Err(MlErr::CorruptBlob(format!(
            "unsupported format version {}",
            version[0]
        )));
    }

    let (len_buf, rest) = rest.split_at(HEADER_LEN_SIZE);
    let mut len_arr = [0; HEADER_LEN_SIZE];
    len_arr.copy_from_slice(len_buf);
    let header_len = HeaderLen::from_be_bytes(len_arr) as usize;

    if rest.len() < header_len {
        return Err(MlErr::CorruptBlob(format!(
            "header claims {header_len} bytes but only {} remain",
            rest.len()
        )));
    }

    let (header, body) = rest.split_at(header_len);
    let config: ModelConfig = serde_json::from_slice(header)
        .map_err(|e| MlErr::CorruptBlob(format!("invalid header: {e}")))?;

    if body.len() % PARAM_SIZE != 0 {
        return Err(MlErr::CorruptBlob(format!(
            "parameter section of {} bytes is not a whole number of floats",
            body.len()
        )));
    }

    let params = body
        .chunks_exact(PARAM_SIZE)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok((config, params))
}
