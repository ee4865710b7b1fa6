//! Deterministic, model-free token encoder.
//!
//! Each token row is a keyed blake3 projection of the whole token blended with
//! projections of its character trigrams, so inflections ("film", "films")
//! land close together while unrelated tokens stay near-orthogonal.

use super::{Encoder, EncoderError, Result, TokenEmbeddings};
use crate::config::EncoderConfig;
use crate::preprocessing::{Preprocessor, PreprocessorError};
use async_trait::async_trait;
use tracing::{debug, instrument};

const KEY_CONTEXT: &str = "latesearch 2024-06 hashing encoder token projection";
const WHOLE_TOKEN_WEIGHT: f32 = 0.5;

#[derive(Clone)]
pub struct HashingEncoder {
    config: EncoderConfig,
    key: [u8; 32],
}

impl HashingEncoder {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        if config.dim == 0 {
            return Err(EncoderError::ZeroDimension);
        }
        let key = blake3::derive_key(KEY_CONTEXT, config.seed.as_bytes());
        Ok(Self { config, key })
    }

    /// Unit-length row for one token.
    pub fn embed_token(&self, token: &str) -> Vec<f32> {
        let mut whole = self.project(token.as_bytes(), b'w');
        normalize(&mut whole);

        let padded: Vec<char> = std::iter::once('<')
            .chain(token.chars())
            .chain(std::iter::once('>'))
            .collect();
        let mut grams = vec![0.0f32; self.config.dim];
        for window in padded.windows(3) {
            let trigram: String = window.iter().collect();
            for (acc, v) in grams.iter_mut().zip(self.project(trigram.as_bytes(), b't')) {
                *acc += v;
            }
        }
        normalize(&mut grams);

        let mut row: Vec<f32> = whole
            .iter()
            .zip(&grams)
            .map(|(w, g)| WHOLE_TOKEN_WEIGHT * w + g)
            .collect();
        normalize(&mut row);
        row
    }

    fn project(&self, bytes: &[u8], domain: u8) -> Vec<f32> {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&[domain]);
        hasher.update(bytes);
        let mut reader = hasher.finalize_xof();

        let mut buf = vec![0u8; self.config.dim * 4];
        reader.fill(&mut buf);
        buf.chunks_exact(4)
            .map(|b| {
                let raw = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
                (raw as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }

    fn embed_text(
        &self,
        text: &str,
        max_tokens: usize,
    ) -> std::result::Result<TokenEmbeddings, PreprocessorError> {
        let mut info = Preprocessor::process(text)?;
        info.truncate(max_tokens);

        let mut matrix = TokenEmbeddings {
            dim: self.config.dim,
            data: Vec::with_capacity(info.len() * self.config.dim),
        };
        for token in &info.tokens {
            matrix.data.extend(self.embed_token(token));
        }
        Ok(matrix)
    }
}

fn normalize(row: &mut [f32]) {
    let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in row.iter_mut() {
            *x /= norm;
        }
    }
}

#[async_trait]
impl Encoder for HashingEncoder {
    fn config(&self) -> &EncoderConfig {
        &self.config
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn encode_documents(
        &self,
        texts: &[String],
        max_tokens: usize,
    ) -> Result<Vec<TokenEmbeddings>> {
        let mut encoded = Vec::with_capacity(texts.len());

        for (batch_no, batch) in texts.chunks(self.config.batch_size).enumerate() {
            let offset = batch_no * self.config.batch_size;
            for (i, text) in batch.iter().enumerate() {
                let matrix = self
                    .embed_text(text, max_tokens)
                    .map_err(|_| EncoderError::EmptyInput { index: offset + i })?;
                encoded.push(matrix);
            }
            debug!(batch = batch_no, size = batch.len(), "Encoded document batch");
            tokio::task::yield_now().await;
        }

        Ok(encoded)
    }

    async fn encode_query(&self, query: &str) -> Result<TokenEmbeddings> {
        match self.embed_text(query, self.config.query_max_tokens) {
            Ok(matrix) => Ok(matrix),
            Err(_) => TokenEmbeddings::with_dim(self.config.dim),
        }
    }
}
