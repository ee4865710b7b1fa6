//! Per-call document length limit derived from the batch itself.

use crate::config::EncoderConfig;

/// Maximum document tokens for one encode call.
///
/// Takes the 90th percentile of the (sampled) token lengths, pads it by 35%,
/// rounds up to a multiple of 32, adds 10% headroom, then clamps between
/// `min_inference_tokens` and `model_max_tokens`.
pub fn inference_max_tokens(lengths: &[usize], config: &EncoderConfig) -> usize {
    let floor = config.min_inference_tokens.min(config.model_max_tokens);
    if lengths.is_empty() {
        return floor;
    }

    let mut sample = sample_lengths(lengths, config.length_sample_size);
    sample.sort_unstable();

    let p90 = percentile_nearest_rank(&sample, 0.9) as f64;
    let rounded = (p90 * 1.35 / 32.0).ceil() * 32.0;
    let candidate = (rounded * 1.1).floor() as usize;

    candidate.max(config.min_inference_tokens).min(config.model_max_tokens)
}

fn sample_lengths(lengths: &[usize], sample_size: usize) -> Vec<usize> {
    if lengths.len() <= sample_size || sample_size == 0 {
        return lengths.to_vec();
    }
    (0..sample_size)
        .map(|i| lengths[i * lengths.len() / sample_size])
        .collect()
}

// `sorted` must be non-empty
fn percentile_nearest_rank(sorted: &[usize], p: f64) -> usize {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
