//! Mix accumulation and PCM16 conversion.

/*
From Mix to PCM16
=================

Voices are SUMMED into a floating-point accumulator with no weighting, so the
mix can go far outside [-1, 1] when many keys are held. The conversion to
16-bit integers is where the loudness contract lives:

    pcm = clip(round(mix × gain), -32768, 32767)

  gain      A fixed linear factor (5000 by default). One full-scale voice is
            ±5000, so about six voices in phase reach full scale.

  clip      Hard saturation at the i16 limits. Values never wrap around:
            40000 becomes 32767, not -25536.

There is no limiter or automatic gain; hitting the rails is audible on
purpose and deterministic.

The samples are written little-endian, two bytes per frame, mono.
*/

/// Convert one mixed sample to PCM16 with hard clipping.
#[inline]
pub fn to_pcm16(sample: f64, gain: f64) -> i16 {
    let scaled = (sample * gain).round();
    if scaled.is_nan() {
        return 0;
    }
    scaled.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Convert a whole accumulator into `out` (lengths must match).
pub fn write_pcm16(mix: &[f64], gain: f64, out: &mut [i16]) {
    debug_assert_eq!(mix.len(), out.len());
    for (o, &s) in out.iter_mut().zip(mix) {
        *o = to_pcm16(s, gain);
    }
}

/// Serialize PCM16 samples as little-endian bytes (`out` is twice as long).
pub fn write_le_bytes(samples: &[i16], out: &mut [u8]) {
    debug_assert_eq!(samples.len() * 2, out.len());
    for (chunk, &s) in out.chunks_exact_mut(2).zip(samples) {
        chunk.copy_from_slice(&s.to_le_bytes());
    }
}
