//! Minimal 80-bit x87 extended-precision ("C `long double`") codec, needed
//! only because the `.ctx` format stores per-color sequencing error rates in
//! that width. Round-trips any `f64`-representable value; does not claim
//! bit-exact fidelity with a real x87 FPU's rounding for values that need the
//! extra 11 bits of mantissa precision `f64` lacks.

/// Decode a 10-byte little-endian 80-bit extended value into an `f64`.
pub fn read(bytes: [u8; 10]) -> f64 {
    let mantissa = u64::from_le_bytes(bytes[0..8].try_into().unwrap());
    let sign_exp = u16::from_le_bytes(bytes[8..10].try_into().unwrap());
    if sign_exp == 0 && mantissa == 0 {
        return 0.0;
    }
    let sign = if sign_exp & 0x8000 != 0 { -1.0 } else { 1.0 };
    let exponent = (sign_exp & 0x7FFF) as i32 - 16383;
    let significand = mantissa as f64 / (1u64 << 63) as f64;
    sign * significand * 2f64.powi(exponent)
}

/// Encode an `f64` into a 10-byte little-endian 80-bit extended value.
pub fn write(value: f64) -> [u8; 10] {
    let mut out = [0u8; 10];
    if value == 0.0 {
        return out;
    }
    let sign: u16 = if value.is_sign_negative() { 0x8000 } else { 0 };
    let v = value.abs();
    let exponent = v.log2().floor() as i32;
    let significand = v / 2f64.powi(exponent);
    let mantissa = (significand * (1u64 << 63) as f64).round() as u64;
    let sign_exp = sign | ((exponent + 16383) as u16 & 0x7FFF);
    out[0..8].copy_from_slice(&mantissa.to_le_bytes());
    out[8..10].copy_from_slice(&sign_exp.to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_representative_values() {
        for v in [0.0, 1.0, -1.0, 0.015, 123.456, 1e-10, 1e10] {
            let decoded = read(write(v));
            assert!((decoded - v).abs() < v.abs().max(1.0) * 1e-9, "{v} -> {decoded}");
        }
    }
}
