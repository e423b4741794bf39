use crate::models::coordinate::Coordinate;
use crate::providers::ProviderError;

/// Precision of OSRM's default `polyline` geometry.
pub const OSRM_PRECISION: i32 = 5;

/// Decodes an encoded polyline into (lat, lon) points.
pub fn decode(encoded: &str, precision: i32) -> Result<Vec<Coordinate>, ProviderError> {
    let factor = 10f64.powi(precision);
    let bytes = encoded.as_bytes();

    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut path = Vec::new();

    while index < bytes.len() {
        lat = accumulate(lat, next_delta(bytes, &mut index)?)?;
        lon = accumulate(lon, next_delta(bytes, &mut index)?)?;
        path.push(Coordinate::new(lat as f64 / factor, lon as f64 / factor));
    }

    Ok(path)
}

fn accumulate(total: i64, delta: i64) -> Result<i64, ProviderError> {
    total
        .checked_add(delta)
        .ok_or_else(|| ProviderError::Api("polyline coordinate overflow".to_string()))
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, ProviderError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = bytes
            .get(*index)
            .map(|b| i64::from(*b) - 63)
            .ok_or_else(|| ProviderError::Api("truncated polyline geometry".to_string()))?;

        if !(0..64).contains(&byte) || shift > 60 {
            return Err(ProviderError::Api(format!(
                "invalid polyline character at offset {index}"
            )));
        }

        *index += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;

        if byte < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
