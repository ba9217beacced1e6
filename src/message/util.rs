/// Compute the log-base-two of the next power of two: 8 -> 3, 9 -> 4.
///
pub fn ceil_log2(x: usize) -> usize {
    let mut n = 0;
    while 1 << n < x {
        n += 1
    }
    n
}

/// Pack a slice of floats into little-endian bytes.
///
pub fn f64s_to_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Unpack little-endian bytes into floats. Trailing bytes that do not make
/// up a whole float are ignored.
///
pub fn bytes_to_f64s(bytes: &[u8]) -> Vec<f64> {
    bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buffer = [0; 8];
            buffer.copy_from_slice(chunk);
            f64::from_le_bytes(buffer)
        })
        .collect()
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn ceil_log2_rounds_up() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(8), 3);
        assert_eq!(ceil_log2(9), 4);
    }

    #[test]
    fn floats_survive_byte_packing() {
        let values = [1.5, -0.0, f64::MAX, 1e-300];
        assert_eq!(bytes_to_f64s(&f64s_to_bytes(&values)), values.to_vec());
    }
}
