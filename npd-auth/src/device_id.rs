use rand::Rng;

const DEVICE_ID_LEN: usize = 21;
const DEVICE_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a pseudo device fingerprint reported to the tax service as
/// `sourceDeviceId`. Generated once per token set and reused afterwards.
pub fn generate_device_id() -> String {
    let mut rng = rand::rng();
    (0..DEVICE_ID_LEN)
        .map(|_| DEVICE_ID_CHARSET[rng.random_range(0..DEVICE_ID_CHARSET.len())] as char)
        .collect()
}
