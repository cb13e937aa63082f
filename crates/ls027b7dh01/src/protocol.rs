//! Wire format of the LS027B7DH01 serial interface.

/// Panel width in pixels.
pub const WIDTH: usize = 400;
/// Panel height in pixels.
pub const HEIGHT: usize = 240;
/// Bytes of pixel payload per gate line.
pub const LINE_BYTES: usize = WIDTH / 8;

/// 8-bit pixels strictly below this value are sent as dark.
pub const DARK_THRESHOLD: u8 = 0x80;

/// Mode byte, gate address, payload, then 16 trailing dummy clocks.
pub const WRITE_LINE_PACKET_SIZE: usize = 1 + 1 + LINE_BYTES + 2;

/// Mode byte followed by at least 13 dummy clocks.
pub const CLEAR_PACKET_SIZE: usize = 3;

const fn mode_byte(write: bool, m1: bool, clear: bool) -> u8 {
    ((write as u8) << 7) | ((m1 as u8) << 6) | ((clear as u8) << 5)
}

/// Gate address for `line` in 1..=240, sent LSB first.
pub fn encode_line_address(line: u16) -> Option<u8> {
    if !(1..=HEIGHT as u16).contains(&line) {
        return None;
    }

    Some((line as u8).reverse_bits())
}

pub fn build_clear_packet(m1_high: bool) -> [u8; CLEAR_PACKET_SIZE] {
    [mode_byte(false, m1_high, true), 0x00, 0x00]
}

/// `None` when `line` is outside 1..=240.
pub fn build_write_line_packet(
    line: u16,
    line_data: &[u8; LINE_BYTES],
    m1_high: bool,
) -> Option<[u8; WRITE_LINE_PACKET_SIZE]> {
    let address = encode_line_address(line)?;

    let mut packet = [0u8; WRITE_LINE_PACKET_SIZE];
    packet[0] = mode_byte(true, m1_high, false);
    packet[1] = address;
    packet[2..2 + LINE_BYTES].copy_from_slice(line_data);

    Some(packet)
}

/// Packs one row of 8-bit pixels into a 1bpp line payload.
///
/// Bit 7 of each byte is the leftmost pixel and a set bit is dark. Pixels
/// past [`WIDTH`] are dropped; a short row leaves the rest of the line light.
pub fn pack_indexed_row(row: &[u8], threshold: u8) -> [u8; LINE_BYTES] {
    let mut line = [0u8; LINE_BYTES];
    for (x, &pixel) in row.iter().take(WIDTH).enumerate() {
        if pixel < threshold {
            line[x / 8] |= 0x80 >> (x % 8);
        }
    }
    line
}
